//! Host Collaborator Interfaces
//!
//! The reconstruction core never talks to a schematic editor directly. It
//! drives these traits instead, one per capability of the host: device
//! library queries, symbol primitives, wire primitives, notifications and
//! the interactive import prompts. Every call is a suspension point.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::{DeviceCatalog, DeviceDefinition, InMemoryHost, SchematicSnapshot};

/// Failure reported by a host call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Host call failed: {0}")]
    CallFailed(String),

    #[error("Unknown symbol instance: {0}")]
    UnknownInstance(String),
}

/// Opaque handle to the host's device-library namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryHandle(pub String);

/// A device returned by a library query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDevice {
    pub device_uuid: String,
    pub device_name: String,
}

/// A pin of a realized symbol instance, in absolute coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPin {
    pub pin_number: String,
    pub x: f64,
    pub y: f64,
}

/// Attributes written onto a symbol instance; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolAttributes {
    pub designator: Option<String>,
    pub name: Option<String>,
}

impl SymbolAttributes {
    pub fn is_empty(&self) -> bool {
        self.designator.is_none() && self.name.is_none()
    }
}

/// Severity of a transient toast message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastSeverity {
    Info,
    Success,
    Warning,
    Error,
}

/// Device library queries
#[async_trait]
pub trait DeviceLibrary: Send + Sync {
    /// Namespace handle of the library symbols are instantiated from
    async fn library_namespace(&self) -> Result<Option<LibraryHandle>, HostError>;

    /// Exact lookup by supplier part number
    async fn lookup_by_supplier_id(&self, id: &str) -> Result<Vec<ResolvedDevice>, HostError>;

    /// Fuzzy name search, at most `limit` results
    async fn search_by_name(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<ResolvedDevice>, HostError>;
}

/// Symbol primitives
#[async_trait]
pub trait SymbolCanvas: Send + Sync {
    /// Place a symbol; `None` when the host refused to create it
    async fn instantiate(
        &self,
        library: &LibraryHandle,
        device: &ResolvedDevice,
        x: f64,
        y: f64,
    ) -> Result<Option<String>, HostError>;

    async fn set_attributes(
        &self,
        instance_id: &str,
        attributes: &SymbolAttributes,
    ) -> Result<(), HostError>;

    async fn list_pins(&self, instance_id: &str) -> Result<Vec<ResolvedPin>, HostError>;
}

/// Wire primitives
#[async_trait]
pub trait WireCanvas: Send + Sync {
    /// Create one straight segment `[x1, y1, x2, y2]` carrying a net label
    async fn create_labeled_segment(&self, line: [f64; 4], label: &str) -> Result<(), HostError>;
}

/// Fire-and-forget user notifications
pub trait Notifier: Send + Sync {
    fn toast(&self, severity: ToastSeverity, message: &str);

    /// Append to the host's persistent log
    fn log(&self, message: &str);
}

/// Interactive prompts used by the import flow
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Ask the user for a file; `None` when the dialog was cancelled
    async fn select_file(&self, extensions: &[&str]) -> Result<Option<Vec<u8>>, HostError>;

    async fn confirm(&self, message: &str) -> Result<bool, HostError>;
}

/// Everything a reconstruction run needs from the host
pub trait SchematicHost: DeviceLibrary + SymbolCanvas + WireCanvas + Notifier {}

impl<T: DeviceLibrary + SymbolCanvas + WireCanvas + Notifier> SchematicHost for T {}
