//! In-Memory Host
//!
//! A complete host implementation that keeps the schematic in process. The
//! device library is a JSON catalog; placed symbols, wire stubs, toasts and
//! log lines are recorded and can be exported as a [`SchematicSnapshot`].
//! The CLI runs against it, and tests use its failure injection to drive
//! the recovery paths.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    DeviceLibrary, HostError, LibraryHandle, Notifier, ResolvedDevice, ResolvedPin,
    SymbolAttributes, SymbolCanvas, ToastSeverity, WireCanvas,
};

const DEFAULT_NAMESPACE: &str = "local";

fn default_namespace() -> Option<String> {
    Some(DEFAULT_NAMESPACE.to_string())
}

/// Pin offset relative to the symbol origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPin {
    pub number: String,
    pub x: f64,
    pub y: f64,
}

/// A device definition in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDefinition {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub supplier_ids: Vec<String>,
    #[serde(default)]
    pub pins: Vec<CatalogPin>,
}

impl DeviceDefinition {
    fn as_resolved(&self) -> ResolvedDevice {
        ResolvedDevice {
            device_uuid: self.uuid.clone(),
            device_name: self.name.clone(),
        }
    }
}

/// Device catalog backing [`InMemoryHost`]
///
/// A `null` namespace models a host whose library is not available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCatalog {
    #[serde(default = "default_namespace")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub devices: Vec<DeviceDefinition>,
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            devices: Vec::new(),
        }
    }
}

impl DeviceCatalog {
    pub fn new(devices: Vec<DeviceDefinition>) -> Self {
        Self {
            devices,
            ..Default::default()
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read device catalog: {:?}", path))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse device catalog: {:?}", path))
    }

    pub fn find(&self, uuid: &str) -> Option<&DeviceDefinition> {
        self.devices.iter().find(|d| d.uuid == uuid)
    }

    /// Exact supplier part match, catalog order
    pub fn by_supplier_id(&self, id: &str) -> Vec<&DeviceDefinition> {
        self.devices
            .iter()
            .filter(|d| d.supplier_ids.iter().any(|s| s == id))
            .collect()
    }

    /// Case-insensitive name search ranked exact, then substring, then
    /// "every query word appears in the name".
    pub fn search(&self, query: &str, limit: usize) -> Vec<&DeviceDefinition> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let words: Vec<&str> = query.split_whitespace().collect();

        let mut ranked: Vec<(u8, usize, &DeviceDefinition)> = self
            .devices
            .iter()
            .enumerate()
            .filter_map(|(i, d)| {
                let name = d.name.to_lowercase();
                let rank = if name == query {
                    0
                } else if name.contains(&query) {
                    1
                } else if words.iter().all(|w| name.contains(w)) {
                    2
                } else {
                    return None;
                };
                Some((rank, i, d))
            })
            .collect();
        ranked.sort_by_key(|(rank, i, _)| (*rank, *i));
        ranked.into_iter().take(limit).map(|(_, _, d)| d).collect()
    }
}

/// A placed symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInstance {
    pub instance_id: String,
    pub device_uuid: String,
    pub device_name: String,
    pub x: f64,
    pub y: f64,
    pub designator: Option<String>,
    pub name: Option<String>,
}

/// A labeled wire segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireStub {
    pub line: [f64; 4],
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastRecord {
    pub severity: ToastSeverity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Everything recorded by an [`InMemoryHost`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchematicSnapshot {
    pub symbols: Vec<SymbolInstance>,
    pub wires: Vec<WireStub>,
    pub toasts: Vec<ToastRecord>,
    pub log: Vec<LogEntry>,
}

/// Host calls that should fail
#[derive(Debug, Clone, Default)]
struct FailureInjection {
    lookups: bool,
    refused_devices: HashSet<String>,
    attributes: bool,
    pin_queries: HashSet<String>,
    wire_labels: HashSet<String>,
}

pub struct InMemoryHost {
    catalog: DeviceCatalog,
    state: Mutex<SchematicSnapshot>,
    failures: FailureInjection,
    supplier_lookups: AtomicUsize,
    name_searches: AtomicUsize,
}

impl InMemoryHost {
    pub fn new(catalog: DeviceCatalog) -> Self {
        Self {
            catalog,
            state: Mutex::new(SchematicSnapshot::default()),
            failures: FailureInjection::default(),
            supplier_lookups: AtomicUsize::new(0),
            name_searches: AtomicUsize::new(0),
        }
    }

    /// Every library query fails with a host error
    pub fn with_failing_lookups(mut self) -> Self {
        self.failures.lookups = true;
        self
    }

    /// `instantiate` returns no instance for this device
    pub fn with_refused_device(mut self, device_uuid: impl Into<String>) -> Self {
        self.failures.refused_devices.insert(device_uuid.into());
        self
    }

    /// Every `set_attributes` call fails
    pub fn with_failing_attributes(mut self) -> Self {
        self.failures.attributes = true;
        self
    }

    /// `list_pins` fails for instances of this device
    pub fn with_failing_pin_query(mut self, device_uuid: impl Into<String>) -> Self {
        self.failures.pin_queries.insert(device_uuid.into());
        self
    }

    /// Wire creation fails for this (already normalized) label
    pub fn with_failing_wire_label(mut self, label: impl Into<String>) -> Self {
        self.failures.wire_labels.insert(label.into());
        self
    }

    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    fn state(&self) -> MutexGuard<'_, SchematicSnapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn symbols(&self) -> Vec<SymbolInstance> {
        self.state().symbols.clone()
    }

    pub fn wires(&self) -> Vec<WireStub> {
        self.state().wires.clone()
    }

    pub fn toasts(&self) -> Vec<ToastRecord> {
        self.state().toasts.clone()
    }

    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.state().log.clone()
    }

    pub fn snapshot(&self) -> SchematicSnapshot {
        self.state().clone()
    }

    pub fn supplier_lookup_calls(&self) -> usize {
        self.supplier_lookups.load(Ordering::SeqCst)
    }

    pub fn name_search_calls(&self) -> usize {
        self.name_searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceLibrary for InMemoryHost {
    async fn library_namespace(&self) -> Result<Option<LibraryHandle>, HostError> {
        Ok(self.catalog.namespace.clone().map(LibraryHandle))
    }

    async fn lookup_by_supplier_id(&self, id: &str) -> Result<Vec<ResolvedDevice>, HostError> {
        self.supplier_lookups.fetch_add(1, Ordering::SeqCst);
        if self.failures.lookups {
            return Err(HostError::CallFailed(format!("supplier lookup for {}", id)));
        }
        Ok(self
            .catalog
            .by_supplier_id(id)
            .into_iter()
            .map(DeviceDefinition::as_resolved)
            .collect())
    }

    async fn search_by_name(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<ResolvedDevice>, HostError> {
        self.name_searches.fetch_add(1, Ordering::SeqCst);
        if self.failures.lookups {
            return Err(HostError::CallFailed(format!("name search for {}", name)));
        }
        Ok(self
            .catalog
            .search(name, limit)
            .into_iter()
            .map(DeviceDefinition::as_resolved)
            .collect())
    }
}

#[async_trait]
impl SymbolCanvas for InMemoryHost {
    async fn instantiate(
        &self,
        _library: &LibraryHandle,
        device: &ResolvedDevice,
        x: f64,
        y: f64,
    ) -> Result<Option<String>, HostError> {
        if self.failures.refused_devices.contains(&device.device_uuid) {
            return Ok(None);
        }
        let Some(definition) = self.catalog.find(&device.device_uuid) else {
            return Ok(None);
        };

        let instance_id = Uuid::new_v4().to_string();
        self.state().symbols.push(SymbolInstance {
            instance_id: instance_id.clone(),
            device_uuid: definition.uuid.clone(),
            device_name: definition.name.clone(),
            x,
            y,
            designator: None,
            name: None,
        });
        Ok(Some(instance_id))
    }

    async fn set_attributes(
        &self,
        instance_id: &str,
        attributes: &SymbolAttributes,
    ) -> Result<(), HostError> {
        if self.failures.attributes {
            return Err(HostError::CallFailed(format!(
                "attribute update on {}",
                instance_id
            )));
        }
        let mut state = self.state();
        let symbol = state
            .symbols
            .iter_mut()
            .find(|s| s.instance_id == instance_id)
            .ok_or_else(|| HostError::UnknownInstance(instance_id.to_string()))?;
        if let Some(designator) = &attributes.designator {
            symbol.designator = Some(designator.clone());
        }
        if let Some(name) = &attributes.name {
            symbol.name = Some(name.clone());
        }
        Ok(())
    }

    async fn list_pins(&self, instance_id: &str) -> Result<Vec<ResolvedPin>, HostError> {
        let (device_uuid, x, y) = {
            let state = self.state();
            let symbol = state
                .symbols
                .iter()
                .find(|s| s.instance_id == instance_id)
                .ok_or_else(|| HostError::UnknownInstance(instance_id.to_string()))?;
            (symbol.device_uuid.clone(), symbol.x, symbol.y)
        };

        if self.failures.pin_queries.contains(&device_uuid) {
            return Err(HostError::CallFailed(format!("pin query on {}", instance_id)));
        }

        Ok(self
            .catalog
            .find(&device_uuid)
            .map(|d| {
                d.pins
                    .iter()
                    .map(|p| ResolvedPin {
                        pin_number: p.number.clone(),
                        x: x + p.x,
                        y: y + p.y,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl WireCanvas for InMemoryHost {
    async fn create_labeled_segment(&self, line: [f64; 4], label: &str) -> Result<(), HostError> {
        if self.failures.wire_labels.contains(label) {
            return Err(HostError::CallFailed(format!("wire creation for {}", label)));
        }
        self.state().wires.push(WireStub {
            line,
            label: label.to_string(),
        });
        Ok(())
    }
}

impl Notifier for InMemoryHost {
    fn toast(&self, severity: ToastSeverity, message: &str) {
        self.state().toasts.push(ToastRecord {
            severity,
            message: message.to_string(),
        });
    }

    fn log(&self, message: &str) {
        self.state().log.push(LogEntry {
            timestamp: Utc::now(),
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(uuid: &str, name: &str) -> DeviceDefinition {
        DeviceDefinition {
            uuid: uuid.into(),
            name: name.into(),
            supplier_ids: vec![],
            pins: vec![],
        }
    }

    #[test]
    fn test_search_ranks_exact_before_substring() {
        let catalog = DeviceCatalog::new(vec![
            device("a", "Resistor 10k 0603"),
            device("b", "10k"),
            device("c", "Capacitor 100nF"),
            device("d", "10K Resistor"),
        ]);
        let names: Vec<&str> = catalog
            .search("10k", 10)
            .iter()
            .map(|d| d.uuid.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a", "d"]);

        let names: Vec<&str> = catalog
            .search("resistor 0603", 10)
            .iter()
            .map(|d| d.uuid.as_str())
            .collect();
        assert_eq!(names, vec!["a"]);
        assert_eq!(catalog.search("10k", 1).len(), 1);
        assert!(catalog.search("   ", 5).is_empty());
    }

    #[test]
    fn test_catalog_namespace_defaults_and_null() {
        let catalog = DeviceCatalog::from_json_str(r#"{"devices": []}"#).unwrap();
        assert_eq!(catalog.namespace.as_deref(), Some("local"));

        let catalog = DeviceCatalog::from_json_str(r#"{"namespace": null}"#).unwrap();
        assert_eq!(catalog.namespace, None);
    }

    #[tokio::test]
    async fn test_pins_are_offset_by_instance_origin() {
        let mut def = device("r", "Resistor");
        def.pins = vec![
            CatalogPin {
                number: "1".into(),
                x: -10.0,
                y: 0.0,
            },
            CatalogPin {
                number: "2".into(),
                x: 10.0,
                y: 0.0,
            },
        ];
        let host = InMemoryHost::new(DeviceCatalog::new(vec![def]));
        let library = host.library_namespace().await.unwrap().unwrap();
        let resolved = ResolvedDevice {
            device_uuid: "r".into(),
            device_name: "Resistor".into(),
        };

        let id = host
            .instantiate(&library, &resolved, 100.0, 50.0)
            .await
            .unwrap()
            .unwrap();
        let pins = host.list_pins(&id).await.unwrap();
        assert_eq!(pins[0].x, 90.0);
        assert_eq!(pins[1].x, 110.0);
        assert_eq!(pins[1].y, 50.0);
    }

    #[tokio::test]
    async fn test_unknown_device_is_not_instantiated() {
        let host = InMemoryHost::new(DeviceCatalog::default());
        let library = LibraryHandle("local".into());
        let ghost = ResolvedDevice {
            device_uuid: "missing".into(),
            device_name: "Ghost".into(),
        };
        assert_eq!(host.instantiate(&library, &ghost, 0.0, 0.0).await, Ok(None));
        assert!(host.symbols().is_empty());
    }
}
