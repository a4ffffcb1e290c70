//! Reconstruction options.
//!
//! Options can be built in code or loaded from a JSON file. Every field has
//! a default, so a config file only needs the keys it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::NetplaceError;
use crate::layout::GridLayout;

/// Which wire synthesis strategy a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisStrategy {
    /// Stub each component's pins right after it is placed
    #[default]
    Immediate,
    /// Stub every pin after all components are placed, grouped by net
    Grouped,
}

/// What grouped synthesis does with nets that reach only one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinglePinNetPolicy {
    /// Stub the lone pin so it can be connected by hand later
    #[default]
    Keep,
    /// Leave single-pin nets unwired
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructOptions {
    pub max_components_per_row: usize,
    pub grid_size: f64,
    /// Length of each net-label stub
    pub stub_length: f64,
    /// Page size passed to the library's name search
    pub name_search_limit: usize,
    pub strategy: SynthesisStrategy,
    pub single_pin_nets: SinglePinNetPolicy,
    /// Memoize device lookups within a run
    pub cache_lookups: bool,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            max_components_per_row: 15,
            grid_size: 100.0,
            stub_length: 20.0,
            name_search_limit: 1,
            strategy: SynthesisStrategy::Immediate,
            single_pin_nets: SinglePinNetPolicy::Keep,
            cache_lookups: false,
        }
    }
}

impl ReconstructOptions {
    pub fn from_json_str(content: &str) -> Result<Self, NetplaceError> {
        serde_json::from_str(content).map_err(|e| NetplaceError::Config(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, NetplaceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn grid(&self) -> GridLayout {
        GridLayout::new(self.max_components_per_row, self.grid_size)
    }
}
