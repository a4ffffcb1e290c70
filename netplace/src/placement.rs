//! Component Placement
//!
//! Turns one netlist component into a symbol on the schematic: resolve the
//! device, instantiate it at the planned grid position, apply cosmetic
//! attributes, then read back the realized pins to derive the component's
//! bounding box.

use serde::Serialize;
use thiserror::Error;

use crate::host::{
    HostError, LibraryHandle, ResolvedDevice, ResolvedPin, SchematicHost, SymbolAttributes,
};
use crate::parser::ComponentRecord;
use crate::resolver::DeviceResolver;

/// A component realized on the schematic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedComponent {
    /// Host handle of the symbol instance
    pub instance_id: String,
    /// Key of the component in the netlist
    pub component_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub pins: Vec<ResolvedPin>,
}

impl PlacedComponent {
    /// Horizontal center of the box anchored at the placement origin
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Realized pin with exactly this number
    pub fn pin(&self, pin_number: &str) -> Option<&ResolvedPin> {
        self.pins.iter().find(|p| p.pin_number == pin_number)
    }
}

/// Why a component could not be placed
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlacementError {
    #[error("No library device matches supplier part {supplier_part:?} or name {device_name:?}")]
    DeviceNotFound {
        supplier_part: String,
        device_name: String,
    },

    #[error("Device lookup failed: {0}")]
    LookupFailed(HostError),

    #[error("Could not instantiate device {device_name} ({device_uuid})")]
    InstantiationFailed {
        device_uuid: String,
        device_name: String,
        cause: Option<HostError>,
    },

    #[error("Could not read pins of instance {instance_id}: {source}")]
    PinQueryFailed {
        instance_id: String,
        source: HostError,
    },
}

/// A component that could not be placed
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementFailure {
    pub component_id: String,
    /// Designator, or the component id when the designator is blank
    pub designator: String,
    pub error: PlacementError,
}

/// Result of the best-effort attribute update
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeOutcome {
    Applied(SymbolAttributes),
    /// Nothing non-blank to write
    Skipped,
    /// The host rejected the update; the placement still stands
    AttributeMutationFailed(HostError),
}

/// Successful placement plus its non-fatal side results
#[derive(Debug, Clone)]
pub struct Placement {
    pub component: PlacedComponent,
    pub device: ResolvedDevice,
    pub attributes: AttributeOutcome,
}

pub struct ComponentPlacer<'a> {
    resolver: &'a DeviceResolver,
    library: &'a LibraryHandle,
}

impl<'a> ComponentPlacer<'a> {
    pub fn new(resolver: &'a DeviceResolver, library: &'a LibraryHandle) -> Self {
        Self { resolver, library }
    }

    /// Place one component at `position`.
    pub async fn place<H>(
        &self,
        host: &H,
        component_id: &str,
        record: &ComponentRecord,
        position: (f64, f64),
    ) -> Result<Placement, PlacementFailure>
    where
        H: SchematicHost + ?Sized,
    {
        self.try_place(host, component_id, record, position)
            .await
            .map_err(|error| PlacementFailure {
                component_id: component_id.to_string(),
                designator: record.display_name(component_id).to_string(),
                error,
            })
    }

    async fn try_place<H>(
        &self,
        host: &H,
        component_id: &str,
        record: &ComponentRecord,
        (x, y): (f64, f64),
    ) -> Result<Placement, PlacementError>
    where
        H: SchematicHost + ?Sized,
    {
        let device = self
            .resolver
            .resolve(host, record)
            .await
            .map_err(PlacementError::LookupFailed)?
            .ok_or_else(|| PlacementError::DeviceNotFound {
                supplier_part: record.supplier_part.clone(),
                device_name: record.device_name.clone(),
            })?;

        let instance_id = match host.instantiate(self.library, &device, x, y).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                return Err(PlacementError::InstantiationFailed {
                    device_uuid: device.device_uuid,
                    device_name: device.device_name,
                    cause: None,
                })
            }
            Err(e) => {
                return Err(PlacementError::InstantiationFailed {
                    device_uuid: device.device_uuid,
                    device_name: device.device_name,
                    cause: Some(e),
                })
            }
        };

        let attributes = apply_attributes(host, &instance_id, record).await;

        let pins = host
            .list_pins(&instance_id)
            .await
            .map_err(|source| PlacementError::PinQueryFailed {
                instance_id: instance_id.clone(),
                source,
            })?;

        let (width, height) = bounding_box(&pins);
        tracing::debug!(
            "Placed {} as {} at ({}, {}), {} pins",
            component_id,
            device.device_name,
            x,
            y,
            pins.len()
        );

        Ok(Placement {
            component: PlacedComponent {
                instance_id,
                component_id: component_id.to_string(),
                x,
                y,
                width,
                height,
                pins,
            },
            device,
            attributes,
        })
    }
}

async fn apply_attributes<H>(host: &H, instance_id: &str, record: &ComponentRecord) -> AttributeOutcome
where
    H: SchematicHost + ?Sized,
{
    let non_blank = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    let attributes = SymbolAttributes {
        designator: non_blank(&record.designator),
        name: non_blank(&record.device_name),
    };
    if attributes.is_empty() {
        return AttributeOutcome::Skipped;
    }

    match host.set_attributes(instance_id, &attributes).await {
        Ok(()) => AttributeOutcome::Applied(attributes),
        Err(e) => AttributeOutcome::AttributeMutationFailed(e),
    }
}

/// `(width, height)` of the pin extent. The box itself is anchored at the
/// placement origin; a symbol without pins has zero size.
pub fn bounding_box(pins: &[ResolvedPin]) -> (f64, f64) {
    if pins.is_empty() {
        return (0.0, 0.0);
    }

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for pin in pins {
        min_x = min_x.min(pin.x);
        min_y = min_y.min(pin.y);
        max_x = max_x.max(pin.x);
        max_y = max_y.max(pin.y);
    }
    (max_x - min_x, max_y - min_y)
}
