//! Net Wire Synthesis
//!
//! Connectivity is expressed with net labels rather than routed wires: each
//! connected pin gets one short straight stub carrying the uppercased net
//! name. Two strategies decide *when* stubs are emitted:
//!
//! - [`ImmediateSynthesis`] stubs a component's pins as soon as it is placed.
//! - [`GroupedSynthesis`] waits until every component is placed, groups
//!   pins by net, and can leave single-pin nets unwired.
//!
//! Stubs extend away from the component body: pins at or right of the
//! component's horizontal center get a rightward stub, the rest leftward.

pub mod grouped;
pub mod immediate;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{ReconstructOptions, SynthesisStrategy};
use crate::host::{ResolvedPin, SchematicHost};
use crate::parser::ComponentRecord;
use crate::placement::PlacedComponent;

pub use grouped::{build_net_groups, GroupedSynthesis, NetGroup, NetGroupEntry};
pub use immediate::ImmediateSynthesis;

/// Canonical label for a net name. Case-insensitive: `vcc` and `VCC`
/// produce the same label.
pub fn normalize_net_name(net_name: &str) -> String {
    net_name.trim().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubDirection {
    Left,
    Right,
}

/// Direction of the stub for `pin`; a pin exactly on the center goes right.
pub fn stub_direction(component: &PlacedComponent, pin: &ResolvedPin) -> StubDirection {
    if pin.x >= component.center_x() {
        StubDirection::Right
    } else {
        StubDirection::Left
    }
}

/// Stub segment `[x1, y1, x2, y2]` for `pin`.
pub fn stub_line(component: &PlacedComponent, pin: &ResolvedPin, length: f64) -> [f64; 4] {
    let end_x = match stub_direction(component, pin) {
        StubDirection::Right => pin.x + length,
        StubDirection::Left => pin.x - length,
    };
    [pin.x, pin.y, end_x, pin.y]
}

/// Counters from one synthesis step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WireReport {
    pub stubs_created: usize,
    pub stub_failures: usize,
    /// Declared pins with no realized pin of the same number
    pub unmatched_pins: usize,
    pub skipped_single_pin_nets: usize,
}

impl WireReport {
    pub fn merge(&mut self, other: WireReport) {
        self.stubs_created += other.stubs_created;
        self.stub_failures += other.stub_failures;
        self.unmatched_pins += other.unmatched_pins;
        self.skipped_single_pin_nets += other.skipped_single_pin_nets;
    }
}

/// When and how stubs are emitted during a run
#[async_trait]
pub trait WireSynthesisStrategy: Send {
    fn name(&self) -> &'static str;

    /// Called once per successfully placed component, in netlist order
    async fn on_component_placed(
        &mut self,
        host: &dyn SchematicHost,
        component: &PlacedComponent,
        record: &ComponentRecord,
    ) -> WireReport;

    /// Called once after the last component
    async fn finish(&mut self, host: &dyn SchematicHost) -> WireReport;
}

/// Strategy selected by the options.
pub fn strategy_for(options: &ReconstructOptions) -> Box<dyn WireSynthesisStrategy> {
    match options.strategy {
        SynthesisStrategy::Immediate => Box::new(ImmediateSynthesis::new(options.stub_length)),
        SynthesisStrategy::Grouped => Box::new(GroupedSynthesis::new(
            options.stub_length,
            options.single_pin_nets,
        )),
    }
}

/// Create one stub; failures are logged and counted, never returned.
pub(crate) async fn emit_stub(
    host: &dyn SchematicHost,
    component: &PlacedComponent,
    pin: &ResolvedPin,
    net_name: &str,
    stub_length: f64,
    report: &mut WireReport,
) {
    let label = normalize_net_name(net_name);
    if label.is_empty() {
        tracing::debug!(
            "Pin {} of {} has no net name, no stub",
            pin.pin_number,
            component.component_id
        );
        return;
    }

    let line = stub_line(component, pin, stub_length);
    match host.create_labeled_segment(line, &label).await {
        Ok(()) => report.stubs_created += 1,
        Err(e) => {
            report.stub_failures += 1;
            let message = format!(
                "Failed to create {} stub on {} pin {}: {}",
                label, component.component_id, pin.pin_number, e
            );
            tracing::warn!("{}", message);
            host.log(&message);
        }
    }
}

/// Log a declared pin the placed symbol does not have.
pub(crate) fn report_unmatched_pin(
    host: &dyn SchematicHost,
    component: &PlacedComponent,
    pin_number: &str,
    report: &mut WireReport,
) {
    report.unmatched_pins += 1;
    let message = format!(
        "Pin {} of {} not found on placed symbol, skipped",
        pin_number, component.component_id
    );
    tracing::warn!("{}", message);
    host.log(&message);
}
