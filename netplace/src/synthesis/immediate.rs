//! Per-component stub synthesis.

use async_trait::async_trait;

use super::{
    emit_stub, normalize_net_name, report_unmatched_pin, WireReport, WireSynthesisStrategy,
};
use crate::host::SchematicHost;
use crate::parser::ComponentRecord;
use crate::placement::PlacedComponent;

/// Stubs every declared pin right after its component is placed.
///
/// Net membership of later components is unknown at that point, so
/// single-pin nets are always stubbed.
pub struct ImmediateSynthesis {
    stub_length: f64,
}

impl ImmediateSynthesis {
    pub fn new(stub_length: f64) -> Self {
        Self { stub_length }
    }
}

#[async_trait]
impl WireSynthesisStrategy for ImmediateSynthesis {
    fn name(&self) -> &'static str {
        "immediate"
    }

    async fn on_component_placed(
        &mut self,
        host: &dyn SchematicHost,
        component: &PlacedComponent,
        record: &ComponentRecord,
    ) -> WireReport {
        let mut report = WireReport::default();
        for (pin_number, net_name) in &record.pins {
            if normalize_net_name(net_name).is_empty() {
                continue;
            }
            match component.pin(pin_number) {
                Some(pin) => {
                    emit_stub(host, component, pin, net_name, self.stub_length, &mut report).await
                }
                None => report_unmatched_pin(host, component, pin_number, &mut report),
            }
        }
        report
    }

    async fn finish(&mut self, _host: &dyn SchematicHost) -> WireReport {
        WireReport::default()
    }
}
