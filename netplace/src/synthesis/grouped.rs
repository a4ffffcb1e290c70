//! Net-grouped stub synthesis.
//!
//! Placed components are collected during the run. At the end their
//! declared pins are grouped by normalized net name across the whole
//! schematic, and each group is stubbed (or dropped, for single-pin nets
//! under [`SinglePinNetPolicy::Drop`]).

use async_trait::async_trait;

use super::{
    emit_stub, normalize_net_name, report_unmatched_pin, WireReport, WireSynthesisStrategy,
};
use crate::config::SinglePinNetPolicy;
use crate::host::{ResolvedPin, SchematicHost};
use crate::parser::ComponentRecord;
use crate::placement::PlacedComponent;

/// One pin connected to a net
#[derive(Debug, Clone, PartialEq)]
pub struct NetGroupEntry<'a> {
    pub component: &'a PlacedComponent,
    pub pin_number: &'a str,
    /// Realized pin on the placed symbol
    pub pin: &'a ResolvedPin,
    /// Net name as declared, before normalization
    pub declared_net: &'a str,
}

/// All connections of one net, in placement order
#[derive(Debug, Clone, PartialEq)]
pub struct NetGroup<'a> {
    pub name: String,
    pub entries: Vec<NetGroupEntry<'a>>,
}

/// A declared pin without a realized counterpart
#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedPin<'a> {
    pub component: &'a PlacedComponent,
    pub pin_number: &'a str,
}

/// Group declared pins of placed components by normalized net name.
///
/// Groups appear in first-seen order. Pins with a blank net are ignored;
/// declared pins missing from the placed symbol are returned separately.
pub fn build_net_groups<'a>(
    members: &'a [(PlacedComponent, Vec<(String, String)>)],
) -> (Vec<NetGroup<'a>>, Vec<UnmatchedPin<'a>>) {
    let mut groups: Vec<NetGroup<'a>> = Vec::new();
    let mut unmatched = Vec::new();

    for (component, declared) in members {
        for (pin_number, net_name) in declared {
            let name = normalize_net_name(net_name);
            if name.is_empty() {
                continue;
            }
            let Some(pin) = component.pin(pin_number) else {
                unmatched.push(UnmatchedPin {
                    component,
                    pin_number: pin_number.as_str(),
                });
                continue;
            };

            let entry = NetGroupEntry {
                component,
                pin_number: pin_number.as_str(),
                pin,
                declared_net: net_name.as_str(),
            };
            match groups.iter_mut().find(|g| g.name == name) {
                Some(group) => group.entries.push(entry),
                None => groups.push(NetGroup {
                    name,
                    entries: vec![entry],
                }),
            }
        }
    }

    (groups, unmatched)
}

pub struct GroupedSynthesis {
    stub_length: f64,
    single_pin_nets: SinglePinNetPolicy,
    members: Vec<(PlacedComponent, Vec<(String, String)>)>,
}

impl GroupedSynthesis {
    pub fn new(stub_length: f64, single_pin_nets: SinglePinNetPolicy) -> Self {
        Self {
            stub_length,
            single_pin_nets,
            members: Vec::new(),
        }
    }
}

#[async_trait]
impl WireSynthesisStrategy for GroupedSynthesis {
    fn name(&self) -> &'static str {
        "grouped"
    }

    async fn on_component_placed(
        &mut self,
        _host: &dyn SchematicHost,
        component: &PlacedComponent,
        record: &ComponentRecord,
    ) -> WireReport {
        self.members.push((component.clone(), record.pins.clone()));
        WireReport::default()
    }

    async fn finish(&mut self, host: &dyn SchematicHost) -> WireReport {
        let members = std::mem::take(&mut self.members);
        let (groups, unmatched) = build_net_groups(&members);
        let mut report = WireReport::default();

        for miss in unmatched {
            report_unmatched_pin(host, miss.component, miss.pin_number, &mut report);
        }

        tracing::debug!("Synthesizing stubs for {} nets", groups.len());
        for group in &groups {
            if self.single_pin_nets == SinglePinNetPolicy::Drop && group.entries.len() < 2 {
                tracing::debug!("Dropping single-pin net {}", group.name);
                report.skipped_single_pin_nets += 1;
                continue;
            }
            for entry in &group.entries {
                emit_stub(
                    host,
                    entry.component,
                    entry.pin,
                    &group.name,
                    self.stub_length,
                    &mut report,
                )
                .await;
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(id: &str, pins: &[(&str, f64)]) -> PlacedComponent {
        PlacedComponent {
            instance_id: format!("inst-{}", id),
            component_id: id.into(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            pins: pins
                .iter()
                .map(|(n, x)| ResolvedPin {
                    pin_number: n.to_string(),
                    x: *x,
                    y: 0.0,
                })
                .collect(),
        }
    }

    fn declared(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(p, n)| (p.to_string(), n.to_string()))
            .collect()
    }

    #[test]
    fn test_groups_merge_case_variants_in_first_seen_order() {
        let members = vec![
            (
                placed("C1", &[("1", 0.0), ("2", 10.0)]),
                declared(&[("1", "gnd"), ("2", "vcc")]),
            ),
            (
                placed("C2", &[("1", 0.0), ("2", 10.0)]),
                declared(&[("1", "VCC"), ("2", "")]),
            ),
        ];
        let (groups, unmatched) = build_net_groups(&members);

        assert!(unmatched.is_empty());
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["GND", "VCC"]);
        assert_eq!(groups[1].entries.len(), 2);
        assert_eq!(groups[1].entries[0].declared_net, "vcc");
        assert_eq!(groups[1].entries[1].component.component_id, "C2");
    }

    #[test]
    fn test_missing_pins_are_reported() {
        let members = vec![(placed("U1", &[("1", 0.0)]), declared(&[("1", "A"), ("7", "B")]))];
        let (groups, unmatched) = build_net_groups(&members);
        assert_eq!(groups.len(), 1);
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].pin_number, "7");
    }
}
