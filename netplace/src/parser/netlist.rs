//! Netlist Document Parser
//!
//! Decodes the JSON netlist exchange format into an ordered document. The
//! top-level value must be an object mapping component ids to component
//! records; everything below that level is read leniently so that a single
//! odd component never rejects the whole file.
//!
//! ```text
//! {
//!   "C1": {
//!     "props": { "Designator": "R1", "device_name": "10k resistor",
//!                "value": "10k", "Supplier Part": "C25804" },
//!     "pins":  { "1": "VCC", "2": "GND" }
//!   }
//! }
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use crate::synthesis::normalize_net_name;

/// Property keys written by [`NetlistDocument::to_json_string`].
const KEY_DESIGNATOR: &str = "Designator";
const KEY_DEVICE_NAME: &str = "device_name";
const KEY_VALUE: &str = "value";
const KEY_SUPPLIER_PART: &str = "Supplier Part";

/// Accepted spellings, canonical key first.
const DESIGNATOR_KEYS: &[&str] = &[KEY_DESIGNATOR, "designator"];
const DEVICE_NAME_KEYS: &[&str] = &[KEY_DEVICE_NAME, "Device", "deviceName"];
const VALUE_KEYS: &[&str] = &[KEY_VALUE, "Value"];
const SUPPLIER_PART_KEYS: &[&str] = &[KEY_SUPPLIER_PART, "supplier_part", "supplierPart"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed netlist: {0}")]
    MalformedFormat(String),
}

/// One component as declared in the netlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentRecord {
    pub designator: String,
    pub device_name: String,
    pub value: String,
    pub supplier_part: String,
    /// `(pin number, net name)` in declaration order
    pub pins: Vec<(String, String)>,
}

impl ComponentRecord {
    /// Net name declared for a pin, if any.
    pub fn net_for_pin(&self, pin_number: &str) -> Option<&str> {
        self.pins
            .iter()
            .find(|(pin, _)| pin == pin_number)
            .map(|(_, net)| net.as_str())
    }

    /// Label used when reporting this component: the designator, or the
    /// component id when the designator is blank.
    pub fn display_name<'a>(&'a self, component_id: &'a str) -> &'a str {
        let designator = self.designator.trim();
        if designator.is_empty() {
            component_id
        } else {
            designator
        }
    }

    fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let props = obj.get("props").and_then(Value::as_object);
        let prop = |keys: &[&str]| -> String {
            props
                .and_then(|p| keys.iter().find_map(|k| p.get(*k)))
                .map(scalar_to_string)
                .unwrap_or_default()
        };

        let pins = obj
            .get("pins")
            .and_then(Value::as_object)
            .map(|pins| {
                pins.iter()
                    .map(|(pin, net)| (pin.clone(), scalar_to_string(net)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            designator: prop(DESIGNATOR_KEYS),
            device_name: prop(DEVICE_NAME_KEYS),
            value: prop(VALUE_KEYS),
            supplier_part: prop(SUPPLIER_PART_KEYS),
            pins,
        }
    }

    fn to_value(&self) -> Value {
        let mut props = Map::new();
        props.insert(KEY_DESIGNATOR.into(), Value::String(self.designator.clone()));
        props.insert(KEY_DEVICE_NAME.into(), Value::String(self.device_name.clone()));
        props.insert(KEY_VALUE.into(), Value::String(self.value.clone()));
        props.insert(KEY_SUPPLIER_PART.into(), Value::String(self.supplier_part.clone()));

        let pins: Map<String, Value> = self
            .pins
            .iter()
            .map(|(pin, net)| (pin.clone(), Value::String(net.clone())))
            .collect();

        let mut obj = Map::new();
        obj.insert("props".into(), Value::Object(props));
        obj.insert("pins".into(), Value::Object(pins));
        Value::Object(obj)
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// A pin reference inside a net summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetMember {
    pub component_id: String,
    pub pin_number: String,
}

/// Ordered netlist: component id -> record, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetlistDocument {
    components: Vec<(String, ComponentRecord)>,
}

impl NetlistDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component. An existing id is replaced in place so ids stay unique.
    pub fn insert(&mut self, component_id: impl Into<String>, record: ComponentRecord) {
        let component_id = component_id.into();
        match self.components.iter_mut().find(|(id, _)| *id == component_id) {
            Some(slot) => slot.1 = record,
            None => self.components.push((component_id, record)),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, component_id: &str) -> Option<&ComponentRecord> {
        self.components
            .iter()
            .find(|(id, _)| id == component_id)
            .map(|(_, record)| record)
    }

    /// Components in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentRecord)> {
        self.components.iter().map(|(id, record)| (id.as_str(), record))
    }

    /// Group declared pins by normalized net name, in first-seen order.
    /// Pins declared with a blank net are left out.
    pub fn nets(&self) -> Vec<(String, Vec<NetMember>)> {
        let mut nets: Vec<(String, Vec<NetMember>)> = Vec::new();
        for (component_id, record) in self.iter() {
            for (pin_number, net) in &record.pins {
                let name = normalize_net_name(net);
                if name.is_empty() {
                    continue;
                }
                let member = NetMember {
                    component_id: component_id.to_string(),
                    pin_number: pin_number.clone(),
                };
                match nets.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, members)) => members.push(member),
                    None => nets.push((name, vec![member])),
                }
            }
        }
        nets
    }

    /// Serialize back to the exchange format.
    pub fn to_json_string(&self) -> String {
        let obj: Map<String, Value> = self
            .components
            .iter()
            .map(|(id, record)| (id.clone(), record.to_value()))
            .collect();
        Value::Object(obj).to_string()
    }
}

impl<'a> IntoIterator for &'a NetlistDocument {
    type Item = (&'a str, &'a ComponentRecord);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Parse netlist text.
pub fn parse(raw: &str) -> Result<NetlistDocument, ParseError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ParseError::MalformedFormat(e.to_string()))?;

    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(ParseError::MalformedFormat(format!(
                "top-level value must be an object, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut doc = NetlistDocument::new();
    for (component_id, record) in &obj {
        doc.insert(component_id.clone(), ComponentRecord::from_value(record));
    }
    Ok(doc)
}

/// Parse raw file bytes (UTF-8, optional BOM).
pub fn parse_bytes(raw: &[u8]) -> Result<NetlistDocument, ParseError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| ParseError::MalformedFormat(format!("invalid UTF-8: {}", e)))?;
    parse(text.strip_prefix('\u{feff}').unwrap_or(text))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
