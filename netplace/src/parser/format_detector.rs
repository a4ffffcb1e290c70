//! Netlist Format Detection
//!
//! Netlists arrive either as plain `.json` files or with the `.enet`
//! suffix. Both carry the same JSON document; the suffix only decides
//! whether a file is offered for import.

use std::path::Path;

use crate::parser::netlist::{parse_bytes, NetlistDocument, ParseError};

/// File extensions offered by the import dialog.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["json", "enet"];

/// Netlist container format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetlistFormat {
    /// Plain JSON netlist
    Json,
    /// `.enet` netlist export (same JSON shape)
    Enet,
}

impl NetlistFormat {
    /// Get format name for display
    pub fn as_str(&self) -> &'static str {
        match self {
            NetlistFormat::Json => "JSON netlist",
            NetlistFormat::Enet => "ENET netlist",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            NetlistFormat::Json => "json",
            NetlistFormat::Enet => "enet",
        }
    }

    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("json") {
            Some(NetlistFormat::Json)
        } else if ext.eq_ignore_ascii_case("enet") {
            Some(NetlistFormat::Enet)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Decode file contents. Both formats share one decoder.
pub fn detect_and_parse(
    format: NetlistFormat,
    raw: &[u8],
) -> Result<NetlistDocument, ParseError> {
    tracing::debug!("Decoding {} ({} bytes)", format.as_str(), raw.len());
    parse_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_supported_extensions() {
        assert_eq!(
            NetlistFormat::from_path(Path::new("board.json")),
            Some(NetlistFormat::Json)
        );
        assert_eq!(
            NetlistFormat::from_path(Path::new("board.ENET")),
            Some(NetlistFormat::Enet)
        );
        assert_eq!(NetlistFormat::from_path(Path::new("board.kicad_sch")), None);
        assert_eq!(NetlistFormat::from_path(Path::new("board")), None);
    }

    #[test]
    fn test_enet_decodes_like_json() {
        let raw = br#"{"C1": {"props": {"Designator": "R1"}, "pins": {"1": "VCC"}}}"#;
        assert_eq!(
            detect_and_parse(NetlistFormat::Enet, raw).unwrap(),
            detect_and_parse(NetlistFormat::Json, raw).unwrap()
        );
    }
}
