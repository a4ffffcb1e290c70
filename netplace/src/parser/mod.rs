pub mod format_detector;
pub mod netlist;

// Re-export for convenience
pub use format_detector::{detect_and_parse, NetlistFormat, SUPPORTED_EXTENSIONS};
pub use netlist::{parse, parse_bytes, ComponentRecord, NetMember, NetlistDocument, ParseError};
