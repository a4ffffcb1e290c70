//! Netplace - netlist to schematic placement library
//!
//! This library reads a JSON netlist (component id -> device properties and
//! pin/net assignments) and rebuilds it as a schematic on a host editor:
//! every component gets a library device, a deterministic grid position and
//! a short labeled wire stub on each connected pin.
//!
//! # Quick Start
//!
//! ```no_run
//! use netplace::host::{DeviceCatalog, InMemoryHost};
//! use netplace::{parse, ReconstructOptions, Reconstructor};
//!
//! # async fn demo() -> Result<(), netplace::NetplaceError> {
//! let doc = parse(r#"{"C1": {"props": {"Designator": "R1", "device_name": "10k"},
//!                            "pins": {"1": "VCC", "2": "GND"}}}"#)?;
//! let host = InMemoryHost::new(DeviceCatalog::default());
//! let summary = Reconstructor::new(&host, ReconstructOptions::default())
//!     .reconstruct(&doc)
//!     .await?;
//!
//! println!("{}", summary.message());
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline
//!
//! - **Parser**: JSON (`.json` / `.enet`) into an ordered [`NetlistDocument`]
//! - **Resolver**: supplier part lookup, falling back to name search
//! - **Layout**: fixed grid indexed by attempted placements
//! - **Placement**: instantiate, set attributes, derive pin bounding box
//! - **Synthesis**: per-pin net-label stubs, immediate or grouped by net

pub mod config;
pub mod core;
pub mod host;
pub mod layout;
pub mod parser;
pub mod placement;
pub mod resolver;
pub mod session;
pub mod summary;
pub mod synthesis;

// Re-export main types
pub use config::{ReconstructOptions, SinglePinNetPolicy, SynthesisStrategy};
pub use crate::core::{NetplaceError, ReconstructionRun, Reconstructor};
pub use layout::GridLayout;
pub use parser::{parse, parse_bytes, ComponentRecord, NetlistDocument, NetlistFormat, ParseError};
pub use placement::{PlacedComponent, PlacementError, PlacementFailure};
pub use session::{import_netlist, ImportOutcome};
pub use summary::{ReconstructionSummary, RunOutcome};

/// Read and parse a netlist file (convenience wrapper).
pub fn parse_file(path: &std::path::Path) -> Result<NetlistDocument, NetplaceError> {
    let format = NetlistFormat::from_path(path).ok_or_else(|| {
        NetplaceError::Parse(ParseError::MalformedFormat(format!(
            "unsupported file extension: {}",
            path.display()
        )))
    })?;
    let raw = std::fs::read(path)?;
    Ok(parser::detect_and_parse(format, &raw)?)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::host::{DeviceCatalog, InMemoryHost, SchematicHost};
    pub use crate::{
        NetlistDocument, NetplaceError, ReconstructOptions, ReconstructionSummary, Reconstructor,
        RunOutcome,
    };
}
