//! Simple reconstruction example: place a netlist against a device catalog
//! and print the resulting symbols and stubs.

use netplace::prelude::*;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let netlist = args
        .next()
        .unwrap_or_else(|| "tests/fixtures/board.enet".to_string());
    let library = args
        .next()
        .unwrap_or_else(|| "tests/fixtures/library.json".to_string());

    let doc = netplace::parse_file(Path::new(&netlist))?;
    let host = InMemoryHost::new(DeviceCatalog::from_json_file(Path::new(&library))?);

    let summary = Reconstructor::new(&host, ReconstructOptions::default())
        .reconstruct(&doc)
        .await?;

    println!("{}", summary.message());
    for symbol in host.symbols() {
        println!(
            "  {:<6} {:<24} ({}, {})",
            symbol.designator.as_deref().unwrap_or("?"),
            symbol.device_name,
            symbol.x,
            symbol.y
        );
    }
    for wire in host.wires() {
        println!("  {:<12} {:?}", wire.label, wire.line);
    }

    if summary.outcome() != RunOutcome::AllSucceeded {
        std::process::exit(1);
    }
    Ok(())
}
