//! Netplace CLI - place JSON netlists onto a schematic from the command line.

use async_trait::async_trait;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use netplace::host::{DeviceCatalog, HostError, InMemoryHost, Interaction};
use netplace::{
    import_netlist, parse_file, ImportOutcome, NetlistFormat, ReconstructOptions,
    ReconstructionSummary, RunOutcome, SinglePinNetPolicy, SynthesisStrategy,
};
use std::path::{Path, PathBuf};
use std::process;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "netplace")]
#[command(about = "Netlist to schematic placement tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a netlist onto a schematic built from a device catalog
    Place {
        /// Path to .json or .enet netlist
        #[arg(value_name = "NETLIST")]
        netlist: PathBuf,

        /// Device catalog (JSON)
        #[arg(short, long, value_name = "CATALOG")]
        library: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Write the resulting schematic snapshot (JSON) to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Reconstruction options file (JSON); flags below override it
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Wire synthesis strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Leave nets with a single pin unwired (grouped strategy)
        #[arg(long)]
        drop_single_pin_nets: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Exit with error code if any component failed to place
        #[arg(long)]
        fail_on_partial: bool,
    },

    /// Show the components and nets of a netlist
    Inspect {
        /// Path to .json or .enet netlist
        #[arg(value_name = "NETLIST")]
        netlist: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// List accepted netlist formats
    Formats,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Stub each component's pins as soon as it is placed
    Immediate,
    /// Stub all pins after placement, grouped by net
    Grouped,
}

/// File selection and confirmation on the terminal
struct TerminalInteraction {
    netlist: PathBuf,
    assume_yes: bool,
}

#[async_trait]
impl Interaction for TerminalInteraction {
    async fn select_file(&self, _extensions: &[&str]) -> Result<Option<Vec<u8>>, HostError> {
        tokio::fs::read(&self.netlist)
            .await
            .map(Some)
            .map_err(|e| HostError::CallFailed(format!("{}: {}", self.netlist.display(), e)))
    }

    async fn confirm(&self, message: &str) -> Result<bool, HostError> {
        if self.assume_yes {
            return Ok(true);
        }

        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(format!("{} [y/N] ", message).as_bytes())
            .await
            .map_err(|e| HostError::CallFailed(e.to_string()))?;
        stderr
            .flush()
            .await
            .map_err(|e| HostError::CallFailed(e.to_string()))?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| HostError::CallFailed(e.to_string()))?;
        Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Commands::Place {
            netlist,
            library,
            format,
            output,
            config,
            strategy,
            drop_single_pin_nets,
            yes,
            fail_on_partial,
        } => {
            let options = match build_options(config.as_deref(), strategy, drop_single_pin_nets) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };
            handle_place(
                &netlist,
                &library,
                format,
                output.as_deref(),
                options,
                yes,
                fail_on_partial,
            )
            .await
        }
        Commands::Inspect { netlist, format } => handle_inspect(&netlist, format),
        Commands::Formats => {
            handle_formats();
            0
        }
    };

    process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_options(
    config: Option<&Path>,
    strategy: Option<StrategyArg>,
    drop_single_pin_nets: bool,
) -> Result<ReconstructOptions, netplace::NetplaceError> {
    let mut options = match config {
        Some(path) => ReconstructOptions::from_json_file(path)?,
        None => ReconstructOptions::default(),
    };
    if let Some(strategy) = strategy {
        options.strategy = match strategy {
            StrategyArg::Immediate => SynthesisStrategy::Immediate,
            StrategyArg::Grouped => SynthesisStrategy::Grouped,
        };
    }
    if drop_single_pin_nets {
        options.single_pin_nets = SinglePinNetPolicy::Drop;
    }
    Ok(options)
}

async fn handle_place(
    netlist: &Path,
    library: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    options: ReconstructOptions,
    assume_yes: bool,
    fail_on_partial: bool,
) -> i32 {
    if NetlistFormat::from_path(netlist).is_none() {
        eprintln!("Error: Netlist must be a .json or .enet file");
        return 1;
    }

    let catalog = match DeviceCatalog::from_json_file(library) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };
    let host = InMemoryHost::new(catalog);
    let interaction = TerminalInteraction {
        netlist: netlist.to_path_buf(),
        assume_yes,
    };

    let summary = match import_netlist(&interaction, &host, options).await {
        Ok(ImportOutcome::Completed(summary)) => summary,
        Ok(ImportOutcome::Declined) | Ok(ImportOutcome::NoFileSelected) => {
            eprintln!("Cancelled, nothing was placed");
            return 0;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let snapshot = host.snapshot();
    if let Some(path) = output {
        let written = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            eprintln!("Error: could not write {}: {}", path.display(), e);
            return 1;
        }
    }

    match format {
        OutputFormat::Human => output_place_human(netlist, &summary, &host),
        OutputFormat::Json => print_json(&serde_json::json!({
            "file": netlist.display().to_string(),
            "outcome": summary.outcome(),
            "summary": summary,
            "schematic": snapshot,
        })),
    }

    match summary.outcome() {
        RunOutcome::NoneSucceeded => 1,
        RunOutcome::PartialSuccess if fail_on_partial => 1,
        _ => 0,
    }
}

fn output_place_human(netlist: &Path, summary: &ReconstructionSummary, host: &InMemoryHost) {
    println!("\nNetlist: {}", netlist.display());
    println!("{}", "─".repeat(60));
    println!("  {}", summary.message());

    let symbols = host.symbols();
    if !symbols.is_empty() {
        println!("\n  Symbols:");
        for symbol in &symbols {
            println!(
                "    {:<8} {:<28} ({}, {})",
                symbol.designator.as_deref().unwrap_or("-"),
                symbol.device_name,
                symbol.x,
                symbol.y
            );
        }
    }

    if !summary.failed_designators.is_empty() {
        println!("\n  Failed:");
        for designator in &summary.failed_designators {
            println!("    - {}", designator);
        }
    }

    println!("\n  Summary:");
    println!("    Components:  {}/{}", summary.succeeded, summary.total);
    println!("    Stubs:       {}", summary.wires.stubs_created);
    println!("    Stub errors: {}", summary.wires.stub_failures);
    println!("    Unmatched:   {}", summary.wires.unmatched_pins);
    if summary.wires.skipped_single_pin_nets > 0 {
        println!("    Single-pin nets skipped: {}", summary.wires.skipped_single_pin_nets);
    }
}

fn handle_inspect(netlist: &Path, format: OutputFormat) -> i32 {
    let doc = match parse_file(netlist) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let nets = doc.nets();

    match format {
        OutputFormat::Human => {
            println!("\nNetlist: {}", netlist.display());
            println!("{}", "─".repeat(60));
            println!("\n  Components ({}):", doc.len());
            for (id, record) in doc.iter() {
                println!(
                    "    {:<8} {:<8} {:<28} {}",
                    id,
                    record.display_name(id),
                    record.device_name,
                    record.supplier_part
                );
            }
            println!("\n  Nets ({}):", nets.len());
            for (name, members) in &nets {
                let pins: Vec<String> = members
                    .iter()
                    .map(|m| format!("{}.{}", m.component_id, m.pin_number))
                    .collect();
                println!("    {:<16} {}", name, pins.join(" "));
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "file": netlist.display().to_string(),
            "components": doc.iter().map(|(id, record)| {
                serde_json::json!({
                    "id": id,
                    "designator": record.designator,
                    "device_name": record.device_name,
                    "value": record.value,
                    "supplier_part": record.supplier_part,
                    "pins": record.pins.len(),
                })
            }).collect::<Vec<_>>(),
            "nets": nets.iter().map(|(name, members)| {
                serde_json::json!({
                    "name": name,
                    "pins": members.iter()
                        .map(|m| format!("{}.{}", m.component_id, m.pin_number))
                        .collect::<Vec<_>>(),
                })
            }).collect::<Vec<_>>(),
        })),
    }
    0
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn handle_formats() {
    println!("Accepted netlist formats:\n");
    for format in [NetlistFormat::Json, NetlistFormat::Enet] {
        println!("  .{:<6} {}", format.extension(), format.as_str());
    }
}
