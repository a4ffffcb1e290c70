//! Reconstruction orchestration shared by the CLI and embedding hosts.
//!
//! A run walks the netlist once, in declaration order. Each component gets
//! the next grid slot, is placed, and is handed to the wire synthesis
//! strategy. Per-component failures are recorded and the run continues;
//! only an unavailable device library aborts it.

use crate::config::ReconstructOptions;
use crate::host::{HostError, LibraryHandle, SchematicHost, ToastSeverity};
use crate::parser::{NetlistDocument, ParseError};
use crate::placement::{AttributeOutcome, ComponentPlacer, PlacedComponent, PlacementFailure};
use crate::resolver::DeviceResolver;
use crate::summary::ReconstructionSummary;
use crate::synthesis::{strategy_for, WireReport};

#[derive(Debug, thiserror::Error)]
pub enum NetplaceError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Device library is not available")]
    LibraryUnavailable,
    #[error("Host error: {0}")]
    Host(#[from] HostError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(String),
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct ReconstructionRun {
    pub summary: ReconstructionSummary,
    /// Placed components, netlist order
    pub placed: Vec<PlacedComponent>,
    pub failures: Vec<PlacementFailure>,
}

/// Drives one host through reconstruction runs.
pub struct Reconstructor<'h, H: SchematicHost> {
    host: &'h H,
    options: ReconstructOptions,
}

impl<'h, H: SchematicHost> Reconstructor<'h, H> {
    pub fn new(host: &'h H, options: ReconstructOptions) -> Self {
        Self { host, options }
    }

    pub fn options(&self) -> &ReconstructOptions {
        &self.options
    }

    /// Reconstruct `doc` on the host and return the summary.
    pub async fn reconstruct(
        &self,
        doc: &NetlistDocument,
    ) -> Result<ReconstructionSummary, NetplaceError> {
        Ok(self.run(doc).await?.summary)
    }

    /// Like [`Reconstructor::reconstruct`], also returning placed
    /// components and failure details.
    pub async fn run(&self, doc: &NetlistDocument) -> Result<ReconstructionRun, NetplaceError> {
        let library = match self.library().await {
            Ok(library) => library,
            Err(e) => {
                let message = format!("Reconstruction aborted: {}", e);
                tracing::error!("{}", message);
                self.host.log(&message);
                self.host.toast(ToastSeverity::Error, &message);
                return Err(e);
            }
        };

        let mut resolver = DeviceResolver::new(self.options.name_search_limit);
        if self.options.cache_lookups {
            resolver = resolver.with_cache();
        }
        let placer = ComponentPlacer::new(&resolver, &library);
        let mut strategy = strategy_for(&self.options);
        tracing::info!(
            "Reconstructing {} components with {} wire synthesis",
            doc.len(),
            strategy.name()
        );

        let mut cursor = self.options.grid().cursor();
        let host: &dyn SchematicHost = self.host;

        let mut placed = Vec::new();
        let mut failures = Vec::new();
        let mut wires = WireReport::default();

        for (component_id, record) in doc.iter() {
            let position = cursor.advance();
            match placer.place(self.host, component_id, record, position).await {
                Ok(placement) => {
                    if let AttributeOutcome::AttributeMutationFailed(e) = &placement.attributes {
                        let message = format!(
                            "Could not set attributes on {}: {}",
                            record.display_name(component_id),
                            e
                        );
                        tracing::warn!("{}", message);
                        self.host.log(&message);
                    }
                    wires.merge(
                        strategy
                            .on_component_placed(host, &placement.component, record)
                            .await,
                    );
                    placed.push(placement.component);
                }
                Err(failure) => {
                    let message =
                        format!("Failed to place {}: {}", failure.designator, failure.error);
                    tracing::warn!("{}", message);
                    self.host.log(&message);
                    failures.push(failure);
                }
            }
        }

        wires.merge(strategy.finish(host).await);

        let summary = ReconstructionSummary {
            total: doc.len(),
            succeeded: placed.len(),
            failed_designators: failures.iter().map(|f| f.designator.clone()).collect(),
            wires,
        };

        let message = summary.message();
        tracing::info!(
            "Reconstruction finished: {}/{} placed, {} stubs ({} failed, {} unmatched pins)",
            summary.succeeded,
            summary.total,
            wires.stubs_created,
            wires.stub_failures,
            wires.unmatched_pins
        );
        self.host.log(&message);
        self.host.toast(summary.outcome().severity(), &message);

        Ok(ReconstructionRun {
            summary,
            placed,
            failures,
        })
    }

    async fn library(&self) -> Result<LibraryHandle, NetplaceError> {
        self.host
            .library_namespace()
            .await?
            .ok_or(NetplaceError::LibraryUnavailable)
    }
}
