//! Interactive import: pick a netlist file, confirm, reconstruct.
//!
//! Declining the file dialog or the confirmation prompt cancels the import
//! before anything on the schematic has changed.

use crate::config::ReconstructOptions;
use crate::core::{NetplaceError, Reconstructor};
use crate::host::{Interaction, SchematicHost, ToastSeverity};
use crate::parser::{parse_bytes, SUPPORTED_EXTENSIONS};
use crate::summary::ReconstructionSummary;

/// How an import ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// No file was selected
    NoFileSelected,
    /// The user declined to start the reconstruction
    Declined,
    Completed(ReconstructionSummary),
}

/// Run the full import flow against `host`.
///
/// Parse failures are reported to the user and returned; library failures
/// are reported by the reconstruction itself.
pub async fn import_netlist<I, H>(
    interaction: &I,
    host: &H,
    options: ReconstructOptions,
) -> Result<ImportOutcome, NetplaceError>
where
    I: Interaction + ?Sized,
    H: SchematicHost,
{
    let Some(raw) = interaction.select_file(SUPPORTED_EXTENSIONS).await? else {
        tracing::info!("Netlist import cancelled at file selection");
        return Ok(ImportOutcome::NoFileSelected);
    };

    let doc = match parse_bytes(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            let message = format!("Could not read netlist: {}", e);
            tracing::error!("{}", message);
            host.log(&message);
            host.toast(ToastSeverity::Error, &message);
            return Err(e.into());
        }
    };

    let prompt = format!(
        "Place {} components from the netlist onto the schematic?",
        doc.len()
    );
    if !interaction.confirm(&prompt).await? {
        tracing::info!("Netlist import declined");
        return Ok(ImportOutcome::Declined);
    }

    let summary = Reconstructor::new(host, options).reconstruct(&doc).await?;
    Ok(ImportOutcome::Completed(summary))
}
