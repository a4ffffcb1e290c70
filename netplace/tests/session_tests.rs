//! Tests for the interactive import flow

use async_trait::async_trait;
use netplace::host::{DeviceCatalog, HostError, InMemoryHost, Interaction, ToastSeverity};
use netplace::{import_netlist, ImportOutcome, NetplaceError, ParseError, ReconstructOptions};
use std::path::PathBuf;
use std::sync::Mutex;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Plays back a fixed file selection and confirmation answer.
struct ScriptedInteraction {
    file: Option<Vec<u8>>,
    answer: bool,
    prompts: Mutex<Vec<String>>,
    requested_extensions: Mutex<Vec<String>>,
}

impl ScriptedInteraction {
    fn new(file: Option<&str>, answer: bool) -> Self {
        Self {
            file: file.map(|name| std::fs::read(fixture_path(name)).expect("Fixture should exist")),
            answer,
            prompts: Mutex::new(Vec::new()),
            requested_extensions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Interaction for ScriptedInteraction {
    async fn select_file(&self, extensions: &[&str]) -> Result<Option<Vec<u8>>, HostError> {
        self.requested_extensions
            .lock()
            .unwrap()
            .extend(extensions.iter().map(|e| e.to_string()));
        Ok(self.file.clone())
    }

    async fn confirm(&self, message: &str) -> Result<bool, HostError> {
        self.prompts.lock().unwrap().push(message.to_string());
        Ok(self.answer)
    }
}

fn host() -> InMemoryHost {
    InMemoryHost::new(
        DeviceCatalog::from_json_file(&fixture_path("library.json")).expect("Library fixture"),
    )
}

#[tokio::test]
async fn test_import_completes() {
    let interaction = ScriptedInteraction::new(Some("board.enet"), true);
    let host = host();

    let outcome = import_netlist(&interaction, &host, ReconstructOptions::default())
        .await
        .expect("Import should succeed");

    let summary = match outcome {
        ImportOutcome::Completed(summary) => summary,
        other => panic!("Expected a completed import, got {:?}", other),
    };
    assert_eq!(summary.total, 4);
    assert_eq!(host.symbols().len(), 3);
    assert_eq!(
        *interaction.requested_extensions.lock().unwrap(),
        vec!["json".to_string(), "enet".to_string()]
    );
    assert!(interaction.prompts.lock().unwrap()[0].contains("4 components"));
}

#[tokio::test]
async fn test_cancelled_file_dialog_changes_nothing() {
    let interaction = ScriptedInteraction::new(None, true);
    let host = host();

    let outcome = import_netlist(&interaction, &host, ReconstructOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome, ImportOutcome::NoFileSelected);
    assert!(interaction.prompts.lock().unwrap().is_empty());
    assert!(host.toasts().is_empty());
}

#[tokio::test]
async fn test_declined_confirmation_changes_nothing() {
    let interaction = ScriptedInteraction::new(Some("basic.json"), false);
    let host = host();

    let outcome = import_netlist(&interaction, &host, ReconstructOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome, ImportOutcome::Declined);
    assert!(host.symbols().is_empty());
    assert!(host.wires().is_empty());
}

#[tokio::test]
async fn test_malformed_file_is_reported() {
    let interaction = ScriptedInteraction::new(Some("null.json"), true);
    let host = host();

    let result = import_netlist(&interaction, &host, ReconstructOptions::default()).await;

    assert!(matches!(
        result,
        Err(NetplaceError::Parse(ParseError::MalformedFormat(_)))
    ));
    assert!(interaction.prompts.lock().unwrap().is_empty());
    let toasts = host.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, ToastSeverity::Error);
}
