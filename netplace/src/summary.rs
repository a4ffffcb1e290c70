//! Run summary and the final user-facing outcome.

use serde::Serialize;

use crate::host::ToastSeverity;
use crate::synthesis::WireReport;

/// How a finished run is classified for the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Netlist had no components
    Empty,
    AllSucceeded,
    PartialSuccess,
    NoneSucceeded,
}

impl RunOutcome {
    pub fn severity(&self) -> ToastSeverity {
        match self {
            RunOutcome::Empty => ToastSeverity::Info,
            RunOutcome::AllSucceeded => ToastSeverity::Success,
            RunOutcome::PartialSuccess => ToastSeverity::Warning,
            RunOutcome::NoneSucceeded => ToastSeverity::Error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructionSummary {
    pub total: usize,
    pub succeeded: usize,
    /// Designators (or component ids) of components that failed, in netlist order
    pub failed_designators: Vec<String>,
    pub wires: WireReport,
}

impl ReconstructionSummary {
    pub fn failed(&self) -> usize {
        self.failed_designators.len()
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.total == 0 {
            RunOutcome::Empty
        } else if self.succeeded == self.total {
            RunOutcome::AllSucceeded
        } else if self.succeeded == 0 {
            RunOutcome::NoneSucceeded
        } else {
            RunOutcome::PartialSuccess
        }
    }

    /// Text of the final notification.
    pub fn message(&self) -> String {
        match self.outcome() {
            RunOutcome::Empty => "Netlist contains no components".to_string(),
            RunOutcome::AllSucceeded => format!(
                "Placed all {} components ({} net stubs)",
                self.total, self.wires.stubs_created
            ),
            RunOutcome::PartialSuccess => format!(
                "Placed {} of {} components. Failed: {}",
                self.succeeded,
                self.total,
                self.failed_designators.join(", ")
            ),
            RunOutcome::NoneSucceeded => format!(
                "No components could be placed ({} failed)",
                self.total
            ),
        }
    }
}
