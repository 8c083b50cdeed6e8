//! Upload pipeline: validation, encoding, and the per-batch report.

pub mod rules;

use serde::{Deserialize, Serialize};

pub use rules::{CandidateFile, Rejection, UploadRules};

/// A file that did not make it into the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of one upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    pub succeeded: usize,
    pub failures: Vec<UploadFailure>,
    /// Set when the whole batch was refused before any write.
    pub aborted: Option<String>,
}

impl UploadReport {
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            aborted: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn reject(&mut self, rejection: &Rejection) {
        self.failures.push(UploadFailure {
            name: rejection.name().to_string(),
            reason: rejection.message(),
        });
    }

    pub fn fail(&mut self, name: &str, reason: impl Into<String>) {
        self.failures.push(UploadFailure {
            name: name.to_string(),
            reason: reason.into(),
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Toast text for a batch that stored at least one file.
    pub fn success_message(&self) -> String {
        format!("{} asset(s) uploaded successfully", self.succeeded)
    }
}
