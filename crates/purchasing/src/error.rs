//! Purchase workflow error taxonomy.

use thiserror::Error;

/// Errors surfaced by the purchase workflow.
///
/// Only critical-path failures appear here; side-channel failures
/// (aggregate counters, profile sync, download-count increments) are
/// logged and swallowed, never surfaced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    /// Required buyer fields were empty. Recoverable: the user corrects
    /// the form and resubmits.
    #[error("missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    /// No authenticated identity was supplied. The workflow state is
    /// unchanged; the user signs in and retries.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The critical-path persistence call failed; no license key was
    /// issued and the workflow stays at payment confirmation for a
    /// user-initiated retry.
    #[error("failed to record purchase: {0}")]
    PurchaseRecord(String),

    /// The operation is not valid in the current workflow state.
    #[error("{operation} is not allowed while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// The per-purchase download cap is spent.
    #[error("download limit reached ({used} of {max} downloads used)")]
    DownloadLimitExhausted { used: u32, max: u32 },
}

impl PurchaseError {
    pub fn validation<I, T>(missing: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::Validation {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    pub fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        Self::InvalidState { operation, state }
    }
}
