use crate::imaging::ProbeError;
use thiserror::Error;

/// Failure of a single plan call.
#[derive(Error, Debug)]
pub enum PlanError {
    /// Invalid option values. Fatal to the call, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The source could not be probed. Callers usually substitute a
    /// placeholder instead of failing the page; see `Planner::plan_or_fallback`.
    #[error(transparent)]
    SourceUnavailable(#[from] ProbeError),
}

impl PlanError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
