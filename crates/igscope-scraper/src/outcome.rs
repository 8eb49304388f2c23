//! Terminal result of one username's job.

use crate::error::{FailureKind, ScraperError};
use crate::metrics::ProfileMetrics;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub username: String,
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    #[must_use]
    pub fn from_error(username: &str, err: &ScraperError) -> Self {
        Self {
            username: username.to_owned(),
            kind: err.failure_kind(),
            message: err.to_string(),
        }
    }
}

/// Exactly one of these is produced per scheduled username.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(ProfileMetrics),
    Failure(FetchFailure),
}

impl FetchOutcome {
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            FetchOutcome::Success(metrics) => &metrics.username,
            FetchOutcome::Failure(failure) => &failure.username,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// The record to persist, if this outcome is eligible for the sink.
    #[must_use]
    pub fn metrics(&self) -> Option<&ProfileMetrics> {
        match self {
            FetchOutcome::Success(metrics) if metrics.error.is_none() => Some(metrics),
            _ => None,
        }
    }
}
