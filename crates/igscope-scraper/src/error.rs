use std::fmt;

use thiserror::Error;

/// Why a fetch attempt failed in a way that may clear up on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// The endpoint answered with a non-2xx status.
    HttpStatus(u16),
    /// The connection (direct or through the proxy) could not be established.
    Egress,
    /// The request did not complete within the client timeout.
    Timeout,
}

impl fmt::Display for TransientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransientKind::HttpStatus(status) => write!(f, "HTTP status {status}"),
            TransientKind::Egress => f.write_str("egress error"),
            TransientKind::Timeout => f.write_str("timeout"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("profile {username} does not exist or is private")]
    ProfileUnavailable { username: String },

    #[error("profile record for {username} has no user object")]
    MalformedProfile { username: String },

    #[error("transient failure fetching {username}: {kind}")]
    Transient {
        username: String,
        kind: TransientKind,
    },

    #[error("unexpected error: {detail}")]
    Unexpected { detail: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid proxy URL: {reason}")]
    InvalidProxy { reason: String },

    #[error("failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: TransientKind },
}

/// Outcome-level classification of a [`ScraperError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Profile missing or private. Not a system fault.
    ProfileUnavailable,
    /// A transient error surfaced without going through the retry budget.
    Transient,
    /// Anything else; stops the job immediately.
    Unexpected,
    /// Every attempt failed with a transient error.
    Exhausted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::ProfileUnavailable => "profile_unavailable",
            FailureKind::Transient => "transient",
            FailureKind::Unexpected => "unexpected",
            FailureKind::Exhausted => "exhausted",
        };
        f.write_str(label)
    }
}

impl ScraperError {
    /// Maps the error onto the outcome taxonomy.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ScraperError::ProfileUnavailable { .. } | ScraperError::MalformedProfile { .. } => {
                FailureKind::ProfileUnavailable
            }
            ScraperError::Transient { .. } => FailureKind::Transient,
            ScraperError::RetriesExhausted { .. } => FailureKind::Exhausted,
            ScraperError::Unexpected { .. }
            | ScraperError::Deserialize { .. }
            | ScraperError::InvalidProxy { .. } => FailureKind::Unexpected,
        }
    }

    /// Returns `true` if another attempt with a fresh egress session may succeed.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, ScraperError::Transient { .. })
    }

    /// Classifies a `reqwest` transport error raised while fetching `username`.
    ///
    /// Status, timeout and connect failures are transient; anything else
    /// (redirect loops, body decoding, builder errors) is unexpected.
    pub(crate) fn from_transport(username: &str, err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            Some(TransientKind::Timeout)
        } else if let Some(status) = err.status() {
            Some(TransientKind::HttpStatus(status.as_u16()))
        } else if err.is_connect() {
            Some(TransientKind::Egress)
        } else {
            None
        };

        match kind {
            Some(kind) => ScraperError::Transient {
                username: username.to_owned(),
                kind,
            },
            None => ScraperError::Unexpected {
                detail: format!("reqwest::Error: {err}"),
            },
        }
    }
}
