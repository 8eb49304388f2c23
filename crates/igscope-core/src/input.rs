//! Run input: the usernames to fetch and an optional concurrency override.

use serde::Deserialize;

use crate::ConfigError;

/// Input document handed to a run, e.g.
/// `{"usernames": ["nasa", "@natgeo"], "concurrency": 50}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunInput {
    #[serde(default)]
    pub usernames: Vec<String>,
    #[serde(default)]
    pub concurrency: Option<usize>,
}

impl RunInput {
    /// Parses a JSON input document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInput`] if the document is not valid JSON
    /// or does not match the expected shape.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidInput(e.to_string()))
    }

    /// Fails when there is nothing to fetch.
    ///
    /// Blank entries still count here; they are dropped later by the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoUsernames`] if `usernames` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.usernames.is_empty() {
            return Err(ConfigError::NoUsernames);
        }
        Ok(())
    }
}

/// Strips surrounding whitespace and `@` from a username.
///
/// Returns `None` if nothing is left. Case is preserved.
#[must_use]
pub fn normalize_username(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '@');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
