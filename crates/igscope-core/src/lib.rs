//! Shared configuration and run-input types for igscope.

mod app_config;
mod config;
mod input;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use input::{normalize_username, RunInput};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid run input: {0}")]
    InvalidInput(String),

    #[error("no usernames supplied; provide at least one profile to fetch")]
    NoUsernames,
}
