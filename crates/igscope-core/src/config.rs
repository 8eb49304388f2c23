use crate::app_config::{AppConfig, DEFAULT_API_BASE_URL, DEFAULT_APP_ID, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load run configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load run configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build run configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config that talks to the public endpoint without a proxy.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let log_level = or_default("IGSCOPE_LOG_LEVEL", "info");

    // 0 is accepted here; it is only an error if no CLI flag or input file
    // overrides it.
    let concurrency = parse_usize("IGSCOPE_CONCURRENCY", "100")?;

    let request_timeout_secs = parse_u64("IGSCOPE_REQUEST_TIMEOUT_SECS", "30")?;
    let retry_base_delay_secs = parse_u64("IGSCOPE_RETRY_BASE_DELAY_SECS", "2")?;
    let api_base_url = or_default("IGSCOPE_API_BASE_URL", DEFAULT_API_BASE_URL);
    let app_id = or_default("IGSCOPE_APP_ID", DEFAULT_APP_ID);
    let user_agent = or_default("IGSCOPE_USER_AGENT", DEFAULT_USER_AGENT);
    let proxy_url = lookup("IGSCOPE_PROXY_URL")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let output_path = PathBuf::from(or_default("IGSCOPE_OUTPUT_PATH", "./results.jsonl"));

    Ok(AppConfig {
        log_level,
        concurrency,
        request_timeout_secs,
        retry_base_delay_secs,
        api_base_url,
        app_id,
        user_agent,
        proxy_url,
        output_path,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
