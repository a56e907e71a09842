//! Configuration management for the credential refresher.
//!
//! Configuration can be set via environment variables:
//! - `CLAUDE_OAUTH_TOKEN_URL` - Optional. Token endpoint. Defaults to the Anthropic console endpoint.
//! - `CLAUDE_OAUTH_CLIENT_ID` - Optional. OAuth client ID. Defaults to the Claude Code client.
//! - `CLAUDE_REFRESH_TIMEOUT_SECS` - Optional. Deadline for the whole refresh. Defaults to `30`.
//! - `GITHUB_OUTPUT` - Optional. Step output file; refreshes are reported there when set.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::oauth::{ANTHROPIC_CLIENT_ID, ANTHROPIC_TOKEN_URL};

/// Default deadline for one refresh run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Refresher configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth token endpoint
    pub token_url: String,

    /// OAuth client ID sent with the refresh grant
    pub client_id: String,

    /// HTTP timeout and overall run deadline
    pub timeout: Duration,

    /// CI step output file, if running under GitHub Actions
    pub github_output: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `CLAUDE_REFRESH_TIMEOUT_SECS` is
    /// not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token_url = lookup("CLAUDE_OAUTH_TOKEN_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| ANTHROPIC_TOKEN_URL.to_string());

        let client_id = lookup("CLAUDE_OAUTH_CLIENT_ID")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| ANTHROPIC_CLIENT_ID.to_string());

        let timeout_secs = match lookup("CLAUDE_REFRESH_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e| {
                    ConfigError::InvalidValue(
                        "CLAUDE_REFRESH_TIMEOUT_SECS".to_string(),
                        format!("{}", e),
                    )
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue(
                        "CLAUDE_REFRESH_TIMEOUT_SECS".to_string(),
                        "must be greater than zero".to_string(),
                    ));
                }
                secs
            }
            None => DEFAULT_TIMEOUT_SECS,
        };

        // An empty GITHUB_OUTPUT means reporting is unavailable, same as unset.
        let github_output = lookup("GITHUB_OUTPUT")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            token_url,
            client_id,
            timeout: Duration::from_secs(timeout_secs),
            github_output,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(token_url: String, client_id: String) -> Self {
        Self {
            token_url,
            client_id,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            github_output: None,
        }
    }
}
