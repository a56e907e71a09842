//! Refresh exchange errors.
//!
//! None of these are retried here; [`RefreshError::is_transient`] only tells
//! a workflow-level caller whether a later attempt could succeed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefreshError {
    /// Token endpoint answered with a non-2xx status. `body` is verbatim.
    #[error("Token refresh failed (HTTP {status}): {body}")]
    HttpStatus { status: u16, body: String },

    /// DNS, connect, reset or timeout before a response arrived. The cause is
    /// carried in the source chain.
    #[error("Token refresh transport error")]
    Transport(#[source] reqwest::Error),

    /// 2xx answer that does not carry a usable token pair.
    #[error("Malformed token refresh response: {0}")]
    MalformedResponse(String),
}

impl RefreshError {
    /// HTTP status of the failed exchange, if the server answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RefreshError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server rejected the refresh token itself (revoked, already used or
    /// expired). Only a new login fixes this.
    pub fn is_invalid_grant(&self) -> bool {
        match self {
            RefreshError::HttpStatus { status, body } => {
                matches!(status, 400 | 401) && body.to_lowercase().contains("invalid_grant")
            }
            _ => false,
        }
    }

    /// Whether re-running the exchange later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RefreshError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            RefreshError::Transport(_) => true,
            RefreshError::MalformedResponse(_) => false,
        }
    }
}
