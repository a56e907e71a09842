//! # Claude OAuth Refresh
//!
//! Keeps a Claude Code OAuth credentials file usable for unattended CI runs.
//!
//! ## Flow
//! 1. Load `.credentials.json` and read the `claudeAiOauth` record
//! 2. Treat the access token as expired one hour before `expiresAt`
//! 3. Exchange the refresh token at the Anthropic token endpoint
//! 4. Atomically rewrite the file with the new token pair
//! 5. Report `token_refreshed=true` to `GITHUB_OUTPUT` when set
//!
//! ## Modules
//! - `credentials`: record types, file store, expiry policy
//! - `oauth`: refresh-token exchange client
//! - `refresh`: the end-to-end run and its `Outcome`
//! - `status`: CI step output sink
//! - `config`: environment configuration

pub mod config;
pub mod credentials;
pub mod oauth;
pub mod refresh;
pub mod status;
pub mod util;

pub use config::Config;
pub use credentials::{CredentialRecord, CredentialsFile, NewTokenPair};
pub use oauth::{HttpRefreshClient, RefreshClient, RefreshError};
pub use refresh::{Outcome, RefreshFailure, Refresher};
pub use status::{GithubOutputSink, StatusSink};
