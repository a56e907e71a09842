//! Claude OAuth credential record and its on-disk envelope.
//!
//! The Claude CLI stores OAuth credentials in `.credentials.json` with format:
//! ```json
//! {
//!   "claudeAiOauth": {
//!     "accessToken": "sk-ant-oat01-...",
//!     "refreshToken": "sk-ant-ort01-...",
//!     "expiresAt": 1769395897294,
//!     "scopes": ["user:inference", "user:profile"],
//!     "isMax": true
//!   }
//! }
//! ```
//! Keys this crate does not know about, at either level, are kept as-is.

pub mod expiry;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::util::redact_token;

pub use expiry::{is_expired, EXPIRY_BUFFER_MS};
pub use store::{load, persist, LoadError, PersistError};

/// Key under which the record lives in the credentials file.
pub const CREDENTIALS_KEY: &str = "claudeAiOauth";

/// Scopes assumed when the token endpoint omits `scope`.
pub const DEFAULT_SCOPES: [&str; 2] = ["user:inference", "user:profile"];

/// Whole credentials file: the OAuth record plus any sibling entries.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsFile {
    #[serde(rename = "claudeAiOauth")]
    pub oauth: CredentialRecord,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// OAuth access/refresh pair with expiry and granted scopes.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub access_token: String,
    pub refresh_token: String,
    /// Milliseconds since the Unix epoch
    pub expires_at: i64,
    /// Absent in files written before scopes were recorded; kept absent on rewrite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_max: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CredentialRecord {
    /// Replace every OAuth field with the freshly issued pair.
    ///
    /// The old refresh token is dead server-side once a new one is issued,
    /// so the two tokens only ever change together.
    pub fn apply(&mut self, pair: NewTokenPair) {
        let NewTokenPair {
            access_token,
            refresh_token,
            expires_at,
            scopes,
            is_max,
        } = pair;
        self.access_token = access_token;
        self.refresh_token = refresh_token;
        self.expires_at = expires_at;
        self.scopes = Some(scopes);
        self.is_max = Some(is_max);
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("access_token", &redact_token(&self.access_token))
            .field("refresh_token", &redact_token(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .field("is_max", &self.is_max)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for CredentialsFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsFile")
            .field("oauth", &self.oauth)
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Token fields returned by a successful refresh exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct NewTokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Milliseconds since the Unix epoch
    pub expires_at: i64,
    pub scopes: Vec<String>,
    pub is_max: bool,
}

impl std::fmt::Debug for NewTokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewTokenPair")
            .field("access_token", &redact_token(&self.access_token))
            .field("refresh_token", &redact_token(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .field("is_max", &self.is_max)
            .finish()
    }
}
