//! Refresh-token exchange against the Anthropic OAuth token endpoint.

pub mod error;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::credentials::{NewTokenPair, DEFAULT_SCOPES};

pub use error::RefreshError;

/// Anthropic OAuth token endpoint
pub const ANTHROPIC_TOKEN_URL: &str = "https://console.anthropic.com/v1/oauth/token";

/// Anthropic OAuth client ID (Claude Code)
pub const ANTHROPIC_CLIENT_ID: &str = "9d1c250a-e61b-44d9-88ed-5944d1962f5e";

/// Exchanges a refresh token for a new token pair.
///
/// Implementations perform a single attempt; retry policy belongs to the
/// caller.
#[async_trait]
pub trait RefreshClient: Send + Sync {
    async fn exchange(&self, refresh_token: &str) -> Result<NewTokenPair, RefreshError>;
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
    client_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
}

/// [`RefreshClient`] that talks HTTP via reqwest.
#[derive(Debug, Clone)]
pub struct HttpRefreshClient {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
}

impl HttpRefreshClient {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RefreshError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RefreshError::Transport)?;
        Ok(Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RefreshError> {
        Self::new(&config.token_url, &config.client_id, config.timeout)
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl RefreshClient for HttpRefreshClient {
    async fn exchange(&self, refresh_token: &str) -> Result<NewTokenPair, RefreshError> {
        tracing::debug!(token_url = %self.token_url, "Exchanging refresh token");

        let response = self
            .http
            .post(&self.token_url)
            .json(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token,
                client_id: &self.client_id,
            })
            .send()
            .await
            .map_err(RefreshError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(RefreshError::Transport)?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                "Token refresh rejected by {}: {}",
                self.token_url,
                body
            );
            return Err(RefreshError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| RefreshError::MalformedResponse(e.to_string()))?;

        token_pair_from_response(token, chrono::Utc::now().timestamp())
    }
}

/// Build the new pair from a token response received at `now_secs`.
fn token_pair_from_response(
    token: TokenResponse,
    now_secs: i64,
) -> Result<NewTokenPair, RefreshError> {
    if token.access_token.is_empty() {
        return Err(RefreshError::MalformedResponse(
            "empty access_token".to_string(),
        ));
    }
    if token.refresh_token.is_empty() {
        return Err(RefreshError::MalformedResponse(
            "empty refresh_token".to_string(),
        ));
    }

    let scopes = match token.scope.as_deref().map(str::trim) {
        Some(scope) if !scope.is_empty() => {
            scope.split_whitespace().map(str::to_string).collect()
        }
        _ => DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
    };

    Ok(NewTokenPair {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: now_secs.saturating_add(token.expires_in).saturating_mul(1000),
        scopes,
        // Deployed for Max accounts only.
        is_max: true,
    })
}

#[cfg(test)]
mod tests {
    use super::testing::{closed_port_url, TokenServer};
    use super::*;

    fn response(scope: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: "A2".to_string(),
            refresh_token: "R2".to_string(),
            expires_in: 3600,
            scope: scope.map(str::to_string),
        }
    }

    fn client(url: &str) -> HttpRefreshClient {
        HttpRefreshClient::new(url, ANTHROPIC_CLIENT_ID, Duration::from_secs(5)).expect("client")
    }

    #[test]
    fn missing_scope_uses_defaults() {
        let pair = token_pair_from_response(response(None), 1_000).expect("pair");
        assert_eq!(pair.scopes, vec!["user:inference", "user:profile"]);
        assert_eq!(pair.expires_at, (1_000 + 3600) * 1000);
        assert!(pair.is_max);
    }

    #[test]
    fn scope_string_is_split_in_order() {
        let pair = token_pair_from_response(
            response(Some("user:profile user:inference  org:create_api_key")),
            0,
        )
        .expect("pair");
        assert_eq!(
            pair.scopes,
            vec!["user:profile", "user:inference", "org:create_api_key"]
        );
    }

    #[test]
    fn blank_scope_uses_defaults() {
        let pair = token_pair_from_response(response(Some("  ")), 0).expect("pair");
        assert_eq!(pair.scopes, vec!["user:inference", "user:profile"]);
    }

    #[test]
    fn empty_tokens_are_rejected() {
        let mut token = response(None);
        token.refresh_token.clear();
        assert!(matches!(
            token_pair_from_response(token, 0),
            Err(RefreshError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn exchange_posts_json_and_parses_tokens() {
        let server = TokenServer::spawn(
            200,
            r#"{"access_token":"A2","refresh_token":"R2","expires_in":3600}"#,
        )
        .await;

        let before = chrono::Utc::now().timestamp();
        let pair = client(&server.url)
            .exchange("R1")
            .await
            .expect("exchange");
        let after = chrono::Utc::now().timestamp();

        assert_eq!(pair.access_token, "A2");
        assert_eq!(pair.refresh_token, "R2");
        assert!(pair.expires_at >= (before + 3600) * 1000);
        assert!(pair.expires_at <= (after + 3600) * 1000);
        assert_eq!(pair.scopes, vec!["user:inference", "user:profile"]);
        assert!(pair.is_max);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0],
            serde_json::json!({
                "grant_type": "refresh_token",
                "refresh_token": "R1",
                "client_id": ANTHROPIC_CLIENT_ID,
            })
        );
    }

    #[tokio::test]
    async fn non_success_status_keeps_body_verbatim() {
        let body = r#"{"error": "invalid_grant", "error_description": "Refresh token revoked"}"#;
        let server = TokenServer::spawn(401, body).await;

        let err = client(&server.url).exchange("R1").await.unwrap_err();
        match &err {
            RefreshError::HttpStatus { status, body: got } => {
                assert_eq!(*status, 401);
                assert_eq!(got, body);
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
        assert!(err.is_invalid_grant());
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn success_without_tokens_is_malformed() {
        let server = TokenServer::spawn(200, r#"{"error":"nope"}"#).await;
        let err = client(&server.url).exchange("R1").await.unwrap_err();
        assert!(matches!(err, RefreshError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let err = client(&closed_port_url()).exchange("R1").await.unwrap_err();
        assert!(matches!(err, RefreshError::Transport(_)));
        assert!(err.is_transient());
    }
}
