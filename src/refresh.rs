//! End-to-end credential check: load, decide, refresh, persist, report.
//!
//! ```text
//! START → LOADED → VALID
//!                → EXPIRED → EXCHANGED → PERSISTED
//! any step ──────────────────────────────→ FAILED
//! ```
//! Each step runs at most once per call; nothing is retried here.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::credentials::{self, is_expired, CredentialRecord, LoadError, PersistError};
use crate::oauth::{RefreshClient, RefreshError};
use crate::status::{StatusSink, TOKEN_REFRESHED_KEY};

/// Why a run ended in [`Outcome::Failed`].
#[derive(Debug, Error)]
pub enum RefreshFailure {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("Credential refresh timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),
}

/// Terminal state of one run.
#[derive(Debug)]
pub enum Outcome {
    /// Token still usable; no network call, no write.
    Valid(CredentialRecord),
    /// Token was refreshed and the new pair is on disk.
    Refreshed(CredentialRecord),
    Failed(RefreshFailure),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }

    pub fn record(&self) -> Option<&CredentialRecord> {
        match self {
            Outcome::Valid(record) | Outcome::Refreshed(record) => Some(record),
            Outcome::Failed(_) => None,
        }
    }
}

/// Composes the credential store, expiry policy and a [`RefreshClient`].
pub struct Refresher<C> {
    client: C,
    sink: Option<Box<dyn StatusSink>>,
    force: bool,
}

impl<C: RefreshClient> Refresher<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            sink: None,
            force: false,
        }
    }

    /// Report successful refreshes to `sink`.
    pub fn with_sink(mut self, sink: impl StatusSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Refresh even when the token is not yet inside the expiry buffer.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Run one check against the credentials file at `path`.
    ///
    /// `now` is milliseconds since the Unix epoch.
    pub async fn run(&self, path: &Path, now: i64) -> Outcome {
        match self.try_run(path, now).await {
            Ok(outcome) => outcome,
            Err(failure) => {
                tracing::error!(
                    path = %path.display(),
                    error = ?failure,
                    "Credential refresh failed: {}",
                    failure
                );
                Outcome::Failed(failure)
            }
        }
    }

    /// [`Refresher::run`] bounded by `timeout`.
    ///
    /// The deadline can only fire while the exchange is in flight; the file is
    /// written after the exchange completes, so a timeout never leaves a
    /// partial update behind.
    pub async fn run_with_timeout(&self, path: &Path, now: i64, timeout: Duration) -> Outcome {
        match tokio::time::timeout(timeout, self.run(path, now)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(
                    path = %path.display(),
                    timeout_secs = timeout.as_secs_f64(),
                    "Credential refresh timed out"
                );
                Outcome::Failed(RefreshFailure::TimedOut(timeout))
            }
        }
    }

    async fn try_run(&self, path: &Path, now: i64) -> Result<Outcome, RefreshFailure> {
        let mut creds = credentials::load(path)?;
        tracing::info!(
            path = %path.display(),
            expires_at = creds.oauth.expires_at,
            "Loaded credentials"
        );

        if !self.force && !is_expired(creds.oauth.expires_at, now) {
            tracing::info!(
                minutes_left = creds.oauth.expires_at.saturating_sub(now) / 60_000,
                "Access token is still valid, no refresh needed"
            );
            return Ok(Outcome::Valid(creds.oauth));
        }

        if self.force {
            tracing::info!("Forced refresh requested");
        } else {
            tracing::info!(
                expires_at = creds.oauth.expires_at,
                "Access token expired or expiring within the hour, refreshing"
            );
        }

        let pair = self.client.exchange(&creds.oauth.refresh_token).await?;
        tracing::info!(
            expires_at = pair.expires_at,
            scopes = ?pair.scopes,
            "Exchanged refresh token for a new token pair"
        );

        creds.oauth.apply(pair);
        credentials::persist(path, &creds)?;
        tracing::info!(path = %path.display(), "Saved refreshed credentials");

        self.report_refreshed();
        Ok(Outcome::Refreshed(creds.oauth))
    }

    fn report_refreshed(&self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if let Err(e) = sink.report(TOKEN_REFRESHED_KEY, "true") {
            tracing::warn!("Failed to write CI status output: {}", e);
        }
    }
}
