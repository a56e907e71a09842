//! refresh-claude-token - CI entry point
//!
//! Checks a Claude Code credentials file and refreshes the OAuth token pair
//! when it is about to expire. Exit code 0 means the file holds usable
//! credentials afterwards.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use claude_oauth_refresh::{
    config::Config,
    oauth::HttpRefreshClient,
    refresh::{Outcome, RefreshFailure, Refresher},
    status::GithubOutputSink,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "refresh-claude-token",
    version,
    about = "Refresh Claude OAuth credentials before they expire"
)]
struct Cli {
    /// Path to the credentials file (e.g. ~/.claude/.credentials.json)
    credentials_path: Option<PathBuf>,

    /// Refresh even if the access token is still valid
    #[arg(long, default_value_t = false)]
    force: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Some(path) = cli.credentials_path else {
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::from(1);
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claude_oauth_refresh=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(path, cli.force) {
        Ok(outcome) => report(outcome),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(path: PathBuf, force: bool) -> anyhow::Result<Outcome> {
    let config = Config::from_env()?;
    let client = HttpRefreshClient::from_config(&config)?;

    let mut refresher = Refresher::new(client).force(force);
    if let Some(output) = &config.github_output {
        refresher = refresher.with_sink(GithubOutputSink::new(output));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let now = chrono::Utc::now().timestamp_millis();
    Ok(runtime.block_on(refresher.run_with_timeout(&path, now, config.timeout)))
}

fn report(outcome: Outcome) -> ExitCode {
    let code = exit_code(&outcome);
    match outcome {
        Outcome::Valid(record) => {
            println!(
                "Credentials valid until {}",
                format_expiry(record.expires_at)
            );
        }
        Outcome::Refreshed(record) => {
            println!(
                "Credentials refreshed, valid until {}",
                format_expiry(record.expires_at)
            );
        }
        Outcome::Failed(failure) => {
            let hint = hint(&failure);
            eprintln!("error: {}", diagnostic(failure));
            if let Some(hint) = hint {
                eprintln!("hint: {}", hint);
            }
        }
    }
    code
}

/// One line with the whole cause chain, down to the OS error.
fn diagnostic(failure: RefreshFailure) -> String {
    format!("{:#}", anyhow::Error::from(failure))
}

fn exit_code(outcome: &Outcome) -> ExitCode {
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn hint(failure: &RefreshFailure) -> Option<&'static str> {
    match failure {
        RefreshFailure::Refresh(err) if err.is_invalid_grant() => {
            Some("the refresh token was revoked or already used; log in again and update the stored credentials")
        }
        RefreshFailure::Refresh(err) if err.is_transient() => {
            Some("the token endpoint may be temporarily unavailable; re-running the job may succeed")
        }
        _ => None,
    }
}

fn format_expiry(expires_at: i64) -> String {
    chrono::DateTime::from_timestamp_millis(expires_at)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| expires_at.to_string())
}
