//! CI status reporting.
//!
//! GitHub Actions exposes step outputs through the file named by
//! `GITHUB_OUTPUT`; each line is a `key=value` pair.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Output key written after a successful refresh.
pub const TOKEN_REFRESHED_KEY: &str = "token_refreshed";

/// Append-only sink for machine-readable status markers.
pub trait StatusSink: Send + Sync {
    fn report(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Appends `key=value` lines to a `GITHUB_OUTPUT`-style file.
#[derive(Debug, Clone)]
pub struct GithubOutputSink {
    path: PathBuf,
}

impl GithubOutputSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatusSink for GithubOutputSink {
    fn report(&self, key: &str, value: &str) -> io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}={}", key, value)
    }
}
