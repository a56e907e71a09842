//! Loading and atomically persisting the credentials file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use super::CredentialsFile;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Credentials file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read credentials file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse credentials file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to serialize credentials")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to write credentials file {}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read and parse the credentials file at `path`. Never touches the disk
/// beyond the read.
pub fn load(path: &Path) -> Result<CredentialsFile, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Rewrite the whole credentials file at `path`.
///
/// The new content goes to a temp file in the same directory which is synced
/// and then renamed over `path`, so readers see either the old or the new
/// file. The temp file is removed on every early return.
pub fn persist(path: &Path, credentials: &CredentialsFile) -> Result<(), PersistError> {
    let contents = serde_json::to_string_pretty(credentials).map_err(PersistError::Serialize)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    #[cfg(unix)]
    let existing_mode = {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).ok().map(|m| m.permissions().mode())
    };

    // Created 0600 on Unix.
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_failure(path, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| write_failure(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| write_failure(path, e))?;

    #[cfg(unix)]
    if let Some(mode) = existing_mode {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(mode))
            .map_err(|e| write_failure(path, e))?;
    }

    tmp.persist(path).map_err(|e| write_failure(path, e.error))?;

    if let Err(e) = std::fs::File::open(dir).and_then(|parent_dir| parent_dir.sync_all()) {
        tracing::debug!(dir = %dir.display(), "Failed to sync credentials directory: {}", e);
    }

    tracing::debug!(path = %path.display(), "Persisted credentials file");
    Ok(())
}

fn write_failure(path: &Path, source: io::Error) -> PersistError {
    PersistError::WriteFailure {
        path: path.to_path_buf(),
        source,
    }
}
