//! Key and certificate files on disk.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Directory used when no `--key-dir` is given; `~` is expanded.
pub const DEFAULT_KEY_DIR: &str = "~/.ssh/vault-signer";

const PRIVATE_KEY_FILE: &str = "id_rsa";

/// Errors raised while writing artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Key directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Permissions could not be restricted.
    #[error("failed to set permissions on {path}: {source}")]
    SetPermissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fixed file names inside the key directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    dir: PathBuf,
}

impl KeyLayout {
    /// Layout rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Layout rooted at `dir` after `~` expansion.
    #[must_use]
    pub fn expand(dir: &Path) -> Self {
        Self::new(expand_tilde(dir))
    }

    /// The key directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/id_rsa`
    #[must_use]
    pub fn private_key(&self) -> PathBuf {
        self.dir.join(PRIVATE_KEY_FILE)
    }

    /// `<dir>/id_rsa.pub`
    #[must_use]
    pub fn public_key(&self) -> PathBuf {
        self.dir.join(format!("{PRIVATE_KEY_FILE}.pub"))
    }

    /// `<dir>/id_rsa_<alias>.pub`
    #[must_use]
    pub fn signed_key(&self, alias: &str) -> PathBuf {
        self.dir.join(format!("{PRIVATE_KEY_FILE}_{alias}.pub"))
    }

    /// Create the key directory (0700 on Unix) if it is missing.
    pub fn ensure_dir(&self) -> Result<(), ArtifactError> {
        if self.dir.is_dir() {
            return Ok(());
        }

        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        debug!(dir = %self.dir.display(), "Creating key directory");
        builder
            .create(&self.dir)
            .map_err(|e| ArtifactError::CreateDirectory {
                path: self.dir.clone(),
                source: e,
            })
    }
}

/// Expand a leading `~` to the home directory.
///
/// Paths that aren't valid UTF-8 are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    path.to_str().map_or_else(
        || path.to_path_buf(),
        |text| PathBuf::from(shellexpand::tilde(text).into_owned()),
    )
}

/// Write `contents` to `path` readable and writable by the owner only.
///
/// Existing files are truncated and overwritten; their permissions are
/// reset to 0600.
pub fn write_secret(path: &Path, contents: &[u8]) -> Result<(), ArtifactError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let write_err = |e| ArtifactError::Write {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = options.open(path).map_err(write_err)?;

    // mode() only applies to newly created files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(|e| ArtifactError::SetPermissions {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    file.write_all(contents).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;

    debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(())
}
