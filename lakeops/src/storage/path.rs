//! Table path resolution
//! Turns a user-supplied path string into an absolute, normalized table reference

use crate::{Error, Result};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Directory Delta Lake keeps its commit files in
pub const DELTA_LOG_DIR: &str = "_delta_log";

/// Absolute location of a Delta table's root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    path: PathBuf,
}

impl TableRef {
    /// Resolve a path to its absolute form.
    ///
    /// `.` and `..` are folded lexically so the table does not need to exist yet;
    /// when it does exist, symlinks are resolved as well.
    ///
    /// Folding happens before symlink resolution, so `link/..` is the directory
    /// holding `link`, not the parent of its target.
    ///
    /// Only a missing path (or a path running through a regular file) falls
    /// back to the lexical form; any other canonicalize failure is an
    /// [`Error::Io`].
    pub fn resolve<P: AsRef<Path>>(path: P) -> Result<Self> {
        let absolute = std::path::absolute(path.as_ref())?;
        let normalized = normalize(&absolute);
        let path = match normalized.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                normalized
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Plain filesystem existence check, no store involved
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Fail with [`Error::TableNotFound`] unless something exists at the path
    pub fn require_existing(&self) -> Result<()> {
        if self.exists() {
            Ok(())
        } else {
            Err(Error::TableNotFound(self.path.clone()))
        }
    }

    /// Create the parent chain and the table directory itself
    pub fn ensure_dirs(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&self.path)?;
        Ok(())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.path.join(DELTA_LOG_DIR)
    }

    /// `file://` directory URL handed to the store
    pub fn url(&self) -> Result<Url> {
        Url::from_directory_path(&self.path).map_err(|_| {
            Error::InvalidOperation(format!(
                "Invalid path for Delta table: {}",
                self.path.display()
            ))
        })
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Lexically drop `.` components and apply `..` against the preceding component
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
