//! Watched-path identity type
//!
//! The monitor keys all per-path debounce state by [`WatchedPath`], a
//! validated wrapper around an absolute, normalized filesystem path.
//! Equality and hashing are defined by the path itself, so two
//! independently constructed values naming the same file coalesce into
//! one debounce entry regardless of where they came from.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// A validated absolute path identifying a watched file or directory
///
/// WatchedPath ensures the path is:
/// - Absolute (starts with /)
/// - Normalized (no . or .. components)
///
/// Uniqueness is by equality of the normalized path, never by object
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PathBuf", into = "PathBuf")]
pub struct WatchedPath(PathBuf);

impl WatchedPath {
    /// Create a new WatchedPath, validating it is absolute
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path is relative or
    /// escapes the root via `..` components.
    pub fn new(path: PathBuf) -> Result<Self, DomainError> {
        if !path.is_absolute() {
            return Err(DomainError::InvalidPath(format!(
                "Path must be absolute: {}",
                path.display()
            )));
        }

        // Normalize without touching the filesystem; the path might not
        // exist yet (e.g. a Created event for a file being written).
        let normalized = Self::normalize_path(&path)?;
        Ok(Self(normalized))
    }

    /// Get the inner path reference
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Convert to owned PathBuf
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Normalize a path by resolving . and .. components
    fn normalize_path(path: &Path) -> Result<PathBuf, DomainError> {
        use std::path::Component;

        let mut normalized = PathBuf::new();

        for component in path.components() {
            match component {
                Component::Prefix(p) => normalized.push(p.as_os_str()),
                Component::RootDir => normalized.push("/"),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(DomainError::InvalidPath(
                            "Path escapes root via ..".to_string(),
                        ));
                    }
                }
                Component::Normal(c) => normalized.push(c),
            }
        }

        Ok(normalized)
    }
}

impl Display for WatchedPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl FromStr for WatchedPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(PathBuf::from(s))
    }
}

impl TryFrom<PathBuf> for WatchedPath {
    type Error = DomainError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<WatchedPath> for PathBuf {
    fn from(path: WatchedPath) -> Self {
        path.0
    }
}

impl AsRef<Path> for WatchedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
