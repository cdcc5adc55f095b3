//! Local destination directory for a mirror run
//!
//! The destination is either supplied by the caller or created as a fresh
//! temporary directory. A supplied directory must be absent or empty: the
//! mirror never merges into, prunes, or overwrites an existing tree.

use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::constants::files;
use crate::errors::{StorageError, StorageResult};

/// Root directory every asset is written below
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRoot {
    path: PathBuf,
}

impl DestinationRoot {
    /// Validate or create the destination
    ///
    /// - `None` creates a new temporary directory that outlives the run
    /// - a missing path is created together with its parents
    /// - an existing empty directory is used as is
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the path is a non-empty directory, is not a
    /// directory, or cannot be created. Nothing is written in the error case.
    pub async fn prepare(requested: Option<&Path>) -> StorageResult<Self> {
        let Some(path) = requested else {
            let temp_dir = tempfile::Builder::new()
                .prefix(files::TEMP_DIR_PREFIX)
                .tempdir()
                .map_err(StorageError::TempDirectory)?;
            let path = temp_dir.keep();
            info!("Using temporary destination directory {}", path.display());
            return Ok(Self { path });
        };

        match tokio::fs::metadata(path).await {
            Ok(metadata) if !metadata.is_dir() => Err(StorageError::NotADirectory {
                path: path.to_path_buf(),
            }),
            Ok(_) => {
                let mut entries =
                    tokio::fs::read_dir(path)
                        .await
                        .map_err(|source| StorageError::Inspect {
                            path: path.to_path_buf(),
                            source,
                        })?;
                let first = entries
                    .next_entry()
                    .await
                    .map_err(|source| StorageError::Inspect {
                        path: path.to_path_buf(),
                        source,
                    })?;
                if first.is_some() {
                    return Err(StorageError::DestinationNotEmpty {
                        path: path.to_path_buf(),
                    });
                }
                info!("Using existing empty directory {}", path.display());
                Ok(Self {
                    path: path.to_path_buf(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Destination directory does not exist, creating {}", path.display());
                tokio::fs::create_dir_all(path)
                    .await
                    .map_err(|source| StorageError::CreateDirectory {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Ok(Self {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(StorageError::Inspect {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Use an existing directory without validation
    pub fn from_existing(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Root path of the mirror
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Local path for an asset's repository path
    ///
    /// Leading slashes are ignored. Any `..`, prefix, or `.`-only path is
    /// rejected so that every asset stays below the root.
    pub fn resolve(&self, relative_path: &str) -> StorageResult<PathBuf> {
        let trimmed = relative_path.trim_start_matches('/');
        let mut resolved = self.path.clone();
        let mut pushed = false;

        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    pushed = true;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::UnsafePath {
                        path: relative_path.to_string(),
                    });
                }
            }
        }

        if !pushed {
            return Err(StorageError::UnsafePath {
                path: relative_path.to_string(),
            });
        }

        Ok(resolved)
    }

    /// Create the parent directories of an asset path
    pub async fn ensure_parent(&self, asset_path: &Path) -> StorageResult<()> {
        if let Some(parent) = asset_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }
}
