use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, warn};

use crate::ext::PathDisplayExt;

/// Kind of a walked entry, decided without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl WalkEntry {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// Result of a walk: the canonical root and everything found below it.
/// The root itself is not part of `entries`.
#[derive(Debug, Clone)]
pub struct TreeListing {
    pub root: PathBuf,
    pub entries: Vec<WalkEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct TreeWalker {
    exclude: Vec<String>,
}

impl TreeWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a walker that skips (and never descends into) entries whose
    /// file name matches one of `exclude`
    pub fn with_exclude(exclude: Vec<String>) -> Self {
        Self { exclude }
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Checks that `root` is an existing directory and returns its canonical path
    pub fn resolve_root(root: &Path) -> Result<PathBuf, TreeWalkError> {
        let metadata = match fs::metadata(root) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return PathNotFoundSnafu {
                    path: root.best_effort_display(),
                }
                .fail();
            }
            Err(err) => {
                return Err(err).context(RootAccessSnafu {
                    path: root.best_effort_display(),
                });
            }
        };

        ensure!(
            metadata.is_dir(),
            NotADirectorySnafu {
                path: root.best_effort_display(),
            }
        );

        fs::canonicalize(root).context(RootAccessSnafu {
            path: root.best_effort_display(),
        })
    }

    /// Enumerates every file and directory below `root`.
    ///
    /// Directories whose listing cannot be read are skipped with a warning and
    /// the walk continues over their siblings. Symlinked directories are
    /// reported as plain entries and not descended into.
    pub fn walk(&self, root: &Path) -> Result<TreeListing, TreeWalkError> {
        let root = Self::resolve_root(root)?;
        debug!("Walking {}", root.display());

        let mut entries = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let listing = match fs::read_dir(&dir) {
                Ok(listing) => listing,
                Err(err) => {
                    warn!("Skipping unreadable directory {}: {}", dir.display(), err);
                    continue;
                }
            };

            for item in listing {
                let item = match item {
                    Ok(item) => item,
                    Err(err) => {
                        warn!("Failed to read an entry of {}: {}", dir.display(), err);
                        continue;
                    }
                };

                if self.is_excluded(&item.file_name()) {
                    debug!("Excluding {}", item.path().display());
                    continue;
                }

                let path = item.path();
                let kind = match item.file_type() {
                    Ok(file_type) if file_type.is_dir() => EntryKind::Directory,
                    Ok(_) => EntryKind::File,
                    Err(err) => {
                        // Still recorded so the fingerprint step can flag it
                        warn!("Failed to read file type of {}: {}", path.display(), err);
                        EntryKind::File
                    }
                };

                if kind == EntryKind::Directory {
                    pending.push(path.clone());
                }
                entries.push(WalkEntry { path, kind });
            }
        }

        debug!("Found {} entries below {}", entries.len(), root.display());
        Ok(TreeListing { root, entries })
    }

    fn is_excluded(&self, name: &OsStr) -> bool {
        name.to_str()
            .is_some_and(|name| self.exclude.iter().any(|excluded| excluded == name))
    }
}

#[derive(Debug, Snafu)]
pub enum TreeWalkError {
    #[snafu(display("Path {} does not exist", path))]
    PathNotFound { path: String },
    #[snafu(display("Path {} is not a directory", path))]
    NotADirectory { path: String },
    #[snafu(display("Failed to access {}", path))]
    RootAccessError { path: String, source: io::Error },
}
