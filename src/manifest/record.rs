use std::path::{Path, PathBuf};

use crate::filesystem::WalkEntry;
use crate::fingerprint::Fingerprint;

/// One entry of a manifest. Two records are equal iff path and fingerprint are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    path: PathBuf,
    fingerprint: Fingerprint,
}

impl Record {
    pub fn new(path: impl Into<PathBuf>, fingerprint: Fingerprint) -> Self {
        Self {
            path: path.into(),
            fingerprint,
        }
    }

    /// Fingerprints a walked entry and wraps the result
    pub async fn capture(entry: WalkEntry) -> Self {
        let fingerprint = Fingerprint::of_entry(&entry).await;
        Self::new(entry.path, fingerprint)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}
