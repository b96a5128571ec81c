use std::path::Path;

use snafu::{ResultExt, Snafu};
use tracing::info;

use crate::executor::{ExecutionError, FingerprintExecutor};
use crate::filesystem::{TreeWalkError, TreeWalker};
use crate::manifest::{Manifest, ManifestError};

/// Computes a fresh manifest of a live directory tree: sequential walk,
/// parallel fingerprinting, then a single merge on the calling thread.
pub struct ManifestBuilder<'a> {
    walker: &'a TreeWalker,
    executor: &'a FingerprintExecutor,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(walker: &'a TreeWalker, executor: &'a FingerprintExecutor) -> Self {
        Self { walker, executor }
    }

    pub async fn build(&self, root: &Path) -> Result<Manifest, ManifestBuildError> {
        let listing = self.walker.walk(root).context(WalkSnafu)?;
        info!(
            "Fingerprinting {} entries below {}",
            listing.entries.len(),
            listing.root.display()
        );

        let parts = self
            .executor
            .fingerprint(listing.entries)
            .await
            .context(FingerprintSnafu)?;

        Manifest::assemble(
            listing.root,
            self.walker.exclude().to_vec(),
            parts.into_iter().flatten(),
        )
        .context(AssemblySnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum ManifestBuildError {
    #[snafu(display("Failed to walk the directory tree"))]
    WalkError { source: TreeWalkError },
    #[snafu(display("Failed to fingerprint the directory tree"))]
    FingerprintError { source: ExecutionError },
    #[snafu(display("Failed to assemble the manifest"))]
    AssemblyError { source: ManifestError },
}
