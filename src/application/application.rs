use std::env;
use std::path::{Path, PathBuf};

use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::cli::{Cli, Command, print_change_events};
use crate::config::{Settings, SettingsError};
use crate::diff::{ChangeEvent, DiffEngine, DiffError};
use crate::executor::{ExecutorCreationError, FingerprintExecutor};
use crate::ext::SnapshotPathExt;
use crate::filesystem::{TreeWalkError, TreeWalker};
use crate::manifest::{ManifestBuildError, ManifestBuilder, ManifestStore, ManifestStoreError};

pub struct Application;

impl Application {
    pub async fn run(cli: Cli) -> Result<(), ApplicationError> {
        let current_dir = env::current_dir().context(CurrentDirSnafu)?;
        let settings = Settings::read(&current_dir).await.context(SettingsSnafu)?;
        let runtime_config = RuntimeConfig::resolve(cli, &settings);
        debug!("Resolved runtime config: {:?}", runtime_config);

        match &runtime_config.command {
            Command::Snapshot { dir, output } => {
                let destination = Self::snapshot(&runtime_config, dir, output.as_deref()).await?;
                info!("Snapshot written to {}", destination.display());
            }
            Command::Check { snapshot_file } => {
                let events = Self::check(&runtime_config, snapshot_file).await?;
                print_change_events(&events);
            }
        }

        Ok(())
    }

    /// Builds a manifest of `dir` and writes it to `output`, or next to the
    /// directory when no output is given. Returns where it was written.
    pub async fn snapshot(
        runtime_config: &RuntimeConfig,
        dir: &Path,
        output: Option<&Path>,
    ) -> Result<PathBuf, ApplicationError> {
        let root = TreeWalker::resolve_root(dir).context(SnapshotRootSnafu)?;
        let walker = TreeWalker::with_exclude(runtime_config.exclude.clone());
        let executor =
            FingerprintExecutor::new(runtime_config.workers).context(ExecutorCreationSnafu)?;

        let manifest = ManifestBuilder::new(&walker, &executor)
            .build(&root)
            .await
            .context(ManifestBuildSnafu)?;

        let destination = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.snapshot_file_path());
        if Self::lands_inside(&root, &destination) {
            warn!(
                "Snapshot file {} is inside {}; later checks will report it as created",
                destination.display(),
                root.display()
            );
        }
        ManifestStore::save_to_path(&manifest, &destination)
            .await
            .context(ManifestStoreSnafu)?;

        Ok(destination)
    }

    fn lands_inside(root: &Path, destination: &Path) -> bool {
        std::path::absolute(destination)
            .is_ok_and(|destination| destination.starts_with(root))
    }

    /// Recomputes the tree recorded in `snapshot_file` and diffs it against
    /// the stored manifest. The exclusions stored in the manifest are reused.
    pub async fn check(
        runtime_config: &RuntimeConfig,
        snapshot_file: &Path,
    ) -> Result<Vec<ChangeEvent>, ApplicationError> {
        let stored = ManifestStore::load_from_path(snapshot_file)
            .await
            .context(ManifestStoreSnafu)?;

        let walker = TreeWalker::with_exclude(stored.exclude().to_vec());
        let executor =
            FingerprintExecutor::new(runtime_config.workers).context(ExecutorCreationSnafu)?;
        let fresh = ManifestBuilder::new(&walker, &executor)
            .build(stored.root())
            .await
            .context(ManifestBuildSnafu)?;

        let events = DiffEngine::diff(&stored, &fresh).context(DiffSnafu)?;
        info!(
            "Checked {} entries of {}: {} changes",
            fresh.len(),
            stored.root().display(),
            events.len()
        );
        Ok(events)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Failed to obtain current dir"))]
    CurrentDirError { source: std::io::Error },
    #[snafu(display("Critical failure encountered while reading settings"))]
    SettingsError { source: SettingsError },
    #[snafu(display("Critical failure encountered while resolving the snapshot directory"))]
    SnapshotRootError { source: TreeWalkError },
    #[snafu(display("Critical failure encountered during executor creation"))]
    ExecutorCreationError { source: ExecutorCreationError },
    #[snafu(display("Critical failure encountered while building the manifest"))]
    ManifestBuildError { source: ManifestBuildError },
    #[snafu(display("Critical failure encountered while storing or loading the manifest"))]
    ManifestStoreError { source: ManifestStoreError },
    #[snafu(display("Critical failure encountered while comparing manifests"))]
    DiffError { source: DiffError },
}
