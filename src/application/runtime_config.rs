use std::num::NonZeroUsize;

use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::executor::FingerprintExecutor;

/// Everything a command needs once CLI flags and the settings file are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub command: Command,
    pub workers: NonZeroUsize,
    pub exclude: Vec<String>,
}

impl RuntimeConfig {
    /// CLI flags win over the settings file, which wins over the
    /// detected parallelism
    pub fn resolve(cli: Cli, settings: &Settings) -> Self {
        let workers = cli
            .workers
            .or(settings.workers())
            .unwrap_or_else(FingerprintExecutor::determine_worker_count);

        Self {
            command: cli.command,
            workers,
            exclude: settings.exclude().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_workers_override_settings() {
        let cli = Cli::try_parse_from(["snapdir", "snapshot", "-w", "2"]).unwrap();
        let settings = Settings::try_from("workers: 7\nexclude: [.git]").unwrap();

        let config = RuntimeConfig::resolve(cli, &settings);

        assert_eq!(config.workers, NonZeroUsize::new(2).unwrap());
        assert_eq!(config.exclude, vec![".git".to_string()]);
    }

    #[test]
    fn settings_workers_apply_without_flag() {
        let cli = Cli::try_parse_from(["snapdir", "snapshot"]).unwrap();
        let settings = Settings::try_from("workers: 7").unwrap();

        let config = RuntimeConfig::resolve(cli, &settings);

        assert_eq!(config.workers, NonZeroUsize::new(7).unwrap());
    }

    #[test]
    fn workers_fall_back_to_parallelism() {
        let cli = Cli::try_parse_from(["snapdir", "snapshot"]).unwrap();

        let config = RuntimeConfig::resolve(cli, &Settings::default());

        assert_eq!(config.workers, FingerprintExecutor::determine_worker_count());
        assert!(config.exclude.is_empty());
    }
}
