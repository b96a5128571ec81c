use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Snapshot a directory tree and detect changes against it")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// Number of fingerprinting threads (defaults to the settings file, then
    /// the available parallelism)
    #[clap(long, short, global = true)]
    pub workers: Option<NonZeroUsize>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Take a snapshot of a directory
    Snapshot {
        /// Directory to take a snapshot of
        #[arg(default_value = ".", value_name = "PATH_OF_DIR")]
        dir: PathBuf,

        /// Where to write the snapshot (defaults to the directory path
        /// followed by `snapshot.bin`)
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Check which files changed since a snapshot
    Check {
        /// Snapshot file to check against
        #[arg(value_name = "FILE")]
        snapshot_file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn snapshot_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["snapdir", "snapshot"]).unwrap();

        assert_eq!(
            cli.command,
            Command::Snapshot {
                dir: PathBuf::from("."),
                output: None,
            }
        );
        assert!(cli.workers.is_none());
    }

    #[test]
    fn snapshot_accepts_dir_and_output() {
        let cli =
            Cli::try_parse_from(["snapdir", "snapshot", "/srv/data", "-o", "/tmp/data.bin"]).unwrap();

        assert_eq!(
            cli.command,
            Command::Snapshot {
                dir: PathBuf::from("/srv/data"),
                output: Some(PathBuf::from("/tmp/data.bin")),
            }
        );
    }

    #[test]
    fn check_requires_a_snapshot_file() {
        assert!(Cli::try_parse_from(["snapdir", "check"]).is_err());

        let cli = Cli::try_parse_from(["snapdir", "check", "datasnapshot.bin"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Check {
                snapshot_file: PathBuf::from("datasnapshot.bin"),
            }
        );
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli =
            Cli::try_parse_from(["snapdir", "check", "x.bin", "--workers", "3", "-l", "debug"])
                .unwrap();

        assert_eq!(cli.workers, NonZeroUsize::new(3));
        assert!(matches!(cli.log_level, LogLevel::Debug));
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(Cli::try_parse_from(["snapdir", "snapshot", "-w", "0"]).is_err());
    }

    #[test]
    fn a_subcommand_is_required() {
        assert!(Cli::try_parse_from(["snapdir"]).is_err());
    }
}
