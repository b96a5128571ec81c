use std::borrow::Cow;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::ext::PathDisplayExt;

const SETTINGS_FILE_NAME: &str = "snapdir.yaml";

fn get_settings_file_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE_NAME)
}

/// Optional settings read from `snapdir.yaml`.
///
/// ```yaml
/// workers: 4
/// exclude:
///   - .git
///   - target
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    workers: Option<NonZeroUsize>,
    exclude: Vec<String>,
}

impl Settings {
    /// Reads the settings file in `dir`, falling back to defaults when
    /// there is none
    pub async fn read(dir: &Path) -> Result<Self, SettingsError> {
        let path = get_settings_file_path(dir);
        if !path.exists() {
            debug!(
                "No settings file at {}, using defaults",
                path.best_effort_display()
            );
            return Ok(Self::default());
        }
        Self::from_path(path).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, SettingsError> {
        debug!("Opening settings file: {}", path.best_effort_display());
        let bytes = fs::read(&path).await.context(ReadSnafu {
            file_path: path.best_effort_display(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_display(),
        })?;
        let settings = Settings::try_from(contents.as_str())?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn workers(&self) -> Option<NonZeroUsize> {
        self.workers
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    fn key(name: &'static str) -> Yaml<'static> {
        Yaml::Value(Scalar::String(Cow::Borrowed(name)))
    }

    fn parse_workers(
        top_level: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<Option<NonZeroUsize>, SettingsError> {
        match top_level.get(&Self::key("workers")) {
            None | Some(Yaml::Value(Scalar::Null)) => Ok(None),
            Some(Yaml::Value(Scalar::Integer(n))) => usize::try_from(*n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Some)
                .context(InvalidWorkersSnafu),
            Some(_) => InvalidWorkersSnafu.fail(),
        }
    }

    fn parse_exclude(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Vec<String>, SettingsError> {
        match top_level.get(&Self::key("exclude")) {
            None | Some(Yaml::Value(Scalar::Null)) => Ok(Vec::new()),
            Some(value) => value
                .as_sequence()
                .context(ExcludeNotSequenceSnafu)?
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .context(ExcludeNotSequenceSnafu)
                })
                .collect(),
        }
    }
}

impl TryFrom<&str> for Settings {
    type Error = SettingsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        // An empty file holds no document
        let document = match documents.first() {
            None | Some(Yaml::Value(Scalar::Null)) => return Ok(Self::default()),
            Some(document) => document,
        };

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        Ok(Settings {
            workers: Self::parse_workers(top_level)?,
            exclude: Self::parse_exclude(top_level)?,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to read the settings file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Settings file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the settings file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of the settings file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("'workers' should be a positive integer"))]
    InvalidWorkers,
    #[snafu(display("'exclude' should be a list of file names"))]
    ExcludeNotSequence,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[compio::test]
    async fn settings_default_when_file_is_missing() {
        let temp_dir = TempDir::new().unwrap();

        let settings = Settings::read(temp_dir.path()).await.unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[compio::test]
    async fn settings_are_read_from_the_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(SETTINGS_FILE_NAME),
            "workers: 3\nexclude:\n  - .git\n  - target\n",
        )
        .unwrap();

        let settings = Settings::read(temp_dir.path()).await.unwrap();

        assert_eq!(settings.workers(), NonZeroUsize::new(3));
        assert_eq!(settings.exclude(), [".git".to_string(), "target".to_string()]);
    }

    #[compio::test]
    async fn settings_returns_error_on_nonexistent_file() {
        let result = Settings::from_path(PathBuf::from("nonexistent.yaml")).await;

        assert!(matches!(result, Err(SettingsError::ReadError { .. })));
    }

    #[test]
    fn settings_empty_file_is_default() {
        let settings = Settings::try_from("").unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn settings_missing_keys_are_default() {
        let settings = Settings::try_from("other: value").unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn settings_returns_error_when_top_level_is_not_map() {
        let result = Settings::try_from("- item1\n- item2");

        assert!(matches!(result, Err(SettingsError::TopLevelNotMap)));
    }

    #[test]
    fn settings_returns_error_when_top_level_is_scalar() {
        let result = Settings::try_from("just a string");

        assert!(matches!(result, Err(SettingsError::TopLevelNotMap)));
    }

    #[test]
    fn settings_returns_error_on_invalid_yaml() {
        let result = Settings::try_from("workers: [unclosed");

        assert!(matches!(result, Err(SettingsError::ParseError { .. })));
    }

    #[test]
    fn settings_rejects_zero_workers() {
        let result = Settings::try_from("workers: 0");

        assert!(matches!(result, Err(SettingsError::InvalidWorkers)));
    }

    #[test]
    fn settings_rejects_negative_workers() {
        let result = Settings::try_from("workers: -2");

        assert!(matches!(result, Err(SettingsError::InvalidWorkers)));
    }

    #[test]
    fn settings_rejects_non_integer_workers() {
        let result = Settings::try_from("workers: many");

        assert!(matches!(result, Err(SettingsError::InvalidWorkers)));
    }

    #[test]
    fn settings_rejects_exclude_that_is_not_a_list() {
        let result = Settings::try_from("exclude: .git");

        assert!(matches!(result, Err(SettingsError::ExcludeNotSequence)));
    }

    #[test]
    fn settings_rejects_non_string_exclude_entries() {
        let result = Settings::try_from("exclude:\n  - .git\n  - nested:\n      key: value\n");

        assert!(matches!(result, Err(SettingsError::ExcludeNotSequence)));
    }
}
