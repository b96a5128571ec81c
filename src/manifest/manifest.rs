use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use snafu::Snafu;
use tracing::debug;

use crate::fingerprint::Fingerprint;
use crate::manifest::Record;

/// Point-in-time record of a directory tree: its root, the exclusion rules
/// it was taken with, and one record per entry, unique by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    root: PathBuf,
    exclude: Vec<String>,
    records: BTreeMap<PathBuf, Record>,
}

impl Manifest {
    /// Merges records into a manifest.
    ///
    /// Fails on the first path seen twice instead of picking one of the
    /// two records.
    pub fn assemble(
        root: impl Into<PathBuf>,
        exclude: Vec<String>,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Self, ManifestError> {
        let root = root.into();
        let mut by_path = BTreeMap::new();

        for record in records {
            match by_path.entry(record.path().to_path_buf()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(slot) => {
                    return DuplicatePathDetectedSnafu {
                        path: slot.key().clone(),
                    }
                    .fail();
                }
            }
        }

        debug!(
            "Assembled manifest of {} with {} records",
            root.display(),
            by_path.len()
        );

        Ok(Self {
            root,
            exclude,
            records: by_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Records in path order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn get(&self, path: &Path) -> Option<&Record> {
        self.records.get(path)
    }

    pub fn fingerprint_of(&self, path: &Path) -> Option<&Fingerprint> {
        self.get(path).map(Record::fingerprint)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Snafu)]
pub enum ManifestError {
    #[snafu(display("Path {} was recorded more than once", path.display()))]
    DuplicatePathDetected { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, content: &[u8]) -> Record {
        Record::new(path, Fingerprint::of_bytes(content))
    }

    #[test]
    fn assemble_indexes_records_by_path() {
        let manifest = Manifest::assemble(
            "/root",
            Vec::new(),
            vec![
                record("/root/b", b"b"),
                record("/root/a", b"a"),
                Record::new("/root/dir", Fingerprint::NotApplicable),
            ],
        )
        .unwrap();

        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.root(), Path::new("/root"));
        assert_eq!(
            manifest.fingerprint_of(Path::new("/root/a")),
            Some(&Fingerprint::of_bytes(b"a"))
        );
        assert!(manifest.get(Path::new("/root/missing")).is_none());
    }

    #[test]
    fn records_iterate_in_path_order() {
        let manifest = Manifest::assemble(
            "/root",
            Vec::new(),
            vec![record("/root/c", b"c"), record("/root/a", b"a"), record("/root/b", b"b")],
        )
        .unwrap();

        let paths: Vec<_> = manifest.records().map(Record::path).collect();
        assert_eq!(
            paths,
            vec![Path::new("/root/a"), Path::new("/root/b"), Path::new("/root/c")]
        );
    }

    #[test]
    fn assemble_rejects_duplicate_paths() {
        let result = Manifest::assemble(
            "/root",
            Vec::new(),
            vec![record("/root/a", b"first"), record("/root/a", b"second")],
        );

        match result {
            Err(ManifestError::DuplicatePathDetected { path }) => {
                assert_eq!(path, PathBuf::from("/root/a"));
            }
            other => panic!("Expected DuplicatePathDetected, got {:?}", other),
        }
    }

    #[test]
    fn assemble_rejects_identical_duplicates_too() {
        let result = Manifest::assemble(
            "/root",
            Vec::new(),
            vec![record("/root/a", b"same"), record("/root/a", b"same")],
        );

        assert!(matches!(
            result,
            Err(ManifestError::DuplicatePathDetected { .. })
        ));
    }

    #[test]
    fn manifests_compare_by_content_not_insertion_order() {
        let first = Manifest::assemble(
            "/root",
            Vec::new(),
            vec![record("/root/a", b"a"), record("/root/b", b"b")],
        )
        .unwrap();
        let second = Manifest::assemble(
            "/root",
            Vec::new(),
            vec![record("/root/b", b"b"), record("/root/a", b"a")],
        )
        .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_manifest_is_valid() {
        let manifest = Manifest::assemble("/root", Vec::new(), Vec::new()).unwrap();

        assert!(manifest.is_empty());
    }
}
