use std::collections::HashSet;
use std::path::{Path, PathBuf};

use snafu::Snafu;
use tracing::{debug, error};

use crate::diff::ChangeEvent;
use crate::fingerprint::Fingerprint;
use crate::manifest::{Manifest, Record};

/// Reconciles a stored manifest against a freshly computed one.
pub struct DiffEngine;

impl DiffEngine {
    /// Classifies every path whose record differs between `old` and `fresh`.
    ///
    /// Events are sorted by path, then status. Each path is reported at most
    /// once even when both of its records surface as candidates.
    pub fn diff(old: &Manifest, fresh: &Manifest) -> Result<Vec<ChangeEvent>, DiffError> {
        let mut reported: HashSet<&Path> = HashSet::new();
        let mut events = Vec::new();

        for path in Self::unmatched_paths(old, fresh) {
            if !reported.insert(path) {
                continue;
            }
            if let Some(event) =
                Self::classify(path, old.fingerprint_of(path), fresh.fingerprint_of(path))?
            {
                events.push(event);
            }
        }

        events.sort_by(|a, b| {
            a.path()
                .cmp(b.path())
                .then_with(|| a.status().cmp(&b.status()))
        });
        debug!("Diff produced {} change events", events.len());
        Ok(events)
    }

    /// Paths of records present in one manifest but not in the other. A path
    /// whose fingerprint changed appears twice, once from each side.
    fn unmatched_paths<'a>(
        old: &'a Manifest,
        fresh: &'a Manifest,
    ) -> impl Iterator<Item = &'a Path> + 'a {
        let not_in_fresh = old
            .records()
            .filter(move |record| fresh.get(record.path()) != Some(*record));
        let not_in_old = fresh
            .records()
            .filter(move |record| old.get(record.path()) != Some(*record));
        not_in_fresh.chain(not_in_old).map(Record::path)
    }

    /// Classifies one path from its fingerprint on each side.
    ///
    /// Only called for paths that differ; a path absent from both sides or
    /// identical on both sides means the candidate selection is broken.
    pub fn classify(
        path: &Path,
        old: Option<&Fingerprint>,
        fresh: Option<&Fingerprint>,
    ) -> Result<Option<ChangeEvent>, DiffError> {
        match (old, fresh) {
            (None, Some(_)) => Ok(Some(ChangeEvent::Created(path.to_path_buf()))),
            (Some(_), None) => Ok(Some(ChangeEvent::Deleted(path.to_path_buf()))),
            (Some(old), Some(fresh)) if old != fresh => {
                Ok(Some(ChangeEvent::Changed(path.to_path_buf())))
            }
            (Some(_), Some(_)) => {
                error!("Identical records flagged as changed: {}", path.display());
                InternalConsistencyFaultSnafu {
                    path: path.to_path_buf(),
                    detail: "record is identical in both manifests",
                }
                .fail()
            }
            (None, None) => {
                error!("Candidate path missing from both manifests: {}", path.display());
                InternalConsistencyFaultSnafu {
                    path: path.to_path_buf(),
                    detail: "path is absent from both manifests",
                }
                .fail()
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum DiffError {
    #[snafu(display("Internal consistency fault at {}: {}", path.display(), detail))]
    InternalConsistencyFault { path: PathBuf, detail: String },
}
