use std::ffi::OsString;
use std::path::{self, Path, PathBuf};

const SNAPSHOT_FILE_SUFFIX: &str = "snapshot.bin";

/// Display helper for paths supplied by the user, which may be relative
/// or may not exist at all.
pub trait PathDisplayExt {
    fn best_effort_display(&self) -> String;
}

impl PathDisplayExt for Path {
    fn best_effort_display(&self) -> String {
        match path::absolute(self) {
            Ok(absolute) => absolute.display().to_string(),
            Err(_) => self.display().to_string(),
        }
    }
}

pub trait SnapshotPathExt {
    /// Default destination of a snapshot of this directory: the directory
    /// path with `snapshot.bin` appended to its last component, so
    /// `/home/me/project` becomes `/home/me/projectsnapshot.bin`.
    fn snapshot_file_path(&self) -> PathBuf;
}

impl SnapshotPathExt for Path {
    fn snapshot_file_path(&self) -> PathBuf {
        let mut name = OsString::from(self.as_os_str());
        name.push(SNAPSHOT_FILE_SUFFIX);
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("/home/me/project", "/home/me/projectsnapshot.bin")]
    #[case("/", "/snapshot.bin")]
    #[case("/tmp/dir/", "/tmp/dir/snapshot.bin")]
    fn snapshot_file_path_concatenates(#[case] dir: &str, #[case] expected: &str) {
        assert_eq!(Path::new(dir).snapshot_file_path(), PathBuf::from(expected));
    }

    #[test]
    fn best_effort_display_makes_relative_paths_absolute() {
        let displayed = Path::new("some/relative/dir").best_effort_display();

        assert!(Path::new(&displayed).is_absolute());
        assert!(displayed.ends_with("some/relative/dir"));
    }

    #[test]
    fn best_effort_display_keeps_absolute_paths() {
        assert_eq!(
            Path::new("/does/not/exist").best_effort_display(),
            "/does/not/exist"
        );
    }
}
