use std::path::{Path, PathBuf};

use derive_more::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum ChangeStatus {
    #[display("CREATE")]
    Create,
    #[display("DELETE")]
    Delete,
    #[display("CHANGE")]
    Change,
}

/// One classified difference between two manifests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum ChangeEvent {
    #[display("[CREATE] : {}", _0.display())]
    Created(PathBuf),
    #[display("[DELETE] : {}", _0.display())]
    Deleted(PathBuf),
    #[display("[CHANGE] : {}", _0.display())]
    Changed(PathBuf),
}

impl ChangeEvent {
    pub fn path(&self) -> &Path {
        match self {
            ChangeEvent::Created(path) | ChangeEvent::Deleted(path) | ChangeEvent::Changed(path) => {
                path
            }
        }
    }

    pub fn status(&self) -> ChangeStatus {
        match self {
            ChangeEvent::Created(_) => ChangeStatus::Create,
            ChangeEvent::Deleted(_) => ChangeStatus::Delete,
            ChangeEvent::Changed(_) => ChangeStatus::Change,
        }
    }
}
