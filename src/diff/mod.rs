//! Manifest reconciliation: which paths were created, deleted or changed.

mod change_event;
mod diff_engine;

pub use change_event::{ChangeEvent, ChangeStatus};
pub use diff_engine::{DiffEngine, DiffError};
