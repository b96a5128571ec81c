//! Filesystem enumeration.
//!
//! The walker lists every file and directory below a root using an explicit
//! work-list of pending directories, so deep trees never grow the call stack.

mod tree_walker;

pub use tree_walker::{EntryKind, TreeListing, TreeWalkError, TreeWalker, WalkEntry};
