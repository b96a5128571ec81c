//! Directory snapshots and drift detection.
//!
//! A snapshot walks a directory tree, fingerprints every file with SHA-256
//! and stores the result as a manifest. A check recomputes the tree recorded
//! in a manifest and reports which paths were created, deleted or changed.

#![allow(clippy::enum_variant_names)]

pub mod application;
pub mod cli;
pub mod config;
pub mod diff;
pub mod executor;
pub mod ext;
pub mod filesystem;
pub mod fingerprint;
pub mod manifest;
