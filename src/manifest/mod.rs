//! Manifests: the persisted description of a directory tree, how they are
//! built from a live tree, and how they are stored.

mod manifest;
mod manifest_builder;
mod manifest_store;
mod record;

pub use manifest::{Manifest, ManifestError};
pub use manifest_builder::{ManifestBuildError, ManifestBuilder};
pub use manifest_store::{MANIFEST_FORMAT_VERSION, ManifestStore, ManifestStoreError};
pub use record::Record;
