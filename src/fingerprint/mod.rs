//! Per-entry content fingerprints.

mod file_fingerprint;

pub use file_fingerprint::{DIGEST_LEN, Fingerprint};
