use std::fmt;
use std::io::{self, Cursor};
use std::path::Path;

use bincode::{Decode, Encode};
use compio::fs::File;
use compio::io::AsyncRead;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::filesystem::{EntryKind, WalkEntry};

/// Length in bytes of a content digest (SHA-256)
pub const DIGEST_LEN: usize = 32;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Fingerprint of one filesystem entry.
///
/// Failures never propagate out of fingerprinting: a file that cannot be
/// opened or read becomes `Unreadable` so it still shows up in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub enum Fingerprint {
    Digest([u8; DIGEST_LEN]),
    Unreadable,
    NotApplicable,
}

impl Fingerprint {
    /// Fingerprints a walked entry. Directories are never read.
    pub async fn of_entry(entry: &WalkEntry) -> Self {
        match entry.kind {
            EntryKind::Directory => Fingerprint::NotApplicable,
            EntryKind::File => Self::of_file(&entry.path).await,
        }
    }

    /// Streams the file at `path` through SHA-256. Symlinks are followed,
    /// and a link resolving to a directory counts as a directory.
    ///
    /// Only regular files are opened. FIFOs, sockets and device nodes are
    /// `Unreadable`: opening a FIFO blocks until a writer shows up.
    pub async fn of_file(path: &Path) -> Self {
        match path.metadata() {
            Ok(metadata) if metadata.is_dir() => return Fingerprint::NotApplicable,
            Ok(metadata) if !metadata.is_file() => {
                warn!("Not hashing {}: not a regular file", path.display());
                return Fingerprint::Unreadable;
            }
            // Missing or dangling entries fail in `digest_file` below
            _ => {}
        }

        match digest_file(path).await {
            Ok(digest) => Fingerprint::Digest(digest),
            Err(err) => {
                warn!("Failed to hash {}: {}", path.display(), err);
                Fingerprint::Unreadable
            }
        }
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        Fingerprint::Digest(Sha256::digest(bytes).into())
    }

    pub fn is_digest(&self) -> bool {
        matches!(self, Fingerprint::Digest(_))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Digest(digest) => f.write_str(&hex::encode(digest)),
            Fingerprint::Unreadable => f.write_str("<unreadable>"),
            Fingerprint::NotApplicable => f.write_str("<directory>"),
        }
    }
}

async fn digest_file(path: &Path) -> io::Result<[u8; DIGEST_LEN]> {
    let file = File::open(path).await?;
    let mut reader = Cursor::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = Vec::with_capacity(READ_BUFFER_SIZE);

    loop {
        let res = reader.read(buffer).await;
        buffer = res.1;
        let read = res.0?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        buffer.clear();
    }

    Ok(hasher.finalize().into())
}
