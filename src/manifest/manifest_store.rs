use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use bincode::{Decode, Encode};
use compio::fs;
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::{debug, info};

use crate::fingerprint::Fingerprint;
use crate::manifest::{Manifest, ManifestError, Record};

const MANIFEST_MAGIC: [u8; 4] = *b"SNPD";

/// Current on-disk layout version
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

fn bincode_config() -> bincode::config::Configuration {
    bincode::config::standard()
}

/// Decoded on its own first so the version is known before the body is read
#[derive(Debug, Encode, Decode)]
struct StoredHeader {
    magic: [u8; 4],
    version: u32,
}

#[derive(Debug, Encode, Decode)]
struct StoredManifest {
    root: String,
    exclude: Vec<String>,
    records: Vec<StoredRecord>,
}

#[derive(Debug, Encode, Decode)]
struct StoredRecord {
    path: String,
    fingerprint: Fingerprint,
}

/// Reads and writes manifests as a versioned bincode container:
/// header `{magic, version}` followed by `{root, exclude, records}`,
/// records in path order so equal manifests produce identical bytes.
pub struct ManifestStore;

impl ManifestStore {
    pub fn save(manifest: &Manifest, sink: &mut impl Write) -> Result<(), ManifestStoreError> {
        let bytes = Self::encode(manifest)?;
        sink.write_all(&bytes).context(IoSnafu)?;
        sink.flush().context(IoSnafu)
    }

    pub fn load(source: &mut impl Read) -> Result<Manifest, ManifestStoreError> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes).context(IoSnafu)?;
        Self::decode(&bytes)
    }

    pub fn encode(manifest: &Manifest) -> Result<Vec<u8>, ManifestStoreError> {
        let header = StoredHeader {
            magic: MANIFEST_MAGIC,
            version: MANIFEST_FORMAT_VERSION,
        };
        let body = StoredManifest {
            root: path_to_string(manifest.root())?,
            exclude: manifest.exclude().to_vec(),
            records: manifest
                .records()
                .map(|record| {
                    Ok(StoredRecord {
                        path: path_to_string(record.path())?,
                        fingerprint: *record.fingerprint(),
                    })
                })
                .collect::<Result<Vec<_>, ManifestStoreError>>()?,
        };

        let mut bytes = bincode::encode_to_vec(&header, bincode_config()).context(EncodeSnafu)?;
        bytes.extend(bincode::encode_to_vec(&body, bincode_config()).context(EncodeSnafu)?);
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Manifest, ManifestStoreError> {
        let (header, header_len): (StoredHeader, usize) =
            bincode::decode_from_slice(bytes, bincode_config()).context(CorruptManifestSnafu)?;
        ensure!(
            header.magic == MANIFEST_MAGIC,
            BadMagicSnafu {
                found: header.magic
            }
        );
        ensure!(
            header.version == MANIFEST_FORMAT_VERSION,
            UnsupportedVersionSnafu {
                found: header.version
            }
        );

        let rest = &bytes[header_len..];
        let (body, body_len): (StoredManifest, usize) =
            bincode::decode_from_slice(rest, bincode_config()).context(CorruptManifestSnafu)?;
        ensure!(
            body_len == rest.len(),
            TrailingBytesSnafu {
                count: rest.len() - body_len
            }
        );

        let records = body
            .records
            .into_iter()
            .map(|stored| Record::new(stored.path, stored.fingerprint));
        Manifest::assemble(body.root, body.exclude, records).context(InvalidContentSnafu)
    }

    pub async fn save_to_path(manifest: &Manifest, path: &Path) -> Result<(), ManifestStoreError> {
        let bytes = Self::encode(manifest)?;
        let size = bytes.len();
        fs::write(path, bytes).await.0.context(WriteSnafu {
            path: path.to_path_buf(),
        })?;
        info!(
            "Wrote manifest of {} records ({} bytes) to {}",
            manifest.len(),
            size,
            path.display()
        );
        Ok(())
    }

    pub async fn load_from_path(path: &Path) -> Result<Manifest, ManifestStoreError> {
        debug!("Reading manifest from {}", path.display());
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return ManifestNotFoundSnafu {
                    path: path.to_path_buf(),
                }
                .fail();
            }
            Err(err) => {
                return Err(err).context(ReadSnafu {
                    path: path.to_path_buf(),
                });
            }
        };
        let manifest = Self::decode(&bytes)?;
        debug!(
            "Loaded manifest of {} with {} records",
            manifest.root().display(),
            manifest.len()
        );
        Ok(manifest)
    }
}

fn path_to_string(path: &Path) -> Result<String, ManifestStoreError> {
    path.to_str().map(str::to_string).context(NonUtf8PathSnafu {
        path: path.to_path_buf(),
    })
}

#[derive(Debug, Snafu)]
pub enum ManifestStoreError {
    #[snafu(display("Path {} is not valid UTF-8 and cannot be stored", path.display()))]
    NonUtf8Path { path: PathBuf },
    #[snafu(display("Failed to encode manifest"))]
    EncodeError { source: bincode::error::EncodeError },
    #[snafu(display("I/O failure on manifest stream"))]
    IoError { source: io::Error },
    #[snafu(display("Snapshot file {} does not exist", path.display()))]
    ManifestNotFound { path: PathBuf },
    #[snafu(display("Failed to read snapshot file {}", path.display()))]
    ReadError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to write snapshot file {}", path.display()))]
    WriteError { path: PathBuf, source: io::Error },
    #[snafu(display("Corrupt manifest"))]
    CorruptManifest { source: bincode::error::DecodeError },
    #[snafu(display("Not a snapshot file (magic bytes {:?})", found))]
    BadMagic { found: [u8; 4] },
    #[snafu(display(
        "Unsupported manifest version {} (expected {})",
        found,
        MANIFEST_FORMAT_VERSION
    ))]
    UnsupportedVersion { found: u32 },
    #[snafu(display("Corrupt manifest: {} unexpected trailing bytes", count))]
    TrailingBytes { count: usize },
    #[snafu(display("Corrupt manifest: invalid content"))]
    InvalidContent { source: ManifestError },
}
