use std::num::NonZeroUsize;
use std::thread::available_parallelism;

use compio::dispatcher::{Dispatcher, DispatcherBuilder};
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::filesystem::WalkEntry;
use crate::manifest::Record;

/// Default number of worker threads when unable to determine system parallelism
const DEFAULT_WORKER_THREADS: NonZeroUsize = NonZeroUsize::MIN;

/// Fingerprints a pre-enumerated entry list on a pool of worker threads.
///
/// Each worker owns one contiguous chunk of the list and returns its own
/// records; nothing is shared between workers while they run.
pub struct FingerprintExecutor {
    dispatcher: Dispatcher,
    workers: NonZeroUsize,
}

impl FingerprintExecutor {
    pub fn new(workers: NonZeroUsize) -> Result<Self, ExecutorCreationError> {
        debug!("Using {} worker threads for fingerprinting", workers);

        let dispatcher = DispatcherBuilder::new()
            .worker_threads(workers)
            .build()
            .context(DispatcherSnafu)?;

        Ok(Self {
            dispatcher,
            workers,
        })
    }

    /// Determines the optimal number of worker threads for fingerprinting
    pub fn determine_worker_count() -> NonZeroUsize {
        available_parallelism().unwrap_or(DEFAULT_WORKER_THREADS)
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Fingerprints every entry and returns one partial result per chunk,
    /// in chunk order. Waits for all chunks before returning.
    pub async fn fingerprint(
        &self,
        entries: Vec<WalkEntry>,
    ) -> Result<Vec<Vec<Record>>, ExecutionError> {
        let chunks = split_into_chunks(entries, self.workers.get());
        debug!("Dispatching {} fingerprint chunks", chunks.len());

        let mut receivers = Vec::with_capacity(chunks.len());
        for (chunk_index, chunk) in chunks.into_iter().enumerate() {
            let receiver = self
                .dispatcher
                .dispatch(move || fingerprint_chunk(chunk))
                .map_err(|e| ExecutionError::DispatchError {
                    chunk_index,
                    error: e.to_string(),
                })?;
            receivers.push(receiver);
        }

        let mut parts = Vec::with_capacity(receivers.len());
        for (chunk_index, receiver) in receivers.into_iter().enumerate() {
            let records = receiver.await.context(CanceledSnafu { chunk_index })?;
            debug!("Chunk {} produced {} records", chunk_index, records.len());
            parts.push(records);
        }

        Ok(parts)
    }
}

async fn fingerprint_chunk(chunk: Vec<WalkEntry>) -> Vec<Record> {
    let mut records = Vec::with_capacity(chunk.len());
    for entry in chunk {
        records.push(Record::capture(entry).await);
    }
    records
}

/// Splits `items` into at most `parts` contiguous, non-empty chunks of
/// near-equal size
fn split_into_chunks<T>(items: Vec<T>, parts: usize) -> Vec<Vec<T>> {
    if items.is_empty() || parts == 0 {
        return Vec::new();
    }

    let chunk_size = items.len().div_ceil(parts);
    let mut chunks = Vec::with_capacity(parts);
    let mut items = items.into_iter();
    loop {
        let chunk: Vec<T> = items.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }
    chunks
}

#[derive(Debug, Snafu)]
pub enum ExecutorCreationError {
    #[snafu(display("Failed to create fingerprint dispatcher"))]
    DispatcherError { source: std::io::Error },
}

#[derive(Debug, Snafu)]
pub enum ExecutionError {
    #[snafu(display("Failed to dispatch fingerprint chunk {}: {}", chunk_index, error))]
    DispatchError { chunk_index: usize, error: String },
    #[snafu(display("Fingerprint chunk {} got cancelled", chunk_index))]
    CanceledError {
        chunk_index: usize,
        source: futures_channel::oneshot::Canceled,
    },
}
