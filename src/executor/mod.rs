mod fingerprint_executor;

pub use fingerprint_executor::{ExecutionError, ExecutorCreationError, FingerprintExecutor};
