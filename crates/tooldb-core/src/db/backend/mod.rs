//! Storage collaborators. A backend only moves whole snapshots; it knows
//! nothing about tables, keys or constraints.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::{
    db::store::StoreSnapshot,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use std::path::PathBuf;
use thiserror::Error as ThisError;
use tooldb_config::{BackendKind, StoreConfig};

///
/// BackendError
///

#[derive(Debug, ThisError)]
pub enum BackendError {
    #[error("backend io error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("backend snapshot decode failed: {0}")]
    Decode(String),

    #[error("backend snapshot encode failed: {0}")]
    Encode(String),

    #[error("backend misconfigured: {0}")]
    Config(String),

    #[error("backend rejected write: {0}")]
    Rejected(String),
}

impl From<BackendError> for InternalError {
    fn from(err: BackendError) -> Self {
        let class = match err {
            BackendError::Decode(_) => ErrorClass::Corruption,
            BackendError::Config(_) => ErrorClass::Unsupported,
            BackendError::Io { .. } | BackendError::Encode(_) | BackendError::Rejected(_) => {
                ErrorClass::Internal
            }
        };

        Self::new(class, ErrorOrigin::Backend, err.to_string())
    }
}

///
/// StorageBackend
///
/// Durable home of committed state. `persist` is called once per commit
/// with the full post-commit snapshot; an error aborts the commit.
///

pub trait StorageBackend {
    fn name(&self) -> &'static str;

    /// Return the last persisted snapshot, `None` for a fresh store.
    fn load(&mut self) -> Result<Option<StoreSnapshot>, BackendError>;

    fn persist(&mut self, snapshot: &StoreSnapshot) -> Result<(), BackendError>;
}

/// Build the backend selected by a store config.
pub fn backend_from_config(config: &StoreConfig) -> Result<Box<dyn StorageBackend>, BackendError> {
    match config.backend {
        BackendKind::Memory => Ok(Box::new(MemoryBackend::new())),
        BackendKind::File => {
            let path = config.path.clone().ok_or_else(|| {
                BackendError::Config("file backend requires store.path".to_string())
            })?;

            Ok(Box::new(FileBackend::new(path)))
        }
    }
}
