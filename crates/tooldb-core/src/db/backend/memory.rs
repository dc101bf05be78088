use crate::db::{
    backend::{BackendError, StorageBackend},
    store::StoreSnapshot,
};

///
/// MemoryBackend
///
/// Keeps the last persisted snapshot in process memory. Nothing survives
/// the process.
///

#[derive(Debug, Default)]
pub struct MemoryBackend {
    snapshot: Option<StoreSnapshot>,
}

impl MemoryBackend {
    #[must_use]
    pub const fn new() -> Self {
        Self { snapshot: None }
    }

    /// Seed the backend with a snapshot, as if it had been persisted.
    #[must_use]
    pub const fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&mut self) -> Result<Option<StoreSnapshot>, BackendError> {
        Ok(self.snapshot.clone())
    }

    fn persist(&mut self, snapshot: &StoreSnapshot) -> Result<(), BackendError> {
        self.snapshot = Some(snapshot.clone());

        Ok(())
    }
}
