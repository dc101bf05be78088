//! The tool database: committed stores plus the backend that makes them
//! durable.

pub mod backend;
pub mod commit;
pub mod constraint;
pub mod resolve;
pub mod session;
pub mod store;

use crate::{
    db::{
        backend::{MemoryBackend, StorageBackend, backend_from_config},
        commit::{CommitReport, WriteUnit, commit_marker},
        store::{DataKey, Stores},
    },
    error::InternalError,
    model::EntityTag,
    traits::{EntityKind, EntityValue},
    types::Id,
};
use tooldb_config::StoreConfig;

///
/// Db
///
/// Single-writer handle. Reads borrow it shared; every write goes through
/// `atomic` and needs it exclusively.
///

pub struct Db {
    stores: Stores,
    backend: Box<dyn StorageBackend>,
}

impl Db {
    /// Open a database over `backend`, restoring its last snapshot.
    pub fn open(mut backend: Box<dyn StorageBackend>) -> Result<Self, InternalError> {
        let stores = match backend.load()? {
            Some(snapshot) => Stores::from_snapshot(snapshot)?,
            None => Stores::new(),
        };

        tracing::info!(
            backend = backend.name(),
            rows = stores.data.len(),
            "database opened"
        );

        Ok(Self { stores, backend })
    }

    /// Open with the backend a store config selects.
    pub fn open_with_config(config: &StoreConfig) -> Result<Self, InternalError> {
        Self::open(backend_from_config(config)?)
    }

    /// Open an empty, non-durable database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            stores: Stores::new(),
            backend: Box::new(MemoryBackend::new()),
        }
    }

    /// Persist a final snapshot and release the handle.
    pub fn close(mut self) -> Result<(), InternalError> {
        self.backend.persist(&self.stores.snapshot())?;
        tracing::info!(backend = self.backend.name(), "database closed");

        Ok(())
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    #[must_use]
    pub const fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Load one entity; `NotFound` when absent.
    pub fn get<E: EntityKind>(&self, id: Id<E>) -> Result<E, InternalError> {
        self.stores
            .get(id)?
            .ok_or_else(|| InternalError::store_not_found(DataKey::for_id(id)))
    }

    pub fn list<E: EntityKind>(
        &self,
        predicate: impl FnMut(&E) -> bool,
    ) -> Result<Vec<E>, InternalError> {
        self.stores.list(predicate)
    }

    #[must_use]
    pub fn contains<E: EntityKind>(&self, id: Id<E>) -> bool {
        self.stores.contains(&DataKey::for_id(id))
    }

    #[must_use]
    pub fn count(&self, entity: EntityTag) -> usize {
        self.stores.count(entity)
    }

    /// Stage records in a write unit and commit them together.
    ///
    /// If `f` fails nothing is written. If the commit fails the stores are
    /// restored and `CommitFailure` is returned.
    pub fn atomic<T>(
        &mut self,
        f: impl FnOnce(&mut WriteUnit<'_>) -> Result<T, InternalError>,
    ) -> Result<(T, CommitReport), InternalError> {
        let (value, marker) = {
            let mut unit = WriteUnit::new(&self.stores);
            let value = f(&mut unit)?;
            (value, unit.into_marker())
        };

        let report = commit_marker(&mut self.stores, self.backend.as_mut(), marker)?;

        Ok((value, report))
    }

    /// Insert a single record in its own unit.
    pub fn insert<E: EntityValue>(&mut self, entity: E) -> Result<E, InternalError> {
        self.atomic(|unit| unit.insert(entity))
            .map(|(entity, _)| entity)
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("backend", &self.backend.name())
            .field("rows", &self.stores.data.len())
            .finish_non_exhaustive()
    }
}
