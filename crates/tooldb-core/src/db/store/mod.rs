//! Entity store: CBOR rows keyed by `(table, key)`, per-table sequences and
//! the derived unique index.

mod data;
mod index;
mod rebuild;
mod snapshot;
#[cfg(test)]
mod tests;

pub use data::*;
pub use index::*;
pub use snapshot::*;

use crate::{
    error::InternalError,
    model::EntityTag,
    traits::EntityKind,
    types::Id,
};

///
/// Stores
///
/// The committed state of one database. Only the commit protocol mutates
/// it; everything else reads.
///

#[derive(Debug, Default)]
pub struct Stores {
    pub(crate) data: DataStore,
    pub(crate) index: IndexStore,
    pub(crate) sequences: SequenceStore,
}

impl Stores {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, data_key: &DataKey) -> bool {
        self.data.contains_key(data_key)
    }

    #[must_use]
    pub fn row(&self, data_key: &DataKey) -> Option<&RawRow> {
        self.data.get(data_key)
    }

    /// Load one entity, `None` when the key is absent.
    pub fn get<E: EntityKind>(&self, id: Id<E>) -> Result<Option<E>, InternalError> {
        let data_key = DataKey::for_id(id);

        self.data
            .get(&data_key)
            .map(|row| row.try_decode_at::<E>(&data_key))
            .transpose()
    }

    /// Load every entity of one table that matches `predicate`, in key order.
    pub fn list<E: EntityKind>(
        &self,
        mut predicate: impl FnMut(&E) -> bool,
    ) -> Result<Vec<E>, InternalError> {
        let mut out = Vec::new();
        for (data_key, row) in self.data.table(E::TAG) {
            let entity = row.try_decode_at::<E>(data_key)?;
            if predicate(&entity) {
                out.push(entity);
            }
        }

        Ok(out)
    }

    #[must_use]
    pub fn count(&self, entity: EntityTag) -> usize {
        self.data.table(entity).count()
    }

    /// Owner of a unique index key, if any.
    #[must_use]
    pub fn index_owner(&self, key: &RawIndexKey) -> Option<DataKey> {
        self.index.get(key).copied()
    }

    #[must_use]
    pub fn last_key(&self, entity: EntityTag) -> crate::types::Key {
        self.sequences.last(entity)
    }
}
