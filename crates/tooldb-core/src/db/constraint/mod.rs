//! Constraint layer: every rule a record must satisfy before it may be
//! staged in a write unit. Nothing here mutates a store.
//!
//! Save-time order is fixed: record-local rules, relation existence,
//! unique indexes, then cross-row rules. The first failure wins.

mod relation;
mod unique;

#[cfg(test)]
mod tests;

use crate::{
    db::{
        commit::StagedWrites,
        store::{DataKey, IndexEntry, RawIndexKey, Stores},
    },
    error::{ErrorClass, InternalError},
    obs::sink::{MetricsEvent, record},
    traits::{EntityKind, EntityValue},
    types::Id,
};

pub(crate) use relation::validate_save_relations;
pub(crate) use unique::validate_save_unique;

///
/// ConstraintView
///
/// Read view used during validation: rows staged earlier in the same write
/// unit shadow committed rows, so a unit may reference its own records.
///

pub struct ConstraintView<'a> {
    stores: &'a Stores,
    staged: &'a StagedWrites,
}

impl<'a> ConstraintView<'a> {
    pub(crate) const fn new(stores: &'a Stores, staged: &'a StagedWrites) -> Self {
        Self { stores, staged }
    }

    /// Load one entity, staged rows first.
    pub fn get<E: EntityKind>(&self, id: Id<E>) -> Result<Option<E>, InternalError> {
        let data_key = DataKey::for_id(id);
        if let Some(row) = self.staged.rows.get(&data_key) {
            return row.try_decode_at::<E>(&data_key).map(Some);
        }

        self.stores.get(id)
    }

    #[must_use]
    pub fn contains(&self, data_key: &DataKey) -> bool {
        self.staged.rows.contains_key(data_key) || self.stores.contains(data_key)
    }

    /// Owner of a unique index key across committed and staged rows.
    #[must_use]
    pub fn index_owner(&self, key: &RawIndexKey) -> Option<DataKey> {
        self.staged
            .index
            .get(key)
            .copied()
            .or_else(|| self.stores.index_owner(key))
    }
}

/// Run every save-time rule for one candidate and return the unique index
/// entries it will own once committed.
pub(crate) fn validate_save<E: EntityValue>(
    view: &ConstraintView<'_>,
    entity: &E,
) -> Result<Vec<IndexEntry>, InternalError> {
    let result = validate_save_inner(view, entity);

    if let Err(err) = &result
        && err.class == ErrorClass::ConstraintViolation
    {
        record(MetricsEvent::ConstraintViolation {
            entity_path: E::PATH,
        });
    }

    result
}

fn validate_save_inner<E: EntityValue>(
    view: &ConstraintView<'_>,
    entity: &E,
) -> Result<Vec<IndexEntry>, InternalError> {
    entity.validate_record()?;
    validate_save_relations(view, entity)?;
    let entries = validate_save_unique(view, entity)?;
    entity.validate_against(view)?;

    Ok(entries)
}
