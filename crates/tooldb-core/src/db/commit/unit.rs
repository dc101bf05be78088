use crate::{
    db::{
        commit::{CommitMarker, PreparedIndexMutation, PreparedRowOp},
        constraint::{ConstraintView, validate_save},
        store::{DataKey, RawIndexKey, RawRow, Stores},
    },
    error::InternalError,
    model::EntityTag,
    traits::{EntityKind, EntityValue},
    types::{Id, Key},
};
use std::collections::BTreeMap;

///
/// StagedWrites
///
/// Provisional rows of one unit, in staging order, plus the unique keys and
/// sequence positions they claim.
///

#[derive(Debug, Default)]
pub(crate) struct StagedWrites {
    pub(crate) rows: BTreeMap<DataKey, RawRow>,
    pub(crate) index: BTreeMap<RawIndexKey, DataKey>,
    pub(crate) order: Vec<DataKey>,
    pub(crate) sequences: BTreeMap<EntityTag, Key>,
}

///
/// WriteUnit
///
/// A set of inserts that commit together or not at all. Each insert is
/// validated on staging against committed rows plus everything staged
/// before it, so a unit may link records it created itself.
///

pub struct WriteUnit<'a> {
    stores: &'a Stores,
    staged: StagedWrites,
}

impl<'a> WriteUnit<'a> {
    pub(crate) fn new(stores: &'a Stores) -> Self {
        Self {
            stores,
            staged: StagedWrites::default(),
        }
    }

    /// Assign the next id of the table, validate and stage one record.
    ///
    /// Any id already on `entity` is replaced. Returns the record as it
    /// will be stored.
    pub fn insert<E: EntityValue>(&mut self, mut entity: E) -> Result<E, InternalError> {
        let key = self.next_key(E::TAG)?;
        entity.set_id(Id::from_key(key));

        let entries = validate_save(&self.view(), &entity)?;
        let row = RawRow::try_from_entity(&entity)?;

        let data_key = DataKey::new(E::TAG, key);
        for entry in entries {
            self.staged.index.insert(entry.key, data_key);
        }
        self.staged.rows.insert(data_key, row);
        self.staged.order.push(data_key);
        self.staged.sequences.insert(E::TAG, key);

        Ok(entity)
    }

    /// Load one entity, staged rows first.
    pub fn get<E: EntityKind>(&self, id: Id<E>) -> Result<Option<E>, InternalError> {
        self.view().get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.staged.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.staged.order.is_empty()
    }

    fn view(&self) -> ConstraintView<'_> {
        ConstraintView::new(self.stores, &self.staged)
    }

    fn next_key(&self, entity: EntityTag) -> Result<Key, InternalError> {
        let last = self
            .staged
            .sequences
            .get(&entity)
            .copied()
            .unwrap_or_else(|| self.stores.last_key(entity));

        last.checked_add(1).ok_or_else(|| {
            InternalError::commit_internal(format!("key space exhausted for {entity}"))
        })
    }

    /// Turn the staged rows into a mechanical commit plan.
    pub(crate) fn into_marker(self) -> CommitMarker {
        let StagedWrites {
            mut rows,
            index,
            order,
            sequences,
        } = self.staged;

        let mut index_by_owner: BTreeMap<DataKey, Vec<PreparedIndexMutation>> = BTreeMap::new();
        for (key, owner) in index {
            index_by_owner
                .entry(owner)
                .or_default()
                .push(PreparedIndexMutation {
                    key,
                    value: Some(owner),
                });
        }

        let ops = order
            .into_iter()
            .filter_map(|data_key| {
                rows.remove(&data_key).map(|row| PreparedRowOp {
                    index_ops: index_by_owner.remove(&data_key).unwrap_or_default(),
                    data_key,
                    data_value: Some(row),
                })
            })
            .collect();

        CommitMarker {
            ops,
            sequences: sequences.into_iter().collect(),
        }
    }
}
