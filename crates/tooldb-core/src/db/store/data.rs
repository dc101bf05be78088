use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::EntityTag,
    serialize::{deserialize, serialize},
    traits::EntityKind,
    types::{Id, Key},
};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};
use thiserror::Error as ThisError;

/// Max serialized bytes for a single row to keep value loads bounded.
pub const MAX_ROW_BYTES: u32 = 4 * 1024 * 1024;

///
/// DataKey
///
/// `(table, key)` address of one stored row. Ordering groups each table's
/// rows together so per-table scans are range scans.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DataKey {
    entity: EntityTag,
    key: Key,
}

impl DataKey {
    #[must_use]
    pub const fn new(entity: EntityTag, key: Key) -> Self {
        Self { entity, key }
    }

    #[must_use]
    pub const fn for_id<E: EntityKind>(id: Id<E>) -> Self {
        Self::new(E::TAG, id.key())
    }

    #[must_use]
    pub const fn lower_bound(entity: EntityTag) -> Self {
        Self::new(entity, Key::MIN)
    }

    #[must_use]
    pub const fn upper_bound(entity: EntityTag) -> Self {
        Self::new(entity, Key::MAX)
    }

    #[must_use]
    pub const fn entity(&self) -> EntityTag {
        self.entity
    }

    #[must_use]
    pub const fn key(&self) -> Key {
        self.key
    }
}

impl Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity, self.key)
    }
}

///
/// RawRowError
///

#[derive(Debug, ThisError)]
pub enum RawRowError {
    #[error("row exceeds max size: {len} bytes (limit {MAX_ROW_BYTES})")]
    TooLarge { len: usize },
}

impl From<RawRowError> for InternalError {
    fn from(err: RawRowError) -> Self {
        Self::new(ErrorClass::ConstraintViolation, ErrorOrigin::Store, err.to_string())
    }
}

///
/// RowDecodeError
///

#[derive(Debug, ThisError)]
pub enum RowDecodeError {
    #[error("row failed to deserialize: {0}")]
    Deserialize(String),

    #[error("row key mismatch: stored under {stored}, row carries {decoded}")]
    KeyMismatch { stored: Key, decoded: Key },
}

///
/// RawRow
///
/// One CBOR-encoded entity.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawRow(#[serde(with = "serde_bytes")] Vec<u8>);

impl RawRow {
    pub fn try_new(bytes: Vec<u8>) -> Result<Self, RawRowError> {
        if bytes.len() > MAX_ROW_BYTES as usize {
            return Err(RawRowError::TooLarge { len: bytes.len() });
        }

        Ok(Self(bytes))
    }

    /// Encode an entity into a bounded row.
    pub fn try_from_entity<E: EntityKind>(entity: &E) -> Result<Self, InternalError> {
        let bytes = serialize(entity)?;

        Ok(Self::try_new(bytes)?)
    }

    pub fn try_decode<E: EntityKind>(&self) -> Result<E, RowDecodeError> {
        deserialize::<E>(&self.0).map_err(|err| RowDecodeError::Deserialize(err.to_string()))
    }

    /// Decode and check the row identity against the key it is stored under.
    pub fn try_decode_at<E: EntityKind>(&self, data_key: &DataKey) -> Result<E, InternalError> {
        let entity = self.try_decode::<E>().map_err(|err| {
            InternalError::store_corruption(format!("failed to decode row {data_key}: {err}"))
        })?;

        let decoded = entity.id().key();
        if decoded != data_key.key() {
            return Err(InternalError::store_corruption(format!(
                "{} ({data_key})",
                RowDecodeError::KeyMismatch {
                    stored: data_key.key(),
                    decoded,
                }
            )));
        }

        Ok(entity)
    }
}

///
/// DataStore
///

#[derive(Debug, Default, Deref, DerefMut)]
pub struct DataStore(BTreeMap<DataKey, RawRow>);

impl DataStore {
    /// Iterate all rows of one table in key order.
    pub fn table(&self, entity: EntityTag) -> impl Iterator<Item = (&DataKey, &RawRow)> {
        self.0
            .range(DataKey::lower_bound(entity)..=DataKey::upper_bound(entity))
    }
}

///
/// SequenceStore
///
/// Last key handed out per table. Keys start at 1 and are never reused.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, PartialEq)]
pub struct SequenceStore(BTreeMap<EntityTag, Key>);

impl SequenceStore {
    #[must_use]
    pub fn last(&self, entity: EntityTag) -> Key {
        self.0.get(&entity).copied().unwrap_or(0)
    }

    /// Record that `key` has been used, keeping the sequence monotonic.
    pub fn observe(&mut self, entity: EntityTag, key: Key) {
        let last = self.0.entry(entity).or_insert(0);
        if key > *last {
            *last = key;
        }
    }
}
