use crate::{
    db::store::DataKey,
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::IndexModel,
    traits::EntityValue,
    value::Value,
};
use derive_more::{Deref, DerefMut};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

const TAG_BOOL: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_UINT: u8 = 0x03;
const TAG_TEXT: u8 = 0x04;
const SEPARATOR: u8 = 0x00;

///
/// IndexKeyError
///

#[derive(Debug, ThisError)]
pub enum IndexKeyError {
    #[error("index field missing on entity: {path} ({field})")]
    MissingField { path: &'static str, field: &'static str },

    #[error("index field not indexable: {path} ({field} = {value})")]
    Unindexable {
        path: &'static str,
        field: &'static str,
        value: Value,
    },
}

impl From<IndexKeyError> for InternalError {
    fn from(err: IndexKeyError) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Store, err.to_string())
    }
}

///
/// RawIndexKey
///
/// Canonical byte encoding of `(table, index, components...)`. Equal values
/// always encode to equal bytes, so map lookup is the uniqueness check.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RawIndexKey(Vec<u8>);

///
/// IndexEntry
///
/// One encoded index key plus the values it was built from, kept for
/// diagnostics.
///

#[derive(Clone, Debug)]
pub struct IndexEntry {
    pub index: &'static IndexModel,
    pub key: RawIndexKey,
    pub values: Vec<Value>,
}

impl IndexEntry {
    #[must_use]
    pub fn values_display(&self) -> String {
        self.values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

///
/// Component
///

enum Component {
    Encoded,
    Null,
    Unsupported,
}

// Append one canonical component encoding to `out`.
fn encode_component(value: &Value, out: &mut Vec<u8>) -> Component {
    match value {
        Value::Null => return Component::Null,
        Value::Float(_) => return Component::Unsupported,
        Value::Bool(v) => out.extend_from_slice(&[TAG_BOOL, u8::from(*v)]),
        Value::Int(v) => {
            // Flip the sign bit so byte order matches numeric order.
            let ordered = v.cast_unsigned() ^ (1 << 63);
            out.push(TAG_INT);
            out.extend_from_slice(&ordered.to_be_bytes());
        }
        Value::Uint(v) => {
            out.push(TAG_UINT);
            out.extend_from_slice(&v.to_be_bytes());
        }
        Value::Text(v) => {
            out.push(TAG_TEXT);
            out.extend_from_slice(&(v.len() as u64).to_be_bytes());
            out.extend_from_slice(v.as_bytes());
        }
    }

    Component::Encoded
}

/// Build the index entry for one entity, or `None` when any indexed field
/// is null.
pub fn index_entry_for<E: EntityValue>(
    index: &'static IndexModel,
    entity: &E,
) -> Result<Option<IndexEntry>, IndexKeyError> {
    let mut bytes = Vec::with_capacity(32);
    bytes.extend_from_slice(E::TAG.table_name().as_bytes());
    bytes.push(SEPARATOR);
    bytes.extend_from_slice(index.name.as_bytes());
    bytes.push(SEPARATOR);

    let mut values = Vec::with_capacity(index.fields.len());
    for &field in index.fields {
        let value = entity
            .get_value(field)
            .ok_or(IndexKeyError::MissingField {
                path: E::PATH,
                field,
            })?;

        match encode_component(&value, &mut bytes) {
            Component::Encoded => values.push(value),
            Component::Null => return Ok(None),
            Component::Unsupported => {
                return Err(IndexKeyError::Unindexable {
                    path: E::PATH,
                    field,
                    value,
                });
            }
        }
    }

    Ok(Some(IndexEntry {
        index,
        key: RawIndexKey(bytes),
        values,
    }))
}

/// Build every unique index entry for one entity.
pub fn unique_entries_for<E: EntityValue>(entity: &E) -> Result<Vec<IndexEntry>, IndexKeyError> {
    let mut entries = Vec::new();
    for index in E::MODEL.unique_indexes() {
        if let Some(entry) = index_entry_for(index, entity)? {
            entries.push(entry);
        }
    }

    Ok(entries)
}

///
/// IndexStore
///
/// Unique index entries mapped to the row that owns them. Derived from the
/// data store; rebuilt on open.
///

#[derive(Debug, Default, Deref, DerefMut)]
pub struct IndexStore(BTreeMap<RawIndexKey, DataKey>);
