use crate::{
    db::store::{DataKey, RawRow, Stores},
    error::InternalError,
    model::EntityTag,
    types::Key,
};
use serde::{Deserialize, Serialize};

/// Snapshot layout version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

///
/// StoreSnapshot
///
/// Durable image of the committed state handed to a storage backend. The
/// unique index is not part of it; it is rebuilt on load.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSnapshot {
    pub version: u32,
    pub rows: Vec<(DataKey, RawRow)>,
    pub sequences: Vec<(EntityTag, Key)>,
}

impl Stores {
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            version: SNAPSHOT_VERSION,
            rows: self
                .data
                .iter()
                .map(|(key, row)| (*key, row.clone()))
                .collect(),
            sequences: self.sequences.iter().map(|(tag, key)| (*tag, *key)).collect(),
        }
    }

    /// Restore committed state from a snapshot and rebuild the index.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, InternalError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(InternalError::store_corruption(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }

        let mut stores = Self::new();
        for (tag, key) in snapshot.sequences {
            stores.sequences.observe(tag, key);
        }
        for (data_key, row) in snapshot.rows {
            if stores.data.insert(data_key, row).is_some() {
                return Err(InternalError::store_corruption(format!(
                    "snapshot contains duplicate row {data_key}"
                )));
            }
        }
        stores.rebuild()?;

        Ok(stores)
    }
}
