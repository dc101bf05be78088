//! Byte encoding shared by stored rows and whole-store snapshots (CBOR).

mod cbor;

use crate::{
    db::store::MAX_ROW_BYTES,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("payload of {len} bytes exceeds decode limit of {max}")]
    TooLarge { len: usize, max: usize },

    #[error("decoder panicked on malformed input")]
    DecoderPanic,
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Serialize, err.to_string())
    }
}

///
/// DecodeLimit
///
/// Upper bound applied to a payload before it is decoded.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeLimit {
    /// One stored row, bounded by `MAX_ROW_BYTES`.
    Row,
    /// A whole-store snapshot; only the backend's own read bounds it.
    Snapshot,
}

impl DecodeLimit {
    #[must_use]
    pub const fn max_bytes(self) -> Option<usize> {
        match self {
            Self::Row => Some(MAX_ROW_BYTES as usize),
            Self::Snapshot => None,
        }
    }
}

pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializeError> {
    cbor::encode(value)
}

/// Decode one stored row.
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializeError> {
    cbor::decode(bytes, DecodeLimit::Row)
}

/// Decode a whole-store snapshot.
pub fn deserialize_snapshot<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializeError> {
    cbor::decode(bytes, DecodeLimit::Snapshot)
}
