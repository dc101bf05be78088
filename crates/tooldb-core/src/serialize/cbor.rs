use crate::serialize::{DecodeLimit, SerializeError};
use serde::{Serialize, de::DeserializeOwned};
use std::panic::{AssertUnwindSafe, catch_unwind};

pub(super) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializeError> {
    serde_cbor::to_vec(value).map_err(|err| SerializeError::Serialize(err.to_string()))
}

// Size is checked before the decoder sees a byte, and a decoder panic
// surfaces as `DecoderPanic` instead of unwinding into the store.
pub(super) fn decode<T: DeserializeOwned>(
    bytes: &[u8],
    limit: DecodeLimit,
) -> Result<T, SerializeError> {
    if let Some(max) = limit.max_bytes()
        && bytes.len() > max
    {
        return Err(SerializeError::TooLarge {
            len: bytes.len(),
            max,
        });
    }

    catch_unwind(AssertUnwindSafe(|| serde_cbor::from_slice::<T>(bytes)))
        .map_err(|_| SerializeError::DecoderPanic)?
        .map_err(|err| SerializeError::Deserialize(err.to_string()))
}
