use crate::{types::Key, value::Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

///
/// Id
///
/// Typed primary key. `Id<Tool>` and `Id<Offset>` share the raw `Key`
/// space but cannot be mixed up at call sites.
///
/// Key 0 is never assigned by a store; it marks a provisional record.
///

pub struct Id<E> {
    key: Key,
    _marker: PhantomData<fn() -> E>,
}

impl<E> Id<E> {
    pub const UNASSIGNED: Self = Self::from_key(0);

    #[must_use]
    pub const fn from_key(key: Key) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn key(self) -> Key {
        self.key
    }
}

impl<E> Clone for Id<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Id<E> {}

impl<E> PartialEq for Id<E> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<E> Eq for Id<E> {}

impl<E> PartialOrd for Id<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Id<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl<E> Hash for Id<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<E> fmt::Debug for Id<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.key)
    }
}

impl<E> fmt::Display for Id<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl<E> Default for Id<E> {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}

impl<E> From<Id<E>> for Value {
    fn from(id: Id<E>) -> Self {
        Self::Uint(id.key)
    }
}

// Ids serialize as the bare key so stored rows stay schema-stable.
impl<E> Serialize for Id<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.key)
    }
}

impl<'de, E> Deserialize<'de> for Id<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Key::deserialize(deserializer).map(Self::from_key)
    }
}
