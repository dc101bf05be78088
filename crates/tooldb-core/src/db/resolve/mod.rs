//! Compound offset resolution.
//!
//! An integer handed in by G-code is looked up in two tiers: geometry
//! groups first, then individual offsets and geometries. Ids may collide
//! across tables, and the group tier always wins.

mod tool;

#[cfg(test)]
mod tests;

pub use tool::{ResolvedTool, resolve_tool};

use crate::{
    db::store::Stores,
    entity::{AxisOffsets, GeomGroup, Geometry, Offset},
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{MetricsEvent, record},
    traits::{EntityKind, Path},
    types::{Id, Key},
};
use serde::{Deserialize, Serialize};

///
/// ResolveSource
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveSource {
    Group(Id<GeomGroup>),
    Individual,
}

///
/// ResolvedOffset
///
/// Result of one lookup. Either half may be absent: a group may bundle only
/// an offset, and an individual id may match only one table.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResolvedOffset {
    pub source: ResolveSource,
    pub offset: Option<Offset>,
    pub geometry: Option<Geometry>,
}

impl ResolvedOffset {
    #[must_use]
    pub const fn individual(offset: Option<Offset>, geometry: Option<Geometry>) -> Self {
        Self {
            source: ResolveSource::Individual,
            offset,
            geometry,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.offset.is_none() && self.geometry.is_none()
    }

    /// Positional deltas, zero when no offset resolved.
    #[must_use]
    pub fn deltas(&self) -> AxisOffsets {
        self.offset
            .as_ref()
            .map_or(AxisOffsets::ZERO, |offset| offset.deltas)
    }

    #[must_use]
    pub fn diameter(&self) -> f64 {
        self.offset.as_ref().map_or(0.0, |offset| offset.diameter)
    }

    /// Merge two partial results; `self` wins where both carry a value.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        let source = match self.source {
            ResolveSource::Group(_) => self.source,
            ResolveSource::Individual => other.source,
        };

        Self {
            source,
            offset: self.offset.or(other.offset),
            geometry: self.geometry.or(other.geometry),
        }
    }
}

/// Resolve `key` as a group, then as an individual offset and/or geometry.
pub fn resolve(stores: &Stores, key: Key) -> Result<ResolvedOffset, InternalError> {
    let group_id = Id::<GeomGroup>::from_key(key);

    if let Some(group) = stores.get(group_id)? {
        let offset = group
            .offset_id
            .map(|id| group_member(stores, &group, id))
            .transpose()?;
        let geometry = group
            .geom_id
            .map(|id| group_member(stores, &group, id))
            .transpose()?;

        record(MetricsEvent::Resolve {
            group_hit: true,
            found: true,
        });

        return Ok(ResolvedOffset {
            source: ResolveSource::Group(group_id),
            offset,
            geometry,
        });
    }

    let offset = stores.get(Id::<Offset>::from_key(key))?;
    let geometry = stores.get(Id::<Geometry>::from_key(key))?;
    let resolved = ResolvedOffset::individual(offset, geometry);

    record(MetricsEvent::Resolve {
        group_hit: false,
        found: !resolved.is_empty(),
    });

    if resolved.is_empty() {
        return Err(InternalError::resolve_not_found(key));
    }

    Ok(resolved)
}

/// Resolve `key` as an individual offset only.
pub fn resolve_offset(stores: &Stores, key: Key) -> Result<ResolvedOffset, InternalError> {
    let offset = individual::<Offset>(stores, key)?;

    Ok(ResolvedOffset::individual(Some(offset), None))
}

/// Resolve `key` as an individual geometry only.
pub fn resolve_geometry(stores: &Stores, key: Key) -> Result<ResolvedOffset, InternalError> {
    let geometry = individual::<Geometry>(stores, key)?;

    Ok(ResolvedOffset::individual(None, Some(geometry)))
}

fn individual<E: EntityKind>(stores: &Stores, key: Key) -> Result<E, InternalError> {
    stores.get(Id::<E>::from_key(key))?.ok_or_else(|| {
        InternalError::new(
            ErrorClass::NotFound,
            ErrorOrigin::Resolve,
            format!("{} {key} not found", E::TAG.table_name()),
        )
    })
}

// Members are checked on insert and never deleted, so a miss means the
// stores no longer agree with each other.
fn group_member<E: EntityKind>(
    stores: &Stores,
    group: &GeomGroup,
    id: Id<E>,
) -> Result<E, InternalError> {
    stores.get(id)?.ok_or_else(|| {
        InternalError::resolve_corruption(format!(
            "{} {} references missing {} {id}",
            GeomGroup::PATH,
            group.id,
            E::TAG.table_name()
        ))
    })
}
