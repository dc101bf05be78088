//! Core runtime for ToolDB: the seven tool tables, their keyed store,
//! the constraint layer, atomic write units and compound offset
//! resolution, fronted by `DbSession`.

pub(crate) mod macros;

// public exports are one module level down
pub mod db;
pub mod entity;
pub mod error;
pub mod model;
pub mod obs;
pub mod serialize;
pub mod traits;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Domain vocabulary plus the session handle.
///

pub mod prelude {
    pub use crate::{
        db::{Db, session::DbSession},
        entity::{
            AxisOffsets, GeomGroup, Geometry, Magazine, MagazineKind, Offset, OffsetOwner, Pocket,
            Spindle, Tool,
        },
        error::{ErrorClass, InternalError},
        model::EntityTag,
        traits::{EntityKind, Path},
        types::{Id, Key},
        value::Value,
    };
}
