//! Runtime-only schema descriptors for the seven tool-database tables.
//!
//! The constraint layer walks these models instead of hard-coding per-entity
//! checks: relation fields drive foreign-key validation and unique indexes
//! drive duplicate-key detection.

pub mod entity;
pub mod field;
pub mod index;

pub use entity::{EntityModel, EntityTag};
pub use field::{EntityFieldKind, EntityFieldModel};
pub use index::IndexModel;
