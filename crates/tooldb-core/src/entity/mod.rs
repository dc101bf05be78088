//! The seven tool-database tables.

mod geom_group;
mod geometry;
mod magazine;
mod offset;
mod pocket;
mod spindle;
mod tool;

pub use geom_group::GeomGroup;
pub use geometry::Geometry;
pub use magazine::{DEFAULT_MAGAZINE_POCKETS, Magazine, MagazineKind, ParseMagazineKindError};
pub use offset::{AxisOffsets, Offset, OffsetOwner};
pub use pocket::{POCKET_SLOT_INDEX, Pocket};
pub use spindle::Spindle;
pub use tool::{TOOL_NUMBER_INDEX, Tool};

///
/// dispatch_entity_tag
///
/// Expand `$body` once per table with `$ty` bound to the concrete entity
/// type for `$tag`. Used where rows are handled by tag alone (index rebuild,
/// untyped lookups).
///

macro_rules! dispatch_entity_tag {
    ($tag:expr, $ty:ident => $body:expr) => {
        match $tag {
            $crate::model::EntityTag::Spindle => {
                type $ty = $crate::entity::Spindle;
                $body
            }
            $crate::model::EntityTag::Magazine => {
                type $ty = $crate::entity::Magazine;
                $body
            }
            $crate::model::EntityTag::Pocket => {
                type $ty = $crate::entity::Pocket;
                $body
            }
            $crate::model::EntityTag::GeomGroup => {
                type $ty = $crate::entity::GeomGroup;
                $body
            }
            $crate::model::EntityTag::Geometry => {
                type $ty = $crate::entity::Geometry;
                $body
            }
            $crate::model::EntityTag::Offset => {
                type $ty = $crate::entity::Offset;
                $body
            }
            $crate::model::EntityTag::Tool => {
                type $ty = $crate::entity::Tool;
                $body
            }
        }
    };
}

pub(crate) use dispatch_entity_tag;
