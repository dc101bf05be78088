use crate::model::{EntityFieldModel, IndexModel};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// EntityTag
///
/// Table discriminator. Part of every stored `DataKey`; ordering groups rows
/// of one table together in the data store.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum EntityTag {
    Spindle,
    Magazine,
    Pocket,
    GeomGroup,
    Geometry,
    Offset,
    Tool,
}

impl EntityTag {
    pub const ALL: [Self; 7] = [
        Self::Spindle,
        Self::Magazine,
        Self::Pocket,
        Self::GeomGroup,
        Self::Geometry,
        Self::Offset,
        Self::Tool,
    ];

    /// Stable table name, as used in the SQL schema.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Spindle => "spindles",
            Self::Magazine => "magazines",
            Self::Pocket => "pockets",
            Self::GeomGroup => "geom_groups",
            Self::Geometry => "geometries",
            Self::Offset => "offsets",
            Self::Tool => "tools",
        }
    }

    #[must_use]
    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.table_name() == name)
    }
}

///
/// EntityModel
///

#[derive(Debug)]
pub struct EntityModel {
    pub path: &'static str,
    pub tag: EntityTag,
    pub fields: &'static [EntityFieldModel],
    pub indexes: &'static [IndexModel],
}

impl EntityModel {
    /// Iterate `(field, target)` pairs for every relation field.
    pub fn relations(&self) -> impl Iterator<Item = (&'static str, EntityTag)> + '_ {
        self.fields
            .iter()
            .filter_map(|field| field.kind.relation_target().map(|t| (field.name, t)))
    }

    pub fn unique_indexes(&self) -> impl Iterator<Item = &'static IndexModel> + '_ {
        self.indexes.iter().filter(|index| index.unique)
    }
}
