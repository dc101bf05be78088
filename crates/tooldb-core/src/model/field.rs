use crate::model::EntityTag;

///
/// EntityFieldModel
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EntityFieldModel {
    pub name: &'static str,
    pub kind: EntityFieldKind,
}

impl EntityFieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: EntityFieldKind) -> Self {
        Self { name, kind }
    }
}

///
/// EntityFieldKind
///
/// `Relation` fields carry an optional key into `target`; a null value is
/// always allowed, a present one must resolve.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityFieldKind {
    Bool,
    Enum,
    Float,
    Int,
    Text,
    Uint,
    Relation { target: EntityTag },
}

impl EntityFieldKind {
    #[must_use]
    pub const fn relation_target(self) -> Option<EntityTag> {
        match self {
            Self::Relation { target } => Some(target),
            _ => None,
        }
    }
}
