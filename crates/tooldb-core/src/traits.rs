use crate::{
    db::constraint::ConstraintView,
    error::InternalError,
    model::{EntityModel, EntityTag},
    types::Id,
    value::Value,
};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;

///
/// Path
///
/// Fully-qualified type path used in diagnostics.
///

pub trait Path {
    const PATH: &'static str;
}

///
/// EntityKind
///
/// One table of the tool database. The id is assigned by the write unit
/// that stages the record; until then it is `Id::UNASSIGNED`.
///

pub trait EntityKind: Path + Clone + Debug + Serialize + DeserializeOwned + 'static {
    const TAG: EntityTag;
    const MODEL: &'static EntityModel;

    fn id(&self) -> Id<Self>;

    fn set_id(&mut self, id: Id<Self>);

    /// Record-local rules that need no store access.
    fn validate_record(&self) -> Result<(), InternalError> {
        Ok(())
    }

    /// Rules that read other rows (committed or staged in the same unit).
    fn validate_against(&self, _view: &ConstraintView<'_>) -> Result<(), InternalError> {
        Ok(())
    }
}

///
/// EntityValue
///
/// Field access by name, driven by `EntityKind::MODEL`.
///

pub trait EntityValue: EntityKind {
    fn get_value(&self, field: &str) -> Option<Value>;
}
