use crate::{
    model::{EntityFieldKind, EntityFieldModel, EntityModel, EntityTag},
    traits::{EntityKind, EntityValue, Path},
    types::Id,
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// Spindle
///
/// A spindle with access to the tools in the database. `active` marks the
/// spindle G-code currently addresses; `spindle_hrs` is a runtime counter
/// maintained by the controller.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Spindle {
    pub id: Id<Self>,
    pub description: String,
    pub active: bool,
    pub spindle_hrs: f64,
}

impl Spindle {
    #[must_use]
    pub fn new(description: impl Into<String>, active: bool) -> Self {
        Self {
            id: Id::UNASSIGNED,
            description: description.into(),
            active,
            spindle_hrs: 0.0,
        }
    }
}

static SPINDLE_FIELDS: [EntityFieldModel; 4] = [
    EntityFieldModel::new("id", EntityFieldKind::Uint),
    EntityFieldModel::new("description", EntityFieldKind::Text),
    EntityFieldModel::new("active", EntityFieldKind::Bool),
    EntityFieldModel::new("spindle_hrs", EntityFieldKind::Float),
];

static SPINDLE_MODEL: EntityModel = EntityModel {
    path: Spindle::PATH,
    tag: EntityTag::Spindle,
    fields: &SPINDLE_FIELDS,
    indexes: &[],
};

impl Path for Spindle {
    const PATH: &'static str = "tooldb::Spindle";
}

impl EntityKind for Spindle {
    const TAG: EntityTag = EntityTag::Spindle;
    const MODEL: &'static EntityModel = &SPINDLE_MODEL;

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn set_id(&mut self, id: Id<Self>) {
        self.id = id;
    }
}

impl EntityValue for Spindle {
    fn get_value(&self, field: &str) -> Option<Value> {
        let value = match field {
            "id" => self.id.into(),
            "description" => self.description.as_str().into(),
            "active" => self.active.into(),
            "spindle_hrs" => self.spindle_hrs.into(),
            _ => return None,
        };

        Some(value)
    }
}
