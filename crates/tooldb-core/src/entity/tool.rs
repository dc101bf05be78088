use crate::{
    entity::{Geometry, Magazine, Spindle},
    error::InternalError,
    model::{EntityFieldKind, EntityFieldModel, EntityModel, EntityTag, IndexModel},
    traits::{EntityKind, EntityValue, Path},
    types::Id,
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// Tool
///
/// A physical tool and the number G-code calls it up by. Several physical
/// tools of the same type may exist; only `number` is unique.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Tool {
    pub id: Id<Self>,
    pub description: String,
    pub number: i64,
    pub spindle_hrs: f64,
    pub distance: f64,
    pub in_use: bool,
    /// Negative means "no limit".
    pub max_rpm: f64,
    pub geometries_id: Option<Id<Geometry>>,
    pub magazines_id: Option<Id<Magazine>>,
    pub spindles_id: Option<Id<Spindle>>,
}

impl Tool {
    pub const NO_RPM_LIMIT: f64 = -1.0;

    #[must_use]
    pub fn new(description: impl Into<String>, number: i64) -> Self {
        Self {
            id: Id::UNASSIGNED,
            description: description.into(),
            number,
            spindle_hrs: 0.0,
            distance: 0.0,
            in_use: true,
            max_rpm: Self::NO_RPM_LIMIT,
            geometries_id: None,
            magazines_id: None,
            spindles_id: None,
        }
    }

    #[must_use]
    pub const fn in_magazine(mut self, magazine: Id<Magazine>) -> Self {
        self.magazines_id = Some(magazine);
        self
    }

    #[must_use]
    pub const fn with_geometry(mut self, geometry: Id<Geometry>) -> Self {
        self.geometries_id = Some(geometry);
        self
    }

    #[must_use]
    pub const fn on_spindle(mut self, spindle: Id<Spindle>) -> Self {
        self.spindles_id = Some(spindle);
        self
    }

    #[must_use]
    pub const fn with_max_rpm(mut self, max_rpm: f64) -> Self {
        self.max_rpm = max_rpm;
        self
    }
}

/// Tool numbers are unique across the whole database.
pub const TOOL_NUMBER_INDEX: IndexModel = IndexModel::new("number", &["number"], true);

static TOOL_FIELDS: [EntityFieldModel; 10] = [
    EntityFieldModel::new("id", EntityFieldKind::Uint),
    EntityFieldModel::new("description", EntityFieldKind::Text),
    EntityFieldModel::new("number", EntityFieldKind::Int),
    EntityFieldModel::new("spindle_hrs", EntityFieldKind::Float),
    EntityFieldModel::new("distance", EntityFieldKind::Float),
    EntityFieldModel::new("in_use", EntityFieldKind::Bool),
    EntityFieldModel::new("max_rpm", EntityFieldKind::Float),
    EntityFieldModel::new(
        "geometries_id",
        EntityFieldKind::Relation {
            target: EntityTag::Geometry,
        },
    ),
    EntityFieldModel::new(
        "magazines_id",
        EntityFieldKind::Relation {
            target: EntityTag::Magazine,
        },
    ),
    EntityFieldModel::new(
        "spindles_id",
        EntityFieldKind::Relation {
            target: EntityTag::Spindle,
        },
    ),
];

static TOOL_INDEXES: [IndexModel; 1] = [TOOL_NUMBER_INDEX];

static TOOL_MODEL: EntityModel = EntityModel {
    path: Tool::PATH,
    tag: EntityTag::Tool,
    fields: &TOOL_FIELDS,
    indexes: &TOOL_INDEXES,
};

impl Path for Tool {
    const PATH: &'static str = "tooldb::Tool";
}

impl EntityKind for Tool {
    const TAG: EntityTag = EntityTag::Tool;
    const MODEL: &'static EntityModel = &TOOL_MODEL;

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn set_id(&mut self, id: Id<Self>) {
        self.id = id;
    }

    fn validate_record(&self) -> Result<(), InternalError> {
        if !self.max_rpm.is_finite() {
            return Err(InternalError::constraint_violation(format!(
                "{}: max_rpm must be finite",
                Self::PATH
            )));
        }

        Ok(())
    }
}

impl EntityValue for Tool {
    fn get_value(&self, field: &str) -> Option<Value> {
        let value = match field {
            "id" => self.id.into(),
            "description" => self.description.as_str().into(),
            "number" => self.number.into(),
            "spindle_hrs" => self.spindle_hrs.into(),
            "distance" => self.distance.into(),
            "in_use" => self.in_use.into(),
            "max_rpm" => self.max_rpm.into(),
            "geometries_id" => self.geometries_id.into(),
            "magazines_id" => self.magazines_id.into(),
            "spindles_id" => self.spindles_id.into(),
            _ => return None,
        };

        Some(value)
    }
}
