use crate::{
    error::InternalError,
    model::{EntityFieldKind, EntityFieldModel, EntityModel, EntityTag},
    traits::{EntityKind, EntityValue, Path},
    types::Id,
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// Geometry
///
/// Non-motion shape data for a tool (lathe orientation, front and back
/// angles). Only GUIs and visualisers read it.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Geometry {
    pub id: Id<Self>,
    pub description: String,
    pub orientation: Option<i64>,
    pub frontangle: Option<f64>,
    pub backangle: Option<f64>,
}

impl Geometry {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Id::UNASSIGNED,
            description: description.into(),
            orientation: None,
            frontangle: None,
            backangle: None,
        }
    }

    #[must_use]
    pub const fn with_orientation(mut self, orientation: i64) -> Self {
        self.orientation = Some(orientation);
        self
    }

    #[must_use]
    pub const fn with_angles(mut self, frontangle: f64, backangle: f64) -> Self {
        self.frontangle = Some(frontangle);
        self.backangle = Some(backangle);
        self
    }
}

static GEOMETRY_FIELDS: [EntityFieldModel; 5] = [
    EntityFieldModel::new("id", EntityFieldKind::Uint),
    EntityFieldModel::new("description", EntityFieldKind::Text),
    EntityFieldModel::new("orientation", EntityFieldKind::Int),
    EntityFieldModel::new("frontangle", EntityFieldKind::Float),
    EntityFieldModel::new("backangle", EntityFieldKind::Float),
];

static GEOMETRY_MODEL: EntityModel = EntityModel {
    path: Geometry::PATH,
    tag: EntityTag::Geometry,
    fields: &GEOMETRY_FIELDS,
    indexes: &[],
};

impl Path for Geometry {
    const PATH: &'static str = "tooldb::Geometry";
}

impl EntityKind for Geometry {
    const TAG: EntityTag = EntityTag::Geometry;
    const MODEL: &'static EntityModel = &GEOMETRY_MODEL;

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn set_id(&mut self, id: Id<Self>) {
        self.id = id;
    }

    fn validate_record(&self) -> Result<(), InternalError> {
        for (name, angle) in [("frontangle", self.frontangle), ("backangle", self.backangle)] {
            if let Some(angle) = angle
                && !angle.is_finite()
            {
                return Err(InternalError::constraint_violation(format!(
                    "{}: {name} must be finite",
                    Self::PATH
                )));
            }
        }

        Ok(())
    }
}

impl EntityValue for Geometry {
    fn get_value(&self, field: &str) -> Option<Value> {
        let value = match field {
            "id" => self.id.into(),
            "description" => self.description.as_str().into(),
            "orientation" => self.orientation.into(),
            "frontangle" => self.frontangle.into(),
            "backangle" => self.backangle.into(),
            _ => return None,
        };

        Some(value)
    }
}
