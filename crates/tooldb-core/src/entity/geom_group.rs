use crate::{
    entity::{Geometry, Offset},
    error::InternalError,
    model::{EntityFieldKind, EntityFieldModel, EntityModel, EntityTag},
    traits::{EntityKind, EntityValue, Path},
    types::Id,
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// GeomGroup
///
/// Compound offset: bundles one offset and one geometry under a single id
/// so G-code can address them with one integer (`G43 Hnn`, `G10 L2 Pnn`).
/// Group ids are searched before individual offset/geometry ids.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeomGroup {
    pub id: Id<Self>,
    pub description: String,
    pub offset_id: Option<Id<Offset>>,
    pub geom_id: Option<Id<Geometry>>,
}

impl GeomGroup {
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        offset_id: Option<Id<Offset>>,
        geom_id: Option<Id<Geometry>>,
    ) -> Self {
        Self {
            id: Id::UNASSIGNED,
            description: description.into(),
            offset_id,
            geom_id,
        }
    }
}

static GEOM_GROUP_FIELDS: [EntityFieldModel; 4] = [
    EntityFieldModel::new("id", EntityFieldKind::Uint),
    EntityFieldModel::new("description", EntityFieldKind::Text),
    EntityFieldModel::new(
        "offset_id",
        EntityFieldKind::Relation {
            target: EntityTag::Offset,
        },
    ),
    EntityFieldModel::new(
        "geom_id",
        EntityFieldKind::Relation {
            target: EntityTag::Geometry,
        },
    ),
];

static GEOM_GROUP_MODEL: EntityModel = EntityModel {
    path: GeomGroup::PATH,
    tag: EntityTag::GeomGroup,
    fields: &GEOM_GROUP_FIELDS,
    indexes: &[],
};

impl Path for GeomGroup {
    const PATH: &'static str = "tooldb::GeomGroup";
}

impl EntityKind for GeomGroup {
    const TAG: EntityTag = EntityTag::GeomGroup;
    const MODEL: &'static EntityModel = &GEOM_GROUP_MODEL;

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn set_id(&mut self, id: Id<Self>) {
        self.id = id;
    }

    fn validate_record(&self) -> Result<(), InternalError> {
        if self.offset_id.is_none() && self.geom_id.is_none() {
            return Err(InternalError::constraint_violation(format!(
                "{}: a group needs an offset or a geometry member",
                Self::PATH
            )));
        }

        Ok(())
    }
}

impl EntityValue for GeomGroup {
    fn get_value(&self, field: &str) -> Option<Value> {
        let value = match field {
            "id" => self.id.into(),
            "description" => self.description.as_str().into(),
            "offset_id" => self.offset_id.into(),
            "geom_id" => self.geom_id.into(),
            _ => return None,
        };

        Some(value)
    }
}
