use crate::{
    db::constraint::ConstraintView,
    entity::{Magazine, Tool},
    error::InternalError,
    model::{EntityFieldKind, EntityFieldModel, EntityModel, EntityTag, IndexModel},
    traits::{EntityKind, EntityValue, Path},
    types::Id,
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// Pocket
///
/// One storage slot of a magazine. `slot_pos` is the offset from the
/// magazine base position (or the A-position of a turret); `pocket_offs`
/// encodes per-slot placement differences on turret changers.
///
/// The same physical tool may appear in several pockets across setups.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Pocket {
    pub id: Id<Self>,
    pub pocket_offs: Option<i64>,
    pub slot_pos: Option<i64>,
    pub magazines_id: Option<Id<Magazine>>,
    pub tools_id: Option<Id<Tool>>,
}

impl Pocket {
    #[must_use]
    pub const fn new(magazine: Id<Magazine>, slot_pos: i64) -> Self {
        Self {
            id: Id::UNASSIGNED,
            pocket_offs: None,
            slot_pos: Some(slot_pos),
            magazines_id: Some(magazine),
            tools_id: None,
        }
    }

    #[must_use]
    pub const fn with_pocket_offs(mut self, pocket_offs: i64) -> Self {
        self.pocket_offs = Some(pocket_offs);
        self
    }

    #[must_use]
    pub const fn holding(mut self, tool: Id<Tool>) -> Self {
        self.tools_id = Some(tool);
        self
    }
}

/// Slot positions are unique per magazine.
pub const POCKET_SLOT_INDEX: IndexModel =
    IndexModel::new("magazine_slot", &["magazines_id", "slot_pos"], true);

static POCKET_FIELDS: [EntityFieldModel; 5] = [
    EntityFieldModel::new("id", EntityFieldKind::Uint),
    EntityFieldModel::new("pocket_offs", EntityFieldKind::Int),
    EntityFieldModel::new("slot_pos", EntityFieldKind::Int),
    EntityFieldModel::new(
        "magazines_id",
        EntityFieldKind::Relation {
            target: EntityTag::Magazine,
        },
    ),
    EntityFieldModel::new(
        "tools_id",
        EntityFieldKind::Relation {
            target: EntityTag::Tool,
        },
    ),
];

static POCKET_INDEXES: [IndexModel; 1] = [POCKET_SLOT_INDEX];

static POCKET_MODEL: EntityModel = EntityModel {
    path: Pocket::PATH,
    tag: EntityTag::Pocket,
    fields: &POCKET_FIELDS,
    indexes: &POCKET_INDEXES,
};

impl Path for Pocket {
    const PATH: &'static str = "tooldb::Pocket";
}

impl EntityKind for Pocket {
    const TAG: EntityTag = EntityTag::Pocket;
    const MODEL: &'static EntityModel = &POCKET_MODEL;

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn set_id(&mut self, id: Id<Self>) {
        self.id = id;
    }

    fn validate_record(&self) -> Result<(), InternalError> {
        if let Some(slot_pos) = self.slot_pos
            && slot_pos < 1
        {
            return Err(InternalError::constraint_violation(format!(
                "{}: slot_pos must be at least 1, got {slot_pos}",
                Self::PATH
            )));
        }

        Ok(())
    }

    // The magazine itself is checked by relation validation first, so a
    // missing row here is already reported as a dangling reference.
    fn validate_against(&self, view: &ConstraintView<'_>) -> Result<(), InternalError> {
        let (Some(magazine_id), Some(slot_pos)) = (self.magazines_id, self.slot_pos) else {
            return Ok(());
        };
        let Some(magazine) = view.get(magazine_id)? else {
            return Ok(());
        };

        if !magazine.holds_slot(slot_pos) {
            return Err(InternalError::constraint_violation(format!(
                "{}: slot_pos {slot_pos} outside magazine {} (1..={})",
                Self::PATH,
                magazine.id,
                magazine.num_pockets
            )));
        }

        Ok(())
    }
}

impl EntityValue for Pocket {
    fn get_value(&self, field: &str) -> Option<Value> {
        let value = match field {
            "id" => self.id.into(),
            "pocket_offs" => self.pocket_offs.into(),
            "slot_pos" => self.slot_pos.into(),
            "magazines_id" => self.magazines_id.into(),
            "tools_id" => self.tools_id.into(),
            _ => return None,
        };

        Some(value)
    }
}
