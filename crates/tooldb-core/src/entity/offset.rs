use crate::{
    entity::{Spindle, Tool},
    error::InternalError,
    model::{EntityFieldKind, EntityFieldModel, EntityModel, EntityTag},
    traits::{EntityKind, EntityValue, Path},
    types::Id,
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

///
/// AxisOffsets
///
/// Per-axis positional deltas in machine units.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AxisOffsets {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl AxisOffsets {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        a: 0.0,
        b: 0.0,
        c: 0.0,
        u: 0.0,
        v: 0.0,
        w: 0.0,
    };

    #[must_use]
    pub const fn as_array(&self) -> [f64; 9] {
        [
            self.x, self.y, self.z, self.a, self.b, self.c, self.u, self.v, self.w,
        ]
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }
}

impl Add for AxisOffsets {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
            a: self.a + rhs.a,
            b: self.b + rhs.b,
            c: self.c + rhs.c,
            u: self.u + rhs.u,
            v: self.v + rhs.v,
            w: self.w + rhs.w,
        }
    }
}

impl AddAssign for AxisOffsets {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

///
/// OffsetOwner
///
/// An offset belongs to exactly one tool or exactly one spindle.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetOwner {
    Tool(Id<Tool>),
    Spindle(Id<Spindle>),
}

impl OffsetOwner {
    #[must_use]
    pub const fn tool(self) -> Option<Id<Tool>> {
        match self {
            Self::Tool(id) => Some(id),
            Self::Spindle(_) => None,
        }
    }

    #[must_use]
    pub const fn spindle(self) -> Option<Id<Spindle>> {
        match self {
            Self::Spindle(id) => Some(id),
            Self::Tool(_) => None,
        }
    }
}

///
/// Offset
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Offset {
    pub id: Id<Self>,
    pub description: String,
    pub deltas: AxisOffsets,
    pub diameter: f64,
    pub owner: OffsetOwner,
}

impl Offset {
    /// Description given to the offset created alongside a new tool.
    pub const TOOL_DEFAULT_DESCRIPTION: &'static str = "tool default values";

    /// Description given to the offset created alongside a new spindle.
    pub const SPINDLE_DEFAULT_DESCRIPTION: &'static str = "spindle default values";

    #[must_use]
    pub fn new(description: impl Into<String>, owner: OffsetOwner) -> Self {
        Self {
            id: Id::UNASSIGNED,
            description: description.into(),
            deltas: AxisOffsets::ZERO,
            diameter: 0.0,
            owner,
        }
    }

    #[must_use]
    pub fn for_tool(description: impl Into<String>, tool: Id<Tool>) -> Self {
        Self::new(description, OffsetOwner::Tool(tool))
    }

    #[must_use]
    pub fn for_spindle(description: impl Into<String>, spindle: Id<Spindle>) -> Self {
        Self::new(description, OffsetOwner::Spindle(spindle))
    }

    #[must_use]
    pub const fn with_deltas(mut self, deltas: AxisOffsets) -> Self {
        self.deltas = deltas;
        self
    }

    #[must_use]
    pub const fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = diameter;
        self
    }
}

static OFFSET_FIELDS: [EntityFieldModel; 14] = [
    EntityFieldModel::new("id", EntityFieldKind::Uint),
    EntityFieldModel::new("description", EntityFieldKind::Text),
    EntityFieldModel::new("x_offset", EntityFieldKind::Float),
    EntityFieldModel::new("y_offset", EntityFieldKind::Float),
    EntityFieldModel::new("z_offset", EntityFieldKind::Float),
    EntityFieldModel::new("a_offset", EntityFieldKind::Float),
    EntityFieldModel::new("b_offset", EntityFieldKind::Float),
    EntityFieldModel::new("c_offset", EntityFieldKind::Float),
    EntityFieldModel::new("u_offset", EntityFieldKind::Float),
    EntityFieldModel::new("v_offset", EntityFieldKind::Float),
    EntityFieldModel::new("w_offset", EntityFieldKind::Float),
    EntityFieldModel::new("diameter", EntityFieldKind::Float),
    EntityFieldModel::new(
        "tools_id",
        EntityFieldKind::Relation {
            target: EntityTag::Tool,
        },
    ),
    EntityFieldModel::new(
        "spindles_id",
        EntityFieldKind::Relation {
            target: EntityTag::Spindle,
        },
    ),
];

static OFFSET_MODEL: EntityModel = EntityModel {
    path: Offset::PATH,
    tag: EntityTag::Offset,
    fields: &OFFSET_FIELDS,
    indexes: &[],
};

impl Path for Offset {
    const PATH: &'static str = "tooldb::Offset";
}

impl EntityKind for Offset {
    const TAG: EntityTag = EntityTag::Offset;
    const MODEL: &'static EntityModel = &OFFSET_MODEL;

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn set_id(&mut self, id: Id<Self>) {
        self.id = id;
    }

    fn validate_record(&self) -> Result<(), InternalError> {
        if !self.deltas.is_finite() || !self.diameter.is_finite() {
            return Err(InternalError::constraint_violation(format!(
                "{}: offset values must be finite",
                Self::PATH
            )));
        }

        Ok(())
    }
}

impl EntityValue for Offset {
    fn get_value(&self, field: &str) -> Option<Value> {
        let d = &self.deltas;
        let value = match field {
            "id" => self.id.into(),
            "description" => self.description.as_str().into(),
            "x_offset" => d.x.into(),
            "y_offset" => d.y.into(),
            "z_offset" => d.z.into(),
            "a_offset" => d.a.into(),
            "b_offset" => d.b.into(),
            "c_offset" => d.c.into(),
            "u_offset" => d.u.into(),
            "v_offset" => d.v.into(),
            "w_offset" => d.w.into(),
            "diameter" => self.diameter.into(),
            "tools_id" => self.owner.tool().into(),
            "spindles_id" => self.owner.spindle().into(),
            _ => return None,
        };

        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_offsets_add_per_axis() {
        let a = AxisOffsets {
            x: 1.0,
            z: -2.5,
            w: 0.25,
            ..AxisOffsets::ZERO
        };
        let b = AxisOffsets {
            x: 0.5,
            z: 0.5,
            ..AxisOffsets::ZERO
        };

        let sum = a + b;
        assert!((sum.x - 1.5).abs() < f64::EPSILON);
        assert!((sum.z + 2.0).abs() < f64::EPSILON);
        assert!((sum.w - 0.25).abs() < f64::EPSILON);
        assert!(sum.y.abs() < f64::EPSILON);
    }

    #[test]
    fn owner_exposes_exactly_one_relation_field() {
        let offset = Offset::for_tool("wear", Id::from_key(4));

        assert_eq!(offset.get_value("tools_id"), Some(Value::Uint(4)));
        assert_eq!(offset.get_value("spindles_id"), Some(Value::Null));
    }

    #[test]
    fn non_finite_delta_is_rejected() {
        let offset = Offset::for_spindle("bad", Id::from_key(1)).with_deltas(AxisOffsets {
            z: f64::NAN,
            ..AxisOffsets::ZERO
        });

        assert!(offset.validate_record().is_err());
    }
}
