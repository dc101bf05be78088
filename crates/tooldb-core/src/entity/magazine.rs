use crate::{
    error::InternalError,
    model::{EntityFieldKind, EntityFieldModel, EntityModel, EntityTag},
    traits::{EntityKind, EntityValue, Path},
    types::Id,
    value::Value,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error as ThisError;

/// Pocket count used when a caller does not choose one.
pub const DEFAULT_MAGAZINE_POCKETS: u32 = 12;

///
/// MagazineKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MagazineKind {
    #[display("rotary")]
    Rotary,
    #[display("linear")]
    Linear,
}

///
/// ParseMagazineKindError
///

#[derive(Debug, ThisError)]
#[error("unknown magazine kind '{0}' (expected 'rotary' or 'linear')")]
pub struct ParseMagazineKindError(pub String);

impl FromStr for MagazineKind {
    type Err = ParseMagazineKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rotary" => Ok(Self::Rotary),
            "linear" => Ok(Self::Linear),
            _ => Err(ParseMagazineKindError(s.to_string())),
        }
    }
}

///
/// Magazine
///
/// A physical carousel or a job-specific subset of tools. Pocket slot
/// positions are numbered `1..=num_pockets`; `base_pos` keys the position
/// of the base tool.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Magazine {
    pub id: Id<Self>,
    pub description: String,
    pub kind: MagazineKind,
    pub num_pockets: u32,
    pub base_pos: Option<i64>,
}

impl Magazine {
    #[must_use]
    pub fn new(description: impl Into<String>, kind: MagazineKind, num_pockets: u32) -> Self {
        Self {
            id: Id::UNASSIGNED,
            description: description.into(),
            kind,
            num_pockets,
            base_pos: None,
        }
    }

    #[must_use]
    pub const fn with_base_pos(mut self, base_pos: i64) -> Self {
        self.base_pos = Some(base_pos);
        self
    }

    /// Whether `slot_pos` addresses a pocket of this magazine.
    #[must_use]
    pub fn holds_slot(&self, slot_pos: i64) -> bool {
        (1..=i64::from(self.num_pockets)).contains(&slot_pos)
    }
}

static MAGAZINE_FIELDS: [EntityFieldModel; 5] = [
    EntityFieldModel::new("id", EntityFieldKind::Uint),
    EntityFieldModel::new("description", EntityFieldKind::Text),
    EntityFieldModel::new("kind", EntityFieldKind::Enum),
    EntityFieldModel::new("num_pockets", EntityFieldKind::Uint),
    EntityFieldModel::new("base_pos", EntityFieldKind::Int),
];

static MAGAZINE_MODEL: EntityModel = EntityModel {
    path: Magazine::PATH,
    tag: EntityTag::Magazine,
    fields: &MAGAZINE_FIELDS,
    indexes: &[],
};

impl Path for Magazine {
    const PATH: &'static str = "tooldb::Magazine";
}

impl EntityKind for Magazine {
    const TAG: EntityTag = EntityTag::Magazine;
    const MODEL: &'static EntityModel = &MAGAZINE_MODEL;

    fn id(&self) -> Id<Self> {
        self.id
    }

    fn set_id(&mut self, id: Id<Self>) {
        self.id = id;
    }

    fn validate_record(&self) -> Result<(), InternalError> {
        if self.num_pockets == 0 {
            return Err(InternalError::constraint_violation(format!(
                "{}: num_pockets must be at least 1",
                Self::PATH
            )));
        }

        Ok(())
    }
}

impl EntityValue for Magazine {
    fn get_value(&self, field: &str) -> Option<Value> {
        let value = match field {
            "id" => self.id.into(),
            "description" => self.description.as_str().into(),
            "kind" => self.kind.to_string().into(),
            "num_pockets" => u64::from(self.num_pockets).into(),
            "base_pos" => self.base_pos.into(),
            _ => return None,
        };

        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("linear".parse::<MagazineKind>().unwrap(), MagazineKind::Linear);
        assert_eq!(" Rotary ".parse::<MagazineKind>().unwrap(), MagazineKind::Rotary);
        assert!("turret".parse::<MagazineKind>().is_err());
    }

    #[test]
    fn holds_slot_is_one_based_and_inclusive() {
        let magazine = Magazine::new("Main", MagazineKind::Linear, 12);

        assert!(!magazine.holds_slot(0));
        assert!(magazine.holds_slot(1));
        assert!(magazine.holds_slot(12));
        assert!(!magazine.holds_slot(13));
    }

    #[test]
    fn zero_pockets_is_a_constraint_violation() {
        let err = Magazine::new("Empty", MagazineKind::Rotary, 0)
            .validate_record()
            .expect_err("zero pockets should be rejected");

        assert_eq!(err.class, crate::error::ErrorClass::ConstraintViolation);
    }

    #[test]
    fn default_pocket_count_matches_config_default() {
        let defaults = tooldb_config::DefaultsConfig::default();

        assert_eq!(defaults.magazine_pockets, DEFAULT_MAGAZINE_POCKETS);
    }
}
