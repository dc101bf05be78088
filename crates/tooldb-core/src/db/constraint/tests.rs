use crate::{
    db::Db,
    entity::{GeomGroup, Geometry, Magazine, MagazineKind, Offset, Pocket, Tool},
    error::{ErrorClass, InternalError},
    model::EntityTag,
    obs::{metrics_report, metrics_reset_all},
    types::Id,
};

fn db_with_magazine(pockets: u32) -> (Db, Id<Magazine>) {
    let mut db = Db::in_memory();
    let magazine = db
        .insert(Magazine::new("Main", MagazineKind::Linear, pockets))
        .expect("insert magazine");

    (db, magazine.id)
}

#[test]
fn dangling_magazine_reference_is_rejected() {
    let mut db = Db::in_memory();

    let err = db
        .insert(Pocket::new(Id::from_key(9), 1))
        .expect_err("magazine 9 does not exist");

    assert_eq!(err.class, ErrorClass::DanglingReference);
    assert!(err.message.contains("magazines_id"), "{}", err.message);
    assert_eq!(db.count(EntityTag::Pocket), 0);
}

#[test]
fn every_relation_field_rejects_a_missing_target() {
    type Insert = fn(&mut Db, Id<Magazine>) -> Result<(), InternalError>;

    let missing = 9;
    let cases: [(&str, EntityTag, Insert); 6] = [
        ("geometries_id", EntityTag::Tool, |db, _| {
            db.insert(Tool::new("T1", 1).with_geometry(Id::from_key(9)))
                .map(|_| ())
        }),
        ("spindles_id", EntityTag::Tool, |db, _| {
            db.insert(Tool::new("T1", 1).on_spindle(Id::from_key(9)))
                .map(|_| ())
        }),
        ("spindles_id", EntityTag::Offset, |db, _| {
            db.insert(Offset::for_spindle("wear", Id::from_key(9)))
                .map(|_| ())
        }),
        ("offset_id", EntityTag::GeomGroup, |db, _| {
            db.insert(GeomGroup::new("g", Some(Id::from_key(9)), None))
                .map(|_| ())
        }),
        ("geom_id", EntityTag::GeomGroup, |db, _| {
            db.insert(GeomGroup::new("g", None, Some(Id::from_key(9))))
                .map(|_| ())
        }),
        ("tools_id", EntityTag::Pocket, |db, magazine| {
            db.insert(Pocket::new(magazine, 1).holding(Id::from_key(9)))
                .map(|_| ())
        }),
    ];

    for (field, table, insert) in cases {
        let (mut db, magazine) = db_with_magazine(12);

        let err = insert(&mut db, magazine).expect_err(field);

        assert_eq!(err.class, ErrorClass::DanglingReference, "{field}: {err:?}");
        assert!(
            err.message.contains(field) && err.message.contains(&format!("#{missing}")),
            "{field}: {}",
            err.message
        );
        assert_eq!(db.count(table), 0, "{field}");
    }
}

#[test]
fn duplicate_tool_number_is_rejected_and_counted() {
    metrics_reset_all();
    let mut db = Db::in_memory();
    db.insert(Tool::new("T1", 5)).expect("first tool");

    let err = db.insert(Tool::new("T2", 5)).expect_err("number 5 taken");

    assert_eq!(err.class, ErrorClass::DuplicateKey);
    assert_eq!(db.list::<Tool>(|_| true).expect("list").len(), 1);
    let counters = metrics_report(None).counters.expect("counters");
    assert_eq!(counters.ops.unique_violations, 1);
    assert_eq!(counters.entities["tooldb::Tool"].unique_violations, 1);
}

#[test]
fn duplicate_within_one_unit_is_rejected() {
    let mut db = Db::in_memory();

    let err = db
        .atomic(|unit| {
            unit.insert(Tool::new("a", 7))?;
            unit.insert(Tool::new("b", 7))?;
            Ok(())
        })
        .expect_err("second staged tool collides with the first");

    assert_eq!(err.class, ErrorClass::DuplicateKey);
    assert_eq!(db.count(EntityTag::Tool), 0);
}

#[test]
fn slot_outside_magazine_is_a_constraint_violation() {
    let (mut db, magazine) = db_with_magazine(12);

    let err = db
        .insert(Pocket::new(magazine, 13))
        .expect_err("slot 13 of a 12-pocket magazine");
    assert_eq!(err.class, ErrorClass::ConstraintViolation);

    let err = db
        .insert(Pocket::new(magazine, 0))
        .expect_err("slots are one-based");
    assert_eq!(err.class, ErrorClass::ConstraintViolation);

    db.insert(Pocket::new(magazine, 12)).expect("last slot is valid");
}

#[test]
fn same_slot_in_two_magazines_is_allowed() {
    let (mut db, first) = db_with_magazine(4);
    let second = db
        .insert(Magazine::new("Turret", MagazineKind::Rotary, 4))
        .expect("second magazine")
        .id;

    db.insert(Pocket::new(first, 2)).expect("slot 2 in first");
    db.insert(Pocket::new(second, 2)).expect("slot 2 in second");

    let err = db
        .insert(Pocket::new(first, 2))
        .expect_err("slot 2 taken in first");
    assert_eq!(err.class, ErrorClass::DuplicateKey);
}

#[test]
fn pockets_without_slot_never_conflict() {
    let (mut db, magazine) = db_with_magazine(4);

    for _ in 0..3 {
        let mut pocket = Pocket::new(magazine, 1);
        pocket.slot_pos = None;
        db.insert(pocket).expect("unslotted pocket");
    }

    assert_eq!(db.count(EntityTag::Pocket), 3);
}

#[test]
fn unit_may_reference_its_own_staged_rows() {
    let mut db = Db::in_memory();

    let (tool, offset) = db
        .atomic(|unit| {
            let tool = unit.insert(Tool::new("drill", 1))?;
            let offset = unit.insert(Offset::for_tool("wear", tool.id))?;
            Ok((tool.id, offset.id))
        })
        .expect("staged references resolve")
        .0;

    assert_eq!(db.get(offset).expect("offset").owner.tool(), Some(tool));
}

#[test]
fn empty_geom_group_is_rejected() {
    let mut db = Db::in_memory();

    let err = db
        .insert(GeomGroup::new("empty", None, None))
        .expect_err("a group needs a member");
    assert_eq!(err.class, ErrorClass::ConstraintViolation);

    let geometry = db.insert(Geometry::new("flat")).expect("geometry").id;
    db.insert(GeomGroup::new("g", None, Some(geometry)))
        .expect("geometry-only group");
}
