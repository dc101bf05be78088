use crate::{
    db::{
        Db,
        resolve::{ResolveSource, resolve, resolve_geometry, resolve_offset, resolve_tool},
        store::DataKey,
    },
    entity::{AxisOffsets, GeomGroup, Geometry, Offset, Spindle, Tool},
    error::{ErrorClass, ErrorOrigin},
};

fn deltas(x: f64, z: f64) -> AxisOffsets {
    AxisOffsets {
        x,
        z,
        ..AxisOffsets::ZERO
    }
}

#[test]
fn group_tier_wins_over_colliding_individual_ids() {
    let mut db = Db::in_memory();
    let spindle = db.insert(Spindle::new("main", true)).expect("spindle").id;
    let o1 = db
        .insert(Offset::for_spindle("o1", spindle).with_deltas(deltas(1.0, 0.0)))
        .expect("o1")
        .id;
    let o2 = db
        .insert(Offset::for_spindle("o2", spindle).with_deltas(deltas(2.0, 0.0)))
        .expect("o2")
        .id;
    let g1 = db.insert(Geometry::new("g1")).expect("g1").id;
    let group = db
        .insert(GeomGroup::new("pair", Some(o2), Some(g1)))
        .expect("group")
        .id;

    // Group 1 shadows offset 1 and geometry 1.
    assert_eq!(group.key(), o1.key());
    let resolved = resolve(db.stores(), 1).expect("resolve 1");

    assert_eq!(resolved.source, ResolveSource::Group(group));
    assert_eq!(resolved.offset.as_ref().map(|o| o.id), Some(o2));
    assert_eq!(resolved.geometry.as_ref().map(|g| g.id), Some(g1));
}

#[test]
fn group_equals_combined_individual_lookups() {
    let mut db = Db::in_memory();
    let spindle = db.insert(Spindle::new("main", true)).expect("spindle").id;
    let _pad = db.insert(Offset::for_spindle("pad", spindle)).expect("pad");
    let offset = db
        .insert(Offset::for_spindle("o", spindle).with_deltas(deltas(0.5, -3.0)))
        .expect("offset")
        .id;
    let geometry = db
        .insert(Geometry::new("g").with_orientation(2))
        .expect("geometry")
        .id;
    let _pad_group = db
        .insert(GeomGroup::new("pad", Some(offset), None))
        .expect("pad group");
    let _pad_group = db
        .insert(GeomGroup::new("pad", Some(offset), None))
        .expect("pad group");
    let group = db
        .insert(GeomGroup::new("both", Some(offset), Some(geometry)))
        .expect("group")
        .id;
    assert_eq!(group.key(), 3);

    let via_group = resolve(db.stores(), group.key()).expect("group");
    let combined = resolve_offset(db.stores(), offset.key())
        .expect("offset")
        .combine(resolve_geometry(db.stores(), geometry.key()).expect("geometry"));

    assert_eq!(via_group.offset, combined.offset);
    assert_eq!(via_group.geometry, combined.geometry);
    assert_eq!(combined.source, ResolveSource::Individual);
    assert_eq!(via_group.deltas(), deltas(0.5, -3.0));
}

#[test]
fn individual_tier_returns_whichever_exists() {
    let mut db = Db::in_memory();
    let spindle = db.insert(Spindle::new("main", true)).expect("spindle").id;
    db.insert(Offset::for_spindle("o1", spindle)).expect("o1");
    db.insert(Offset::for_spindle("o2", spindle)).expect("o2");
    db.insert(Geometry::new("g1")).expect("g1");

    let both = resolve(db.stores(), 1).expect("offset and geometry 1");
    assert!(both.offset.is_some() && both.geometry.is_some());

    let only_offset = resolve(db.stores(), 2).expect("offset 2");
    assert!(only_offset.geometry.is_none());
    assert_eq!(only_offset.source, ResolveSource::Individual);
}

#[test]
fn unknown_id_is_not_found() {
    let db = Db::in_memory();

    let err = resolve(db.stores(), 42).expect_err("nothing stored");
    assert_eq!(err.class, ErrorClass::NotFound);
    assert_eq!(err.origin, ErrorOrigin::Resolve);

    assert!(resolve_offset(db.stores(), 42).expect_err("no offset").is_not_found());
    assert!(resolve_geometry(db.stores(), 42).expect_err("no geometry").is_not_found());
}

#[test]
fn tool_offset_sums_tool_and_spindle_offsets() {
    let mut db = Db::in_memory();
    let idle = db.insert(Spindle::new("idle", false)).expect("idle").id;
    let active = db.insert(Spindle::new("active", true)).expect("active").id;
    db.insert(Offset::for_spindle("idle", idle).with_deltas(deltas(100.0, 100.0)))
        .expect("idle offset");
    db.insert(Offset::for_spindle("nose", active).with_deltas(deltas(0.0, 10.0)))
        .expect("spindle offset");

    let tool = db.insert(Tool::new("endmill", 4)).expect("tool").id;
    db.insert(
        Offset::for_tool("length", tool)
            .with_deltas(deltas(0.0, 55.5))
            .with_diameter(6.0),
    )
    .expect("length");
    db.insert(Offset::for_tool("wear", tool).with_deltas(deltas(0.1, -0.5)))
        .expect("wear");

    let resolved = resolve_tool(db.stores(), 4).expect("tool 4");

    assert_eq!(resolved.spindle.as_ref().map(|s| s.id), Some(active));
    assert_eq!(resolved.tool_offsets.len(), 2);
    assert_eq!(resolved.spindle_offsets.len(), 1);
    assert!((resolved.deltas.x - 0.1).abs() < 1e-9);
    assert!((resolved.deltas.z - 65.0).abs() < 1e-9);
    assert!((resolved.diameter - 6.0).abs() < f64::EPSILON);
}

#[test]
fn tool_spindle_overrides_active_spindle() {
    let mut db = Db::in_memory();
    db.insert(Spindle::new("active", true)).expect("active");
    let sub = db.insert(Spindle::new("sub", false)).expect("sub").id;
    db.insert(Offset::for_spindle("sub", sub).with_deltas(deltas(-2.0, 0.0)))
        .expect("sub offset");
    db.insert(Tool::new("part-off", 9).on_spindle(sub))
        .expect("tool");

    let resolved = resolve_tool(db.stores(), 9).expect("tool 9");

    assert_eq!(resolved.spindle.map(|s| s.id), Some(sub));
    assert!((resolved.deltas.x + 2.0).abs() < f64::EPSILON);
}

#[test]
fn retired_or_unknown_tool_is_not_found() {
    let mut db = Db::in_memory();
    let mut retired = Tool::new("worn", 3);
    retired.in_use = false;
    db.insert(retired).expect("retired");

    assert!(resolve_tool(db.stores(), 3).expect_err("not in use").is_not_found());
    assert!(resolve_tool(db.stores(), 8).expect_err("unknown").is_not_found());
}

#[test]
fn missing_group_member_is_corruption() {
    let mut db = Db::in_memory();
    let geometry = db.insert(Geometry::new("g")).expect("geometry").id;
    db.insert(GeomGroup::new("g", None, Some(geometry)))
        .expect("group");

    // Drop the member behind the constraint layer's back.
    let removed = db.stores.data.remove(&DataKey::for_id(geometry));
    assert!(removed.is_some());

    let err = resolve(db.stores(), 1).expect_err("member gone");
    assert_eq!(err.class, ErrorClass::Corruption);
}
