use crate::{
    db::store::{DataKey, RawRow, SNAPSHOT_VERSION, StoreSnapshot, Stores},
    entity::Tool,
    error::ErrorClass,
    model::EntityTag,
    traits::EntityKind,
    types::Id,
};

fn tool_row(key: u64, number: i64) -> (DataKey, RawRow) {
    let mut tool = Tool::new("t", number);
    tool.set_id(Id::from_key(key));

    (
        DataKey::new(EntityTag::Tool, key),
        RawRow::try_from_entity(&tool).expect("encode"),
    )
}

fn snapshot(rows: Vec<(DataKey, RawRow)>) -> StoreSnapshot {
    StoreSnapshot {
        version: SNAPSHOT_VERSION,
        rows,
        sequences: Vec::new(),
    }
}

#[test]
fn restore_rebuilds_index_and_sequences() {
    let stores = Stores::from_snapshot(snapshot(vec![tool_row(1, 10), tool_row(4, 11)]))
        .expect("restore");

    assert_eq!(stores.count(EntityTag::Tool), 2);
    assert_eq!(stores.index.len(), 2);
    assert_eq!(stores.last_key(EntityTag::Tool), 4);

    let tool = stores
        .get(Id::<Tool>::from_key(4))
        .expect("decode")
        .expect("present");
    assert_eq!(tool.number, 11);
}

#[test]
fn persisted_sequences_are_not_lowered() {
    let mut snap = snapshot(vec![tool_row(1, 10)]);
    snap.sequences.push((EntityTag::Tool, 7));

    let stores = Stores::from_snapshot(snap).expect("restore");

    assert_eq!(stores.last_key(EntityTag::Tool), 7);
}

#[test]
fn unique_collision_on_restore_is_corruption() {
    let err = Stores::from_snapshot(snapshot(vec![tool_row(1, 5), tool_row(2, 5)]))
        .expect_err("two tools share number 5");

    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn row_under_wrong_key_is_corruption() {
    let (_, row) = tool_row(1, 5);
    let err = Stores::from_snapshot(snapshot(vec![(DataKey::new(EntityTag::Tool, 2), row)]))
        .expect_err("row carries id 1");

    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn unknown_snapshot_version_is_corruption() {
    let mut snap = snapshot(Vec::new());
    snap.version = SNAPSHOT_VERSION + 1;

    let err = Stores::from_snapshot(snap).expect_err("future layout");

    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn snapshot_round_trips_through_restore() {
    let original = Stores::from_snapshot(snapshot(vec![tool_row(1, 10), tool_row(2, 20)]))
        .expect("restore");

    let copy = Stores::from_snapshot(original.snapshot()).expect("restore copy");

    assert_eq!(copy.snapshot(), original.snapshot());
    assert_eq!(copy.index.len(), original.index.len());
}
