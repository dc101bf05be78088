use crate::{
    db::{Db, store::DataKey},
    entity::{Offset, Tool},
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::EntityTag,
    obs::{metrics_report, metrics_reset_all},
    test_support::FailingBackend,
    types::Id,
};

fn failing_db() -> (Db, std::rc::Rc<std::cell::Cell<bool>>) {
    let (backend, fail) = FailingBackend::new();
    let db = Db::open(Box::new(backend)).expect("open");

    (db, fail)
}

fn insert_tool_with_offset(db: &mut Db, number: i64) -> Result<Id<Tool>, InternalError> {
    db.atomic(|unit| {
        let tool = unit.insert(Tool::new("tool", number))?;
        unit.insert(Offset::for_tool(Offset::TOOL_DEFAULT_DESCRIPTION, tool.id))?;
        Ok(tool.id)
    })
    .map(|(id, _)| id)
}

#[test]
fn commit_reports_rows_and_index_inserts() {
    let mut db = Db::in_memory();

    let (_, report) = db
        .atomic(|unit| {
            let tool = unit.insert(Tool::new("tool", 1))?;
            unit.insert(Offset::for_tool("default", tool.id))
        })
        .expect("commit");

    assert_eq!(report.rows, 2);
    assert_eq!(report.index_inserts, 1);
}

#[test]
fn failed_persist_restores_rows_sequences_and_index() {
    metrics_reset_all();
    let (mut db, fail) = failing_db();
    insert_tool_with_offset(&mut db, 1).expect("baseline");

    let rows_before = db.stores().data.len();
    let index_before = db.stores().index.len();
    let sequences_before = db.stores().sequences.clone();

    fail.set(true);
    let err = insert_tool_with_offset(&mut db, 2).expect_err("persist fails");

    assert_eq!(err.class, ErrorClass::CommitFailure);
    assert_eq!(err.origin, ErrorOrigin::Commit);
    assert_eq!(db.stores().data.len(), rows_before);
    assert_eq!(db.stores().index.len(), index_before);
    assert_eq!(db.stores().sequences, sequences_before);
    assert!(!db.stores().contains(&DataKey::new(EntityTag::Tool, 2)));

    let counters = metrics_report(None).counters.expect("counters");
    assert_eq!(counters.ops.commit_rollbacks, 1);

    // Number 2 and id 2 are both free again.
    fail.set(false);
    let id = insert_tool_with_offset(&mut db, 2).expect("retry succeeds");
    assert_eq!(id.key(), 2);
}

#[test]
fn closure_error_writes_nothing() {
    let mut db = Db::in_memory();

    let err = db
        .atomic(|unit| {
            let tool = unit.insert(Tool::new("tool", 1))?;
            unit.insert(Offset::for_tool("dangling", Id::from_key(tool.id.key() + 40)))?;
            Ok(())
        })
        .expect_err("second insert dangles");

    assert_eq!(err.class, ErrorClass::DanglingReference);
    assert_eq!(db.count(EntityTag::Tool), 0);
    assert_eq!(db.stores().last_key(EntityTag::Tool), 0);
}

#[test]
fn empty_unit_commits_nothing() {
    let (mut db, fail) = failing_db();
    fail.set(true);

    let (len, report) = db.atomic(|unit| Ok(unit.len())).expect("nothing to persist");

    assert_eq!(len, 0);
    assert_eq!(report.rows, 0);
}

#[test]
fn ids_continue_across_units() {
    let mut db = Db::in_memory();

    let first = insert_tool_with_offset(&mut db, 10).expect("first");
    let second = insert_tool_with_offset(&mut db, 11).expect("second");

    assert_eq!(first.key(), 1);
    assert_eq!(second.key(), 2);
    assert_eq!(db.stores().last_key(EntityTag::Offset), 2);
}
