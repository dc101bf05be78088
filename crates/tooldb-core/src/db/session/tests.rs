use crate::{
    db::session::DbSession,
    entity::{Magazine, MagazineKind, Offset, OffsetOwner, Pocket, Spindle, Tool},
    error::{ErrorClass, ErrorOrigin},
    model::EntityTag,
    obs::{ExecKind, MetricsEvent, MetricsSink},
    test_support::{failing_session, session_with_magazine},
    types::Id,
};
use std::cell::RefCell;

#[test]
fn new_tool_creates_default_offset_in_same_unit() {
    let mut session = DbSession::in_memory();

    let tool = session.new_tool(Tool::new("T1", 5)).expect("tool");

    let offsets = session
        .list::<Offset>(|o| o.owner == OffsetOwner::Tool(tool))
        .expect("offsets");
    assert_eq!(offsets.len(), 1);
    assert_eq!(offsets[0].description, Offset::TOOL_DEFAULT_DESCRIPTION);
}

#[test]
fn new_spindle_creates_default_offset() {
    let mut session = DbSession::in_memory();

    let spindle = session
        .new_spindle(Spindle::new("Main spindle", true))
        .expect("spindle");

    let offsets = session
        .list::<Offset>(|o| o.owner.spindle() == Some(spindle))
        .expect("offsets");
    assert_eq!(offsets.len(), 1);
    assert_eq!(offsets[0].description, Offset::SPINDLE_DEFAULT_DESCRIPTION);
}

#[test]
fn duplicate_tool_leaves_no_partial_records() {
    let mut session = DbSession::in_memory();
    session.new_tool(Tool::new("T1", 5)).expect("first");

    let err = session
        .new_tool(Tool::new("T2", 5))
        .expect_err("duplicate number");

    assert!(err.is_duplicate_key());
    assert_eq!(session.count(EntityTag::Tool), 1);
    assert_eq!(session.count(EntityTag::Offset), 1);
}

#[test]
fn commit_failure_rolls_back_tool_and_offset() {
    let (mut session, fail) = failing_session();
    fail.set(true);

    let err = session
        .new_tool(Tool::new("T1", 1))
        .expect_err("backend rejects");

    assert_eq!(err.class, ErrorClass::CommitFailure);
    assert_eq!(session.count(EntityTag::Tool), 0);
    assert_eq!(session.count(EntityTag::Offset), 0);

    fail.set(false);
    let tool = session.new_tool(Tool::new("T1", 1)).expect("retry");
    assert_eq!(tool.key(), 1);
}

#[test]
fn twelve_pockets_fill_a_magazine() {
    let (mut session, magazine) = session_with_magazine(12);

    for slot in 1..=12 {
        session
            .new_pocket(Pocket::new(magazine, slot))
            .expect("free slot");
    }
    let err = session
        .new_pocket(Pocket::new(magazine, 1))
        .expect_err("slot 1 taken");

    assert!(err.is_duplicate_key());
    assert_eq!(session.count(EntityTag::Pocket), 12);
}

#[test]
fn get_missing_record_is_not_found() {
    let session = DbSession::in_memory();

    let err = session
        .get(Id::<Magazine>::from_key(3))
        .expect_err("nothing stored");

    assert!(err.is_not_found());
    assert_eq!(err.origin, ErrorOrigin::Store);
}

#[test]
fn edit_and_delete_are_unsupported() {
    let mut session = DbSession::in_memory();
    let tool = session.new_tool(Tool::new("T1", 1)).expect("tool");
    let magazine = session
        .new_magazine(Magazine::new("Main", MagazineKind::Linear, 12))
        .expect("magazine");

    let errors = [
        session.edit_tool(tool, Tool::new("T1", 2)).expect_err("edit"),
        session.delete_tool(tool).expect_err("delete"),
        session
            .edit_magazine(magazine, Magazine::new("x", MagazineKind::Rotary, 1))
            .expect_err("edit"),
        session.delete_magazine(magazine).expect_err("delete"),
        session.delete_offset(Id::from_key(1)).expect_err("delete"),
        session.delete_geom_group(Id::from_key(1)).expect_err("delete"),
    ];

    for err in errors {
        assert_eq!(err.class, ErrorClass::Unsupported);
        assert_eq!(err.origin, ErrorOrigin::Session);
    }
    assert_eq!(session.get(tool).expect("tool unchanged").number, 1);
}

#[derive(Default)]
struct Capture(RefCell<Vec<MetricsEvent>>);

impl MetricsSink for Capture {
    fn record(&self, event: MetricsEvent) {
        self.0.borrow_mut().push(event);
    }
}

#[test]
fn session_sink_receives_save_events() {
    let capture: &'static Capture = Box::leak(Box::default());
    let mut session = DbSession::in_memory().metrics_sink(capture);

    session.new_tool(Tool::new("T1", 1)).expect("tool");

    let events = capture.0.borrow();
    assert!(events.contains(&MetricsEvent::ExecStart {
        kind: ExecKind::Save,
        entity_path: "tooldb::Tool",
    }));
    assert!(events.iter().any(|e| matches!(e, MetricsEvent::Commit { rows: 2, .. })));
    assert!(events.contains(&MetricsEvent::ExecFinish {
        kind: ExecKind::Save,
        entity_path: "tooldb::Tool",
        rows_touched: 2,
    }));
}
