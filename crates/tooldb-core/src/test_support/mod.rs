//! Shared fixtures for core tests.

use crate::{
    db::{
        Db,
        backend::{BackendError, MemoryBackend, StorageBackend},
        session::DbSession,
        store::StoreSnapshot,
    },
    entity::{Magazine, MagazineKind},
    types::Id,
};
use std::{cell::Cell, path::PathBuf, rc::Rc};
use tempfile::TempDir;

///
/// FailingBackend
///
/// Memory backend whose `persist` can be switched to fail from outside
/// after the `Db` has taken ownership of it.
///

pub struct FailingBackend {
    inner: MemoryBackend,
    fail: Rc<Cell<bool>>,
}

impl FailingBackend {
    pub fn new() -> (Self, Rc<Cell<bool>>) {
        let fail = Rc::new(Cell::new(false));
        let backend = Self {
            inner: MemoryBackend::new(),
            fail: Rc::clone(&fail),
        };

        (backend, fail)
    }
}

impl StorageBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn load(&mut self) -> Result<Option<StoreSnapshot>, BackendError> {
        self.inner.load()
    }

    fn persist(&mut self, snapshot: &StoreSnapshot) -> Result<(), BackendError> {
        if self.fail.get() {
            return Err(BackendError::Rejected("injected persist failure".to_string()));
        }

        self.inner.persist(snapshot)
    }
}

/// Session over a backend that fails on demand.
pub fn failing_session() -> (DbSession, Rc<Cell<bool>>) {
    let (backend, fail) = FailingBackend::new();
    let db = Db::open(Box::new(backend)).expect("open failing backend");

    (DbSession::new(db), fail)
}

/// Session holding one linear magazine with `pockets` slots.
pub fn session_with_magazine(pockets: u32) -> (DbSession, Id<Magazine>) {
    let mut session = DbSession::in_memory();
    let magazine = session
        .new_magazine(Magazine::new("Main", MagazineKind::Linear, pockets))
        .expect("create magazine");

    (session, magazine)
}

/// Snapshot path inside a fresh temp dir; the file is not created. The
/// dir is removed when the returned guard drops.
pub fn temp_snapshot_path(label: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(format!("{label}.cbor"));

    (dir, path)
}
