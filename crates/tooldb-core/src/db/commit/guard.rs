use crate::db::{
    commit::{PreparedRowOp, rollback::rollback_prepared_row_ops_reverse},
    store::{SequenceStore, Stores},
};

///
/// CommitApplyGuard
///
/// Holds what is needed to undo a partially applied commit: the inverse of
/// every applied row op plus the pre-commit sequences.
///
/// Rollback needs the stores, so it is explicit rather than run on drop. A
/// guard that is neither finished nor rolled back is a logic error and is
/// reported in debug builds.
///

pub(crate) struct CommitApplyGuard {
    sequences: SequenceStore,
    rollbacks: Vec<PreparedRowOp>,
    finished: bool,
}

impl CommitApplyGuard {
    pub(crate) fn new(stores: &Stores) -> Self {
        Self {
            sequences: stores.sequences.clone(),
            rollbacks: Vec::new(),
            finished: false,
        }
    }

    pub(crate) fn record_rollback(&mut self, rollback: PreparedRowOp) {
        self.rollbacks.push(rollback);
    }

    /// Commit succeeded; drop the undo log.
    pub(crate) fn finish(mut self) {
        self.finished = true;
        self.rollbacks.clear();
    }

    /// Restore the stores to their pre-commit state.
    pub(crate) fn rollback(mut self, stores: &mut Stores) {
        rollback_prepared_row_ops_reverse(stores, std::mem::take(&mut self.rollbacks));
        stores.sequences = std::mem::take(&mut self.sequences);
        self.finished = true;
    }
}

impl Drop for CommitApplyGuard {
    fn drop(&mut self) {
        debug_assert!(
            self.finished || std::thread::panicking(),
            "commit apply guard dropped without finish or rollback"
        );
    }
}
