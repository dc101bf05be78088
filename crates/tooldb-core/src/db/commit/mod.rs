//! Commit protocol for write units.
//!
//! Contract:
//! - A `WriteUnit` stages provisional rows against a read-only view of the
//!   committed stores; nothing is visible until commit.
//! - `commit_marker` applies every prepared op, advances sequences and then
//!   hands the full snapshot to the backend.
//! - Any failure after the first op is applied rolls the stores back to
//!   their exact pre-commit state, in reverse write order.

mod guard;
mod rollback;
#[cfg(test)]
mod tests;
mod unit;

pub use unit::WriteUnit;

pub(crate) use guard::CommitApplyGuard;
pub(crate) use unit::StagedWrites;

use crate::{
    db::{
        backend::StorageBackend,
        store::{DataKey, RawIndexKey, RawRow, Stores},
    },
    error::InternalError,
    model::EntityTag,
    obs::sink::{MetricsEvent, record},
    types::Key,
};
use rollback::snapshot_row_rollback;

///
/// PreparedIndexMutation
///
/// Mechanical unique-index write. `None` removes the key.
///

#[derive(Clone, Debug)]
pub(crate) struct PreparedIndexMutation {
    pub(crate) key: RawIndexKey,
    pub(crate) value: Option<DataKey>,
}

///
/// PreparedRowOp
///
/// One atomic row transition: the data write plus its index writes.
///

#[derive(Clone, Debug)]
pub(crate) struct PreparedRowOp {
    pub(crate) index_ops: Vec<PreparedIndexMutation>,
    pub(crate) data_key: DataKey,
    pub(crate) data_value: Option<RawRow>,
}

impl PreparedRowOp {
    /// Apply mechanically; all validation happened before staging.
    pub(crate) fn apply(self, stores: &mut Stores) {
        for index_op in self.index_ops {
            match index_op.value {
                Some(owner) => {
                    stores.index.insert(index_op.key, owner);
                }
                None => {
                    stores.index.remove(&index_op.key);
                }
            }
        }

        match self.data_value {
            Some(row) => {
                stores.data.insert(self.data_key, row);
            }
            None => {
                stores.data.remove(&self.data_key);
            }
        }
    }
}

///
/// CommitMarker
///
/// Full mutation plan of one write unit. Applying it must not re-derive
/// anything from entity contents.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct CommitMarker {
    pub(crate) ops: Vec<PreparedRowOp>,
    pub(crate) sequences: Vec<(EntityTag, Key)>,
}

impl CommitMarker {
    #[must_use]
    pub(crate) const fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn index_inserts(&self) -> u64 {
        self.ops.iter().map(|op| op.index_ops.len() as u64).sum()
    }
}

///
/// CommitReport
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CommitReport {
    pub rows: u64,
    pub index_inserts: u64,
}

// The marker was staged against these stores, so an occupied row or a
// foreign index owner here is an invariant break rather than a user error.
fn preflight(stores: &Stores, op: &PreparedRowOp) -> Result<(), InternalError> {
    if op.data_value.is_some() && stores.contains(&op.data_key) {
        return Err(InternalError::commit_internal(format!(
            "commit would overwrite existing row {}",
            op.data_key
        )));
    }

    for index_op in &op.index_ops {
        if let (Some(owner), Some(existing)) = (index_op.value, stores.index_owner(&index_op.key))
            && owner != existing
        {
            return Err(InternalError::commit_internal(format!(
                "commit would steal unique key of {existing} for {owner}"
            )));
        }
    }

    Ok(())
}

/// Apply a commit marker and persist the result, all or nothing.
pub(crate) fn commit_marker(
    stores: &mut Stores,
    backend: &mut dyn StorageBackend,
    marker: CommitMarker,
) -> Result<CommitReport, InternalError> {
    if marker.is_empty() {
        return Ok(CommitReport::default());
    }

    let report = CommitReport {
        rows: marker.ops.len() as u64,
        index_inserts: marker.index_inserts(),
    };
    let mut guard = CommitApplyGuard::new(stores);

    // Phase 1: apply row ops, recording the prior state of every touched key.
    for op in marker.ops {
        if let Err(err) = preflight(stores, &op) {
            guard.rollback(stores);
            record(MetricsEvent::CommitRollback { rows: report.rows });
            return Err(err);
        }

        guard.record_rollback(snapshot_row_rollback(stores, &op));
        op.apply(stores);
    }

    // Phase 2: advance sequences past every key handed out by the unit.
    for (tag, key) in marker.sequences {
        stores.sequences.observe(tag, key);
    }

    // Phase 3: make it durable.
    if let Err(err) = backend.persist(&stores.snapshot()) {
        guard.rollback(stores);
        record(MetricsEvent::CommitRollback { rows: report.rows });
        tracing::warn!(
            backend = backend.name(),
            rows = report.rows,
            error = %err,
            "commit rolled back"
        );

        return Err(InternalError::commit_failure(format!(
            "backend '{}' failed to persist commit: {err}",
            backend.name()
        )));
    }

    guard.finish();
    record(MetricsEvent::Commit {
        rows: report.rows,
        index_inserts: report.index_inserts,
    });

    Ok(report)
}
