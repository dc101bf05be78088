use crate::db::{
    commit::{PreparedIndexMutation, PreparedRowOp},
    store::Stores,
};

/// Capture the current store state needed to roll back one prepared row op.
///
/// The returned op writes the prior index/data values back when applied.
#[must_use]
pub(crate) fn snapshot_row_rollback(stores: &Stores, op: &PreparedRowOp) -> PreparedRowOp {
    let index_ops = op
        .index_ops
        .iter()
        .map(|index_op| PreparedIndexMutation {
            key: index_op.key.clone(),
            value: stores.index_owner(&index_op.key),
        })
        .collect();

    PreparedRowOp {
        index_ops,
        data_key: op.data_key,
        data_value: stores.row(&op.data_key).cloned(),
    }
}

/// Apply rollback ops in reverse write order.
pub(crate) fn rollback_prepared_row_ops_reverse(stores: &mut Stores, ops: Vec<PreparedRowOp>) {
    for op in ops.into_iter().rev() {
        op.apply(stores);
    }
}
