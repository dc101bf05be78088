use crate::{
    db::{
        constraint::ConstraintView,
        store::{DataKey, IndexEntry, unique_entries_for},
    },
    error::InternalError,
    obs::sink::{MetricsEvent, record},
    traits::EntityValue,
};

/// Reject the candidate when any of its unique keys is already owned by a
/// different row, committed or staged.
///
/// Rows with a null component in an index are not indexed and never
/// conflict on it.
pub(crate) fn validate_save_unique<E: EntityValue>(
    view: &ConstraintView<'_>,
    entity: &E,
) -> Result<Vec<IndexEntry>, InternalError> {
    let own_key = DataKey::for_id(entity.id());
    let entries = unique_entries_for(entity)?;

    for entry in &entries {
        let Some(owner) = view.index_owner(&entry.key) else {
            continue;
        };
        if owner == own_key {
            continue;
        }

        record(MetricsEvent::UniqueViolation {
            entity_path: E::PATH,
        });
        tracing::debug!(
            entity = E::PATH,
            index = entry.index.name,
            values = %entry.values_display(),
            %owner,
            "unique index conflict"
        );

        return Err(InternalError::duplicate_key(
            E::PATH,
            entry.index.name,
            &entry.values_display(),
        ));
    }

    Ok(entries)
}
