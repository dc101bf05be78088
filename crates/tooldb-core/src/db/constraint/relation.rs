use crate::{
    db::{constraint::ConstraintView, store::DataKey},
    error::{ErrorClass, InternalError},
    obs::sink::{MetricsEvent, record},
    traits::EntityValue,
    value::Value,
};

/// Check that every non-null relation field names an existing row.
pub(crate) fn validate_save_relations<E: EntityValue>(
    view: &ConstraintView<'_>,
    entity: &E,
) -> Result<(), InternalError> {
    let mut checked = 0u64;
    let result = E::MODEL.relations().try_for_each(|(field, target)| {
        let value = entity.get_value(field).ok_or_else(|| {
            InternalError::commit_internal(format!(
                "relation field missing on entity: {} ({field})",
                E::PATH
            ))
        })?;

        let key = match value {
            Value::Null => return Ok(()),
            Value::Uint(key) => key,
            other => {
                return Err(InternalError::commit_internal(format!(
                    "relation field not key-typed: {}.{field} = {other}",
                    E::PATH
                )));
            }
        };

        checked += 1;
        if view.contains(&DataKey::new(target, key)) {
            Ok(())
        } else {
            Err(InternalError::dangling_reference(
                E::PATH,
                field,
                target.table_name(),
                key,
            ))
        }
    });

    let dangling = u64::from(
        result
            .as_ref()
            .is_err_and(|err| err.class == ErrorClass::DanglingReference),
    );
    record(MetricsEvent::RelationValidation {
        entity_path: E::PATH,
        checked,
        dangling,
    });

    result
}
