use crate::{
    db::store::{Stores, unique_entries_for},
    entity::dispatch_entity_tag,
    error::InternalError,
};

impl Stores {
    /// Rebuild the unique index from the data store and raise sequences to
    /// at least the highest stored key of each table.
    ///
    /// Any row that fails to decode, or two rows claiming one unique key,
    /// is corruption and aborts the rebuild.
    pub(crate) fn rebuild(&mut self) -> Result<(), InternalError> {
        self.index.clear();

        for (data_key, row) in &*self.data {
            self.sequences.observe(data_key.entity(), data_key.key());

            dispatch_entity_tag!(data_key.entity(), E => {
                let entity = row.try_decode_at::<E>(data_key)?;
                for entry in unique_entries_for(&entity)? {
                    if let Some(existing) = self.index.insert(entry.key.clone(), *data_key) {
                        return Err(InternalError::store_corruption(format!(
                            "unique index {} collision on ({}): {existing} and {data_key}",
                            entry.index,
                            entry.values_display(),
                        )));
                    }
                }
            });
        }

        Ok(())
    }
}
