// unsupported_ops
// Declared-but-unimplemented edit/delete operations on `DbSession`. Each
// one fails with `ErrorClass::Unsupported` and never touches the stores.
macro_rules! unsupported_ops {
    ($($entity:ty => $edit:ident, $delete:ident;)*) => {
        $(
            #[doc = concat!("Edit one `", stringify!($entity), "`. Not implemented; always `Unsupported`.")]
            pub fn $edit(
                &mut self,
                _id: $crate::types::Id<$entity>,
                _record: $entity,
            ) -> Result<(), $crate::error::InternalError> {
                Err(self.unsupported(stringify!($edit)))
            }

            #[doc = concat!("Delete one `", stringify!($entity), "`. Not implemented; always `Unsupported`.")]
            pub fn $delete(
                &mut self,
                _id: $crate::types::Id<$entity>,
            ) -> Result<(), $crate::error::InternalError> {
                Err(self.unsupported(stringify!($delete)))
            }
        )*
    };
}

pub(crate) use unsupported_ops;
