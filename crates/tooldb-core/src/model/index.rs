use std::fmt::{self, Display};

///
/// IndexModel
/// Runtime descriptor for a secondary index over one or more fields.
///
/// A row with a null value in any indexed field is not indexed, so it can
/// never conflict (SQL unique semantics).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexModel {
    pub name: &'static str,
    pub fields: &'static [&'static str],
    pub unique: bool,
}

impl IndexModel {
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [&'static str], unique: bool) -> Self {
        Self {
            name,
            fields,
            unique,
        }
    }
}

impl Display for IndexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.join(", ");

        if self.unique {
            write!(f, "UNIQUE {}({})", self.name, fields)
        } else {
            write!(f, "{}({})", self.name, fields)
        }
    }
}
