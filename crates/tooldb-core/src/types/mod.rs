mod id;

pub use id::Id;

/// Raw primary key shared by every table.
pub type Key = u64;
