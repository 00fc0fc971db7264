//! Value model: versions, atoms, rows and the terms operations are made of.

mod column;
mod condition;
mod errors;
mod mutation;
mod row;
mod row_uuid;
mod value;
mod version;

pub use column::Column;
pub use condition::{Condition, Function};
pub use errors::{FormatError, ValidationError, ValidationResult};
pub use mutation::{Mutation, Mutator};
pub use row::Row;
pub use row_uuid::RowUuid;
pub use value::{Atom, AtomData, ColumnData, Datum};
pub use version::Version;
