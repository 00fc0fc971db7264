//! Typed-table views
//!
//! Named, version-gated accessors over a generic [`Row`](crate::notation::Row).
//! Each typed table is described by a static [`TableDescriptor`]; the
//! adapters in [`crate::tables`] wrap a [`TypedRow`] and add one method per
//! accessor.

mod descriptor;
mod view;

pub use descriptor::{ColumnDescriptor, TableDescriptor};
pub use view::{TypedRow, TypedTable};

/// Declares an adapter struct over [`TypedRow`] and implements
/// [`TypedTable`] for it.
macro_rules! typed_table {
    ($(#[$meta:meta])* $name:ident, $descriptor:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(crate::typed::TypedRow);

        impl crate::typed::TypedTable for $name {
            fn descriptor() -> &'static crate::typed::TableDescriptor {
                &$descriptor
            }

            fn from_typed(row: crate::typed::TypedRow) -> Self {
                $name(row)
            }

            fn typed(&self) -> &crate::typed::TypedRow {
                &self.0
            }

            fn typed_mut(&mut self) -> &mut crate::typed::TypedRow {
                &mut self.0
            }

            fn into_typed(self) -> crate::typed::TypedRow {
                self.0
            }
        }
    };
}

/// Getter, column getter and setter for one accessor of a typed table
macro_rules! column_accessors {
    ($accessor:literal: $ty:ty => $column:ident, $get:ident, $set:ident) => {
        pub fn $column(&self) -> Option<&crate::notation::Column> {
            crate::typed::TypedTable::typed(self).column($accessor)
        }

        pub fn $get(&self) -> Option<$ty> {
            crate::typed::TypedTable::typed(self).data($accessor)
        }

        pub fn $set(&mut self, value: $ty) -> crate::error::Result<()> {
            crate::typed::TypedTable::typed_mut(self).set($accessor, value)
        }
    };
}

pub(crate) use column_accessors;
pub(crate) use typed_table;
