//! Data model for typed table export

mod field;
mod kind;
mod table;
mod value;

pub use field::FieldSpec;
pub use kind::ValueKind;
pub use table::{MemTable, Table, TableMode, TableTarget};
pub use value::TypedValue;
