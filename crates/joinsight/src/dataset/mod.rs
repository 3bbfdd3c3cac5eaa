//! Typed tabular datasets the engine reads from.

mod column;
mod profile;
mod table;
mod value;

pub use column::{Column, ColumnType, is_null_value};
pub use profile::{ColumnProfile, DatasetProfile};
pub use table::Dataset;
pub use value::{Value, ValueKey};
