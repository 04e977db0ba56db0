/// Assignment records stored as delimited text.
pub mod assignments;

pub use assignments::{Error, REQUIRED_COLUMNS, load_assignments, read_assignments};
