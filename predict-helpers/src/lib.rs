//! Shared data types for the predict workspace: labelled points and the
//! CSV-backed table the GUI loads.

mod common;
mod table;

pub use common::DataPoint;
pub use table::{Table, TableError};
