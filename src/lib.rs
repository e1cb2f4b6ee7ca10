//! Application core of the Predict Anything app: load a CSV, pick two
//! feature columns and a target, fit a logistic regression, plot the data
//! and classify single points.
//!
//! Everything here is independent of the GUI toolkit; the `app` crate only
//! wires widgets to the [`Session`] handlers and shows their status text.

pub mod plot;
pub mod session;
pub mod validation;

// Re-export the shared types so the GUI only needs this crate.
pub use logistic::{LogisticClassifier, LogisticError, LogisticParams};
pub use plot::{PlotError, PlotSettings};
pub use predict_helpers::{DataPoint, Table, TableError};
pub use session::{ActionError, Session, Status, TrainError};
pub use validation::{InputError, Selection, SelectionError, ValidSelection};
