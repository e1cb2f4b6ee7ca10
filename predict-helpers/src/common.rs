use ndarray::Array1;
use std::fmt::Debug;

/// Represents a single data point with features and a label.
///
/// L: The type of the label (e.g., String, i32, enum).
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint<L>
where
    L: Clone + Eq + std::hash::Hash + Debug,
{
    pub features: Array1<f64>,
    pub label: L,
}

impl<L> DataPoint<L>
where
    L: Clone + Eq + std::hash::Hash + Debug,
{
    pub fn new(features: Array1<f64>, label: L) -> Self {
        DataPoint { features, label }
    }

    /// Number of feature values carried by this point.
    pub fn dim(&self) -> usize {
        self.features.len()
    }
}
