use ndarray::{array, Array1};
use crate::Float;
use std::fmt::Debug;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Represents a single data point with features and a label.
///
/// L: The type of the label (e.g., a class id, String, enum).
/// F: The float type for the features (e.g., f32, f64).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct DataPoint<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub features: Array1<F>,
    pub label: L,
}

impl<L, F> DataPoint<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub fn new(features: Array1<F>, label: L) -> Self {
        DataPoint { features, label }
    }

    /// Builds a two-dimensional point.
    pub fn planar(x: F, y: F, label: L) -> Self {
        DataPoint::new(array![x, y], label)
    }

    /// First coordinate.
    ///
    /// Panics if the point has no features.
    pub fn x(&self) -> F {
        self.features[0]
    }

    /// Second coordinate.
    ///
    /// Panics if the point has fewer than two features.
    pub fn y(&self) -> F {
        self.features[1]
    }

    pub fn dimension(&self) -> usize {
        self.features.len()
    }
}
