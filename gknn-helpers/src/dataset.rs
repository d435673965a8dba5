use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::{DataPoint, Float};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Integer label identifying a class, in `[0, classes_count)`.
pub type ClassId = usize;

/// Errors raised while building or generating a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// A count or distribution parameter is out of range.
    InvalidParameter(&'static str),
    /// A point carries a label outside `[0, classes_count)`.
    LabelOutOfRange { label: ClassId, classes_count: usize },
    /// Points do not share a single feature dimension.
    MismatchedDimensions { expected: usize, found: usize },
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            DatasetError::LabelOutOfRange {
                label,
                classes_count,
            } => write!(
                f,
                "Label {} is outside the class range [0, {})",
                label, classes_count
            ),
            DatasetError::MismatchedDimensions { expected, found } => write!(
                f,
                "Point has {} features, expected {}",
                found, expected
            ),
        }
    }
}

impl Error for DatasetError {}

/// An immutable, labeled point collection.
///
/// Order is preserved exactly as given; classifiers use it to break distance ties.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Dataset<F: Float> {
    points: Vec<DataPoint<ClassId, F>>,
    classes_count: usize,
}

impl<F: Float> Dataset<F> {
    /// Validates and wraps a list of labeled points.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::InvalidParameter` if `classes_count` is 0,
    /// `DatasetError::LabelOutOfRange` for a label `>= classes_count`, and
    /// `DatasetError::MismatchedDimensions` if the points disagree on dimension.
    pub fn new(
        points: Vec<DataPoint<ClassId, F>>,
        classes_count: usize,
    ) -> Result<Self, DatasetError> {
        if classes_count == 0 {
            return Err(DatasetError::InvalidParameter(
                "classes_count must be at least 1",
            ));
        }
        if let Some(first) = points.first() {
            let expected = first.dimension();
            for dp in &points {
                if dp.dimension() != expected {
                    return Err(DatasetError::MismatchedDimensions {
                        expected,
                        found: dp.dimension(),
                    });
                }
                if dp.label >= classes_count {
                    return Err(DatasetError::LabelOutOfRange {
                        label: dp.label,
                        classes_count,
                    });
                }
            }
        }
        Ok(Self {
            points,
            classes_count,
        })
    }

    pub fn points(&self) -> &[DataPoint<ClassId, F>] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataPoint<ClassId, F>> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn classes_count(&self) -> usize {
        self.classes_count
    }

    /// Feature dimension shared by every point, or `None` for an empty dataset.
    pub fn dimension(&self) -> Option<usize> {
        self.points.first().map(DataPoint::dimension)
    }

    /// Points labeled `class`, in stored order.
    pub fn class_points(&self, class: ClassId) -> impl Iterator<Item = &DataPoint<ClassId, F>> {
        self.points.iter().filter(move |dp| dp.label == class)
    }

    /// Number of points per class, indexed by class id.
    pub fn class_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.classes_count];
        for dp in &self.points {
            sizes[dp.label] += 1;
        }
        sizes
    }
}

impl<'a, F: Float> IntoIterator for &'a Dataset<F> {
    type Item = &'a DataPoint<ClassId, F>;
    type IntoIter = std::slice::Iter<'a, DataPoint<ClassId, F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
