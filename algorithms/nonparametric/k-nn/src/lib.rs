use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
// These are the core components from our shared library.
use gknn_helpers::{ClassId, Dataset, Distance, Float};

use ndarray::ArrayView1;
use tracing::trace;

/// Errors that can occur when using the k-NN classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum KnnError {
    /// k cannot be zero for a k-NN classifier
    InvalidK,
    /// Cannot predict with an empty training set
    EmptyTrainingSet,
    /// k exceeds the number of training points and the classifier rejects oversized k
    InsufficientNeighbors { k: usize, available: usize },
    /// The query does not have the dataset's feature dimension
    MismatchedDimensions { expected: usize, found: usize },
    /// Invalid distance comparison (likely due to NaN values in data)
    InvalidDistance,
}

impl Display for KnnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KnnError::InvalidK => write!(f, "k cannot be zero for a k-NN classifier"),
            KnnError::EmptyTrainingSet => write!(f, "Cannot predict with an empty training set"),
            KnnError::InsufficientNeighbors { k, available } => write!(
                f,
                "Requested {} neighbors but only {} training points exist",
                k, available
            ),
            KnnError::MismatchedDimensions { expected, found } => write!(
                f,
                "Query has {} features, the training set has {}",
                found, expected
            ),
            KnnError::InvalidDistance => write!(
                f,
                "Invalid distance comparison (likely due to NaN values in data)"
            ),
        }
    }
}

impl Error for KnnError {}

/// What to do when `k` exceeds the number of training points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversizedK {
    /// Use every available point as a neighbor.
    #[default]
    Clamp,
    /// Fail with `KnnError::InsufficientNeighbors`.
    Reject,
}

/// One training point seen from a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<F> {
    pub distance: F,
    pub label: ClassId,
    /// Position of the point in the dataset.
    pub index: usize,
}

/// Result of the nearest-neighbor rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestNeighbor<F> {
    pub distance: F,
    pub label: ClassId,
}

/// Result of the majority rule: the winning class and its neighbor count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MajorityVote {
    pub count: usize,
    pub label: ClassId,
}

/// Result of the distance-weighted rule.
///
/// `weight` is `+inf` when the query coincides with one of its k neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedVote<F> {
    pub weight: F,
    pub label: ClassId,
}

/// Vote comparator shared by both k-based rules.
///
/// `candidate` beats `incumbent` when its score is larger, or when the scores
/// are equal and its class id is larger. Incomparable scores never win.
pub fn outranks<S: PartialOrd>(candidate: (S, ClassId), incumbent: (S, ClassId)) -> bool {
    match candidate.0.partial_cmp(&incumbent.0) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => candidate.1 > incumbent.1,
        _ => false,
    }
}

/// Picks the winning `(score, class)` from per-class tallies indexed by class id.
fn winning_tally<S: PartialOrd + Copy>(tallies: &[S]) -> Option<(S, ClassId)> {
    let mut best: Option<(S, ClassId)> = None;
    for (class, &score) in tallies.iter().enumerate() {
        best = match best {
            Some(incumbent) if !outranks((score, class), incumbent) => Some(incumbent),
            _ => Some((score, class)),
        };
    }
    best
}

/// A k-Nearest Neighbors (k-NN) classifier over a labeled dataset.
///
/// The classifier borrows its training set and never modifies it, so one
/// dataset can back any number of classifiers and queries at once.
///
/// # Type Parameters
///
/// * `F`: The float type for the features (e.g., `f32`, `f64`).
/// * `D`: The distance metric, which must implement `gknn_helpers::Distance`.
#[derive(Debug, Clone)]
pub struct KnnClassifier<'a, F, D>
where
    F: Float,
    D: Distance<F>,
{
    k: usize,
    training_data: &'a Dataset<F>,
    distance: D,
    oversized_k: OversizedK,
}

impl<'a, F, D> KnnClassifier<'a, F, D>
where
    F: Float,
    D: Distance<F>,
{
    /// Creates a new k-NN classifier.
    ///
    /// # Arguments
    ///
    /// * `k`: The number of neighbors for the k-based rules. Must be greater than 0.
    /// * `training_data`: The labeled dataset the classifier votes over.
    /// * `distance`: An instance of a struct that implements the `Distance` trait (e.g., `L2Dist`).
    ///
    /// # Errors
    ///
    /// Returns `KnnError::InvalidK` if `k` is 0, as this is not a valid configuration.
    pub fn new(k: usize, training_data: &'a Dataset<F>, distance: D) -> Result<Self, KnnError> {
        if k == 0 {
            return Err(KnnError::InvalidK);
        }
        Ok(Self {
            k,
            training_data,
            distance,
            oversized_k: OversizedK::default(),
        })
    }

    /// Sets the policy for `k` larger than the training set.
    pub fn with_oversized_k(mut self, policy: OversizedK) -> Self {
        self.oversized_k = policy;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn oversized_k(&self) -> OversizedK {
        self.oversized_k
    }

    /// Every training point paired with its distance to `features`, nearest first.
    ///
    /// The sort is stable: points at equal distance keep their dataset order.
    ///
    /// # Errors
    ///
    /// Returns `KnnError::EmptyTrainingSet`, `KnnError::MismatchedDimensions`
    /// for a query of the wrong length, or `KnnError::InvalidDistance` if any
    /// distance is NaN.
    pub fn neighbors(&self, features: ArrayView1<F>) -> Result<Vec<Neighbor<F>>, KnnError> {
        self.check_query(features)?;

        let mut neighbors = Vec::with_capacity(self.training_data.len());
        for (index, dp) in self.training_data.iter().enumerate() {
            neighbors.push(Neighbor {
                distance: self.distance_to(dp.features.view(), features)?,
                label: dp.label,
                index,
            });
        }

        // NaN was rejected above, so partial_cmp always succeeds here.
        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
        });
        Ok(neighbors)
    }

    /// Classifies `features` by its single closest training point.
    ///
    /// Scans the dataset in stored order with a strict `<` update, so among
    /// points at the same minimal distance the first one wins.
    pub fn nearest_neighbor(&self, features: ArrayView1<F>) -> Result<NearestNeighbor<F>, KnnError> {
        self.check_query(features)?;

        let mut best: Option<NearestNeighbor<F>> = None;
        for dp in self.training_data.iter() {
            let distance = self.distance_to(dp.features.view(), features)?;
            if best.is_none_or(|current| distance < current.distance) {
                best = Some(NearestNeighbor {
                    distance,
                    label: dp.label,
                });
            }
        }
        best.ok_or(KnnError::EmptyTrainingSet)
    }

    /// Majority vote among the `k` closest points.
    ///
    /// Every class in `[0, classes_count)` is tallied; the winner is the
    /// largest count, with ties going to the larger class id.
    pub fn k_nearest_neighbor(&self, features: ArrayView1<F>) -> Result<MajorityVote, KnnError> {
        let neighbors = self.neighbors(features)?;
        let n = self.neighborhood_size(neighbors.len())?;

        let mut votes = vec![0usize; self.training_data.classes_count()];
        for neighbor in &neighbors[..n] {
            votes[neighbor.label] += 1;
        }
        trace!(?votes, k = n, "majority tallies");

        let (count, label) = winning_tally(&votes).ok_or(KnnError::EmptyTrainingSet)?;
        Ok(MajorityVote { count, label })
    }

    /// Inverse-square distance weighted vote among the `k` closest points.
    ///
    /// Each neighbor contributes `1 / d^2` to its class; the reported weight
    /// is `+inf` when that sum overflows, the ranking does not. If any of the `k`
    /// neighbors sits exactly on the query, only those coincident neighbors
    /// vote (one vote each, same tie-break) and the returned weight is `+inf`.
    pub fn weighted_k_nearest_neighbor(
        &self,
        features: ArrayView1<F>,
    ) -> Result<WeightedVote<F>, KnnError> {
        let neighbors = self.neighbors(features)?;
        let n = self.neighborhood_size(neighbors.len())?;
        let nearest = &neighbors[..n];
        let classes_count = self.training_data.classes_count();

        if nearest.iter().any(|nb| nb.distance == F::zero()) {
            let mut votes = vec![0usize; classes_count];
            for nb in nearest.iter().filter(|nb| nb.distance == F::zero()) {
                votes[nb.label] += 1;
            }
            trace!(?votes, "query coincides with training points");
            let (_, label) = winning_tally(&votes).ok_or(KnnError::EmptyTrainingSet)?;
            return Ok(WeightedVote {
                weight: F::infinity(),
                label,
            });
        }

        // Tally (d_min / d)^2, which stays in (0, 1] even when 1 / d^2 overflows.
        // Both rank the classes the same way.
        let d_min = nearest
            .first()
            .map(|nb| nb.distance)
            .ok_or(KnnError::EmptyTrainingSet)?;
        let mut relative = vec![F::zero(); classes_count];
        for nb in nearest {
            let ratio = d_min / nb.distance;
            relative[nb.label] += ratio * ratio;
        }
        trace!(?relative, k = n, "relative weighted tallies");

        let (relative_weight, label) =
            winning_tally(&relative).ok_or(KnnError::EmptyTrainingSet)?;
        Ok(WeightedVote {
            weight: relative_weight / d_min / d_min,
            label,
        })
    }

    /// Predicts the label for a new, unseen data point by majority vote.
    pub fn predict(&self, features: ArrayView1<F>) -> Result<ClassId, KnnError> {
        self.k_nearest_neighbor(features).map(|vote| vote.label)
    }

    fn check_query(&self, features: ArrayView1<F>) -> Result<(), KnnError> {
        let expected = self
            .training_data
            .dimension()
            .ok_or(KnnError::EmptyTrainingSet)?;
        if features.len() != expected {
            return Err(KnnError::MismatchedDimensions {
                expected,
                found: features.len(),
            });
        }
        Ok(())
    }

    fn distance_to(&self, point: ArrayView1<F>, features: ArrayView1<F>) -> Result<F, KnnError> {
        let distance = self.distance.distance(point, features);
        if distance.is_nan() {
            return Err(KnnError::InvalidDistance);
        }
        Ok(distance)
    }

    fn neighborhood_size(&self, available: usize) -> Result<usize, KnnError> {
        if self.k <= available {
            return Ok(self.k);
        }
        match self.oversized_k {
            OversizedK::Clamp => Ok(available),
            OversizedK::Reject => Err(KnnError::InsufficientNeighbors {
                k: self.k,
                available,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use gknn_helpers::{DataPoint, L1Dist, L2Dist};
    use ndarray::array;

    fn dataset(points: &[(f64, f64, ClassId)], classes_count: usize) -> Dataset<f64> {
        let points = points
            .iter()
            .map(|&(x, y, label)| DataPoint::planar(x, y, label))
            .collect();
        Dataset::new(points, classes_count).unwrap()
    }

    fn two_blobs() -> Dataset<f64> {
        dataset(
            &[
                (1.0, 1.0, 0),
                (2.0, 2.0, 0),
                (1.0, 2.0, 0),
                (8.0, 8.0, 1),
                (9.0, 8.0, 1),
                (8.0, 9.0, 1),
            ],
            2,
        )
    }

    #[test]
    fn test_knn_classification_simple() {
        let training_data = two_blobs();
        let classifier = KnnClassifier::new(3, &training_data, L2Dist).unwrap();

        let vote = classifier.k_nearest_neighbor(array![2.5, 2.5].view()).unwrap();
        assert_eq!(vote, MajorityVote { count: 3, label: 0 });

        assert_eq!(classifier.predict(array![7.5, 8.5].view()).unwrap(), 1);
    }

    #[test]
    fn test_knn_k_larger_than_dataset() {
        let training_data = dataset(&[(1.0, 0.0, 0), (2.0, 0.0, 0), (10.0, 0.0, 1)], 2);

        // k=5 is larger than the dataset size of 3; the default policy clamps.
        let classifier = KnnClassifier::new(5, &training_data, L2Dist).unwrap();
        let vote = classifier.k_nearest_neighbor(array![3.0, 0.0].view()).unwrap();
        assert_eq!(vote, MajorityVote { count: 2, label: 0 });
    }

    #[test]
    fn test_reject_policy_for_oversized_k() {
        let training_data = dataset(&[(1.0, 0.0, 0), (2.0, 0.0, 1)], 2);
        let classifier = KnnClassifier::new(3, &training_data, L2Dist)
            .unwrap()
            .with_oversized_k(OversizedK::Reject);
        let query = array![0.0, 0.0];
        let expected = KnnError::InsufficientNeighbors { k: 3, available: 2 };
        assert_eq!(classifier.k_nearest_neighbor(query.view()).unwrap_err(), expected);
        assert_eq!(
            classifier.weighted_k_nearest_neighbor(query.view()).unwrap_err(),
            expected
        );
        // Not k-based.
        assert!(classifier.nearest_neighbor(query.view()).is_ok());
    }

    #[test]
    fn test_error_on_k_zero() {
        let training_data = two_blobs();
        let result = KnnClassifier::new(0, &training_data, L2Dist);
        assert!(matches!(result, Err(KnnError::InvalidK)));
    }

    #[test]
    fn test_error_on_empty_training_set() {
        let training_data: Dataset<f64> = Dataset::new(vec![], 2).unwrap();
        let classifier = KnnClassifier::new(3, &training_data, L2Dist).unwrap();
        let query = array![1.0, 1.0];
        assert_eq!(
            classifier.nearest_neighbor(query.view()).unwrap_err(),
            KnnError::EmptyTrainingSet
        );
        assert_eq!(
            classifier.k_nearest_neighbor(query.view()).unwrap_err(),
            KnnError::EmptyTrainingSet
        );
        assert_eq!(
            classifier.weighted_k_nearest_neighbor(query.view()).unwrap_err(),
            KnnError::EmptyTrainingSet
        );
    }

    #[test]
    fn test_error_on_wrong_query_dimension() {
        let training_data = two_blobs();
        let classifier = KnnClassifier::new(1, &training_data, L2Dist).unwrap();
        assert_eq!(
            classifier.nearest_neighbor(array![1.0].view()).unwrap_err(),
            KnnError::MismatchedDimensions {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_error_on_nan_query() {
        let training_data = two_blobs();
        let classifier = KnnClassifier::new(1, &training_data, L2Dist).unwrap();
        assert_eq!(
            classifier
                .nearest_neighbor(array![f64::NAN, 0.0].view())
                .unwrap_err(),
            KnnError::InvalidDistance
        );
    }

    #[test]
    fn test_nearest_neighbor_first_minimum_wins() {
        // Both points sit at distance 1 from the origin.
        let training_data = dataset(&[(5.0, 5.0, 2), (0.0, 1.0, 1), (1.0, 0.0, 0)], 3);
        let classifier = KnnClassifier::new(1, &training_data, L2Dist).unwrap();
        let nn = classifier.nearest_neighbor(array![0.0, 0.0].view()).unwrap();
        assert_eq!(nn.label, 1);
        assert_abs_diff_eq!(nn.distance, 1.0);
    }

    #[test]
    fn test_nearest_neighbor_when_first_point_is_closest() {
        let training_data = dataset(&[(0.0, 0.0, 1), (3.0, 3.0, 0)], 2);
        let classifier = KnnClassifier::new(1, &training_data, L2Dist).unwrap();
        let nn = classifier.nearest_neighbor(array![0.1, 0.0].view()).unwrap();
        assert_eq!(nn.label, 1);
        assert_abs_diff_eq!(nn.distance, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_neighbors_sort_is_stable() {
        let training_data = dataset(&[(0.0, 2.0, 0), (2.0, 0.0, 1), (0.0, 1.0, 1), (0.0, -2.0, 0)], 2);
        let classifier = KnnClassifier::new(1, &training_data, L2Dist).unwrap();
        let order: Vec<usize> = classifier
            .neighbors(array![0.0, 0.0].view())
            .unwrap()
            .iter()
            .map(|nb| nb.index)
            .collect();
        assert_eq!(order, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_majority_tie_goes_to_higher_class() {
        let training_data = dataset(
            &[(1.0, 0.0, 0), (0.0, 1.0, 1), (-1.0, 0.0, 0), (0.0, -1.0, 1), (5.0, 5.0, 2)],
            3,
        );
        let classifier = KnnClassifier::new(4, &training_data, L2Dist).unwrap();
        let vote = classifier.k_nearest_neighbor(array![0.0, 0.0].view()).unwrap();
        assert_eq!(vote, MajorityVote { count: 2, label: 1 });
    }

    #[test]
    fn test_majority_counts_absent_classes() {
        // Only class 0 among the neighbors; class 2 exists but gets zero votes.
        let training_data = dataset(&[(0.0, 0.0, 0), (9.0, 9.0, 2)], 3);
        let classifier = KnnClassifier::new(1, &training_data, L2Dist).unwrap();
        let vote = classifier.k_nearest_neighbor(array![0.5, 0.5].view()).unwrap();
        assert_eq!(vote, MajorityVote { count: 1, label: 0 });
    }

    #[test]
    fn test_weighted_vote_prefers_closer_minority() {
        // Two far class-0 points against one close class-1 point.
        let training_data = dataset(&[(3.0, 0.0, 0), (-3.0, 0.0, 0), (0.0, 1.0, 1)], 2);
        let classifier = KnnClassifier::new(3, &training_data, L2Dist).unwrap();
        let query = array![0.0, 0.0];

        assert_eq!(classifier.predict(query.view()).unwrap(), 0);

        let vote = classifier.weighted_k_nearest_neighbor(query.view()).unwrap();
        assert_eq!(vote.label, 1);
        assert_abs_diff_eq!(vote.weight, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weighted_vote_sums_inverse_squares() {
        let training_data = dataset(&[(2.0, 0.0, 0), (0.0, 2.0, 0), (4.0, 0.0, 1)], 2);
        let classifier = KnnClassifier::new(3, &training_data, L2Dist).unwrap();
        let vote = classifier
            .weighted_k_nearest_neighbor(array![0.0, 0.0].view())
            .unwrap();
        assert_eq!(vote.label, 0);
        assert_abs_diff_eq!(vote.weight, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_weighted_vote_with_overflowing_weights() {
        // Both 1 / d^2 overflow; the closer class must still win.
        let training_data = dataset(&[(1e-170, 0.0, 0), (2e-170, 0.0, 1)], 2);
        let classifier = KnnClassifier::new(2, &training_data, L2Dist).unwrap();
        let query = array![0.0, 0.0];

        let vote = classifier.weighted_k_nearest_neighbor(query.view()).unwrap();
        assert_eq!(vote.label, 0);
        assert!(vote.weight.is_infinite());

        let nn = classifier.nearest_neighbor(query.view()).unwrap();
        assert_eq!(nn.label, 0);
        assert!(nn.distance > 0.0);
    }

    #[test]
    fn test_weighted_vote_large_weight_outranks_many_small() {
        // Class 1 has two neighbors but the single near class-0 neighbor dominates.
        let training_data = dataset(&[(1e-3, 0.0, 0), (1.0, 0.0, 1), (0.0, 1.0, 1)], 2);
        let classifier = KnnClassifier::new(3, &training_data, L2Dist).unwrap();
        let vote = classifier
            .weighted_k_nearest_neighbor(array![0.0, 0.0].view())
            .unwrap();
        assert_eq!(vote.label, 0);
        assert_abs_diff_eq!(vote.weight, 1e6, epsilon = 1e-3);
    }

    #[test]
    fn test_weighted_vote_with_coincident_query() {
        let training_data = dataset(&[(0.0, 0.0, 0), (0.1, 0.0, 1), (0.0, 0.1, 1)], 2);
        let classifier = KnnClassifier::new(3, &training_data, L2Dist).unwrap();
        let vote = classifier
            .weighted_k_nearest_neighbor(array![0.0, 0.0].view())
            .unwrap();
        assert_eq!(vote.label, 0);
        assert!(vote.weight.is_infinite());
    }

    #[test]
    fn test_weighted_coincident_tie_goes_to_higher_class() {
        let training_data = dataset(&[(1.0, 1.0, 2), (1.0, 1.0, 0), (1.0, 1.5, 0)], 3);
        let classifier = KnnClassifier::new(2, &training_data, L2Dist).unwrap();
        let vote = classifier
            .weighted_k_nearest_neighbor(array![1.0, 1.0].view())
            .unwrap();
        assert_eq!(vote.label, 2);
    }

    #[test]
    fn test_other_metric() {
        // Under L1 the class-1 point is closer; under L2 the class-0 point is.
        let training_data = dataset(&[(0.9, 0.9, 0), (0.0, 1.5, 1)], 2);
        let l1 = KnnClassifier::new(1, &training_data, L1Dist).unwrap();
        let l2 = KnnClassifier::new(1, &training_data, L2Dist).unwrap();
        let query = array![0.0, 0.0];
        assert_eq!(l1.nearest_neighbor(query.view()).unwrap().label, 1);
        assert_eq!(l2.nearest_neighbor(query.view()).unwrap().label, 0);
    }

    #[test]
    fn test_outranks() {
        assert!(outranks((3, 0), (2, 5)));
        assert!(!outranks((2, 5), (3, 0)));
        assert!(outranks((2, 1), (2, 0)));
        assert!(!outranks((2, 0), (2, 1)));
        assert!(!outranks((f64::NAN, 9), (0.0, 0)));
    }
}
