//! Feature-space separability ("informativeness") of a labeled dataset.
//!
//! The score is the mean inter-class pairwise distance divided by the mean
//! intra-class pairwise distance. Both means are unweighted averages of
//! per-class (or per class pair) means.

use std::error::Error;
use std::fmt::{Display, Formatter};

use gknn_helpers::{ClassId, DataPoint, Dataset, Distance, Float};
use ndarray::Zip;
use tracing::debug;

/// Which mean could not be formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeanScope {
    /// The class has fewer than two points or no qualifying pair.
    Intraclass(ClassId),
    /// One side of the class pair is empty.
    Interclass(ClassId, ClassId),
    /// Informativeness needs at least two classes.
    FewerThanTwoClasses,
}

/// Errors that can occur during separability analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum SeparabilityError {
    /// The class id is outside `[0, classes_count)`.
    UnknownClass { class: ClassId, classes_count: usize },
    /// An inter-class mean was requested for a class paired with itself.
    SameClassPair(ClassId),
    /// A mean over zero distances was requested.
    UndefinedMean(MeanScope),
    /// The mean intra-class distance is zero.
    DivisionByZero,
    /// A distance evaluated to NaN.
    InvalidDistance,
}

impl Display for SeparabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SeparabilityError::UnknownClass {
                class,
                classes_count,
            } => write!(
                f,
                "Class {} is outside the class range [0, {})",
                class, classes_count
            ),
            SeparabilityError::SameClassPair(class) => {
                write!(f, "Inter-class mean needs two different classes, got {} twice", class)
            }
            SeparabilityError::UndefinedMean(MeanScope::Intraclass(class)) => {
                write!(f, "Class {} has no qualifying point pairs", class)
            }
            SeparabilityError::UndefinedMean(MeanScope::Interclass(a, b)) => {
                write!(f, "Classes {} and {} have no point pairs", a, b)
            }
            SeparabilityError::UndefinedMean(MeanScope::FewerThanTwoClasses) => {
                write!(f, "Informativeness needs at least two classes")
            }
            SeparabilityError::DivisionByZero => {
                write!(f, "Mean intra-class distance is zero")
            }
            SeparabilityError::InvalidDistance => {
                write!(f, "Distance evaluated to NaN (likely due to NaN values in data)")
            }
        }
    }
}

impl Error for SeparabilityError {}

/// Rule deciding which same-class point pairs enter the intra-class mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairExclusion {
    /// Every pair of distinct points (`i != j`), duplicates of a location included.
    #[default]
    DistinctPoints,
    /// Only pairs that differ in every coordinate.
    ///
    /// Drops distinct points sharing an x or y value. Kept for parity with
    /// scores computed by the older coordinate-comparison filter.
    DistinctCoordinates,
}

impl PairExclusion {
    fn admits<F: Float>(self, a: &DataPoint<ClassId, F>, b: &DataPoint<ClassId, F>) -> bool {
        match self {
            PairExclusion::DistinctPoints => true,
            PairExclusion::DistinctCoordinates => Zip::from(&a.features)
                .and(&b.features)
                .all(|x, y| x != y),
        }
    }
}

/// Every mean behind an informativeness score.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparabilityReport<F> {
    /// Intra-class mean distance, indexed by class id.
    pub intraclass: Vec<F>,
    /// Inter-class mean distance for every ordered pair of different classes.
    pub interclass: Vec<((ClassId, ClassId), F)>,
    pub mean_intraclass: F,
    pub mean_interclass: F,
    pub informativeness: F,
}

/// Computes pairwise-distance statistics over a borrowed dataset.
#[derive(Debug, Clone)]
pub struct SeparabilityAnalyzer<'a, F, D>
where
    F: Float,
    D: Distance<F>,
{
    dataset: &'a Dataset<F>,
    distance: D,
    exclusion: PairExclusion,
}

impl<'a, F, D> SeparabilityAnalyzer<'a, F, D>
where
    F: Float,
    D: Distance<F>,
{
    pub fn new(dataset: &'a Dataset<F>, distance: D) -> Self {
        Self {
            dataset,
            distance,
            exclusion: PairExclusion::default(),
        }
    }

    pub fn with_pair_exclusion(mut self, exclusion: PairExclusion) -> Self {
        self.exclusion = exclusion;
        self
    }

    pub fn pair_exclusion(&self) -> PairExclusion {
        self.exclusion
    }

    /// Mean distance between points of `class`.
    ///
    /// Averages over unordered qualifying pairs, which equals the mean over
    /// both orderings since the metric is symmetric.
    ///
    /// # Errors
    ///
    /// `UnknownClass` for an out-of-range id, `UndefinedMean(Intraclass)` when
    /// no pair qualifies (in particular for classes with fewer than two points).
    pub fn intraclass_mean(&self, class: ClassId) -> Result<F, SeparabilityError> {
        self.check_class(class)?;
        let members: Vec<&DataPoint<ClassId, F>> = self.dataset.class_points(class).collect();

        let mut sum = F::zero();
        let mut pairs = 0usize;
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if self.exclusion.admits(a, b) {
                    sum += self.measure(a, b)?;
                    pairs += 1;
                }
            }
        }

        if pairs == 0 {
            return Err(SeparabilityError::UndefinedMean(MeanScope::Intraclass(class)));
        }
        Ok(sum / F::from_count(pairs))
    }

    /// Mean distance over the full cross product of `first` and `second`.
    ///
    /// # Errors
    ///
    /// `UnknownClass`, `SameClassPair` when both ids are equal, and
    /// `UndefinedMean(Interclass)` when either class is empty.
    pub fn interclass_mean(&self, first: ClassId, second: ClassId) -> Result<F, SeparabilityError> {
        self.check_class(first)?;
        self.check_class(second)?;
        if first == second {
            return Err(SeparabilityError::SameClassPair(first));
        }

        let mut sum = F::zero();
        let mut pairs = 0usize;
        for a in self.dataset.class_points(first) {
            for b in self.dataset.class_points(second) {
                sum += self.measure(a, b)?;
                pairs += 1;
            }
        }

        if pairs == 0 {
            return Err(SeparabilityError::UndefinedMean(MeanScope::Interclass(
                first, second,
            )));
        }
        Ok(sum / F::from_count(pairs))
    }

    /// Ratio of mean inter-class distance to mean intra-class distance.
    pub fn informativeness(&self) -> Result<F, SeparabilityError> {
        self.report().map(|report| report.informativeness)
    }

    /// Computes every per-class and per-pair mean along with the final ratio.
    ///
    /// # Errors
    ///
    /// `UndefinedMean(FewerThanTwoClasses)` for a single-class dataset, any
    /// error from the individual means, and `DivisionByZero` when the mean
    /// intra-class distance is zero.
    pub fn report(&self) -> Result<SeparabilityReport<F>, SeparabilityError> {
        let classes_count = self.dataset.classes_count();
        if classes_count < 2 {
            return Err(SeparabilityError::UndefinedMean(
                MeanScope::FewerThanTwoClasses,
            ));
        }

        let intraclass = (0..classes_count)
            .map(|class| self.intraclass_mean(class))
            .collect::<Result<Vec<F>, _>>()?;

        let mut interclass = Vec::with_capacity(classes_count * (classes_count - 1));
        for first in 0..classes_count {
            for second in (0..classes_count).filter(|&second| second != first) {
                interclass.push(((first, second), self.interclass_mean(first, second)?));
            }
        }

        let mean_intraclass =
            intraclass.iter().copied().sum::<F>() / F::from_count(intraclass.len());
        let mean_interclass = interclass.iter().map(|&(_, mean)| mean).sum::<F>()
            / F::from_count(interclass.len());
        debug!(?mean_intraclass, ?mean_interclass, "separability means");

        if mean_intraclass == F::zero() {
            return Err(SeparabilityError::DivisionByZero);
        }

        Ok(SeparabilityReport {
            intraclass,
            interclass,
            mean_intraclass,
            mean_interclass,
            informativeness: mean_interclass / mean_intraclass,
        })
    }

    fn check_class(&self, class: ClassId) -> Result<(), SeparabilityError> {
        let classes_count = self.dataset.classes_count();
        if class >= classes_count {
            return Err(SeparabilityError::UnknownClass {
                class,
                classes_count,
            });
        }
        Ok(())
    }

    fn measure(
        &self,
        a: &DataPoint<ClassId, F>,
        b: &DataPoint<ClassId, F>,
    ) -> Result<F, SeparabilityError> {
        let d = self.distance.distance(a.features.view(), b.features.view());
        if d.is_nan() {
            return Err(SeparabilityError::InvalidDistance);
        }
        Ok(d)
    }
}
