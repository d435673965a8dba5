//! Synthetic Gaussian point clouds, one isotropic cluster per class.
//!
//! Points are appended class by class (all of class 0, then class 1, ...).
//! That order carries no meaning by itself but it fixes how classifiers
//! break distance ties, so it is part of the output contract.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

use crate::{ClassId, DataPoint, Dataset, DatasetError};

/// Shape parameters of a generated cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudParams {
    /// Cluster centres are drawn uniformly from `[0, center_extent)` on each axis.
    pub center_extent: f64,
    /// Standard deviation of every coordinate around its centre.
    pub spread: f64,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            center_extent: 5.0,
            spread: 0.5,
        }
    }
}

/// Generates `classes_count` clusters of `elements_per_class` points with default parameters.
pub fn generate<R: Rng + ?Sized>(
    classes_count: usize,
    elements_per_class: usize,
    rng: &mut R,
) -> Result<Dataset<f64>, DatasetError> {
    generate_with_params(classes_count, elements_per_class, CloudParams::default(), rng)
}

/// Same as [`generate`], driven by a `Xoshiro256PlusPlus` seeded from `seed`.
pub fn generate_with_seed(
    classes_count: usize,
    elements_per_class: usize,
    seed: u64,
) -> Result<Dataset<f64>, DatasetError> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    generate(classes_count, elements_per_class, &mut rng)
}

/// Generates a cloud with explicit shape parameters.
///
/// # Errors
///
/// Returns `DatasetError::InvalidParameter` if either count is zero, the
/// extent is not a positive finite number, or the spread is negative or not finite.
pub fn generate_with_params<R: Rng + ?Sized>(
    classes_count: usize,
    elements_per_class: usize,
    params: CloudParams,
    rng: &mut R,
) -> Result<Dataset<f64>, DatasetError> {
    if classes_count == 0 {
        return Err(DatasetError::InvalidParameter(
            "classes_count must be at least 1",
        ));
    }
    if !(params.center_extent.is_finite() && params.center_extent > 0.0) {
        return Err(DatasetError::InvalidParameter(
            "center_extent must be a positive finite number",
        ));
    }

    let normal = zero_mean_normal(params.spread)?;
    let total = total_points(classes_count, elements_per_class)?;

    let mut points = Vec::with_capacity(total);
    for class in 0..classes_count {
        // Centre first, then its samples.
        let center = (
            rng.random::<f64>() * params.center_extent,
            rng.random::<f64>() * params.center_extent,
        );
        sample_cluster(class, center, elements_per_class, &normal, rng, &mut points);
    }
    Dataset::new(points, classes_count)
}

/// Generates one cluster per supplied centre, class `i` around `centers[i]`.
///
/// # Errors
///
/// Returns `DatasetError::InvalidParameter` if `centers` is empty,
/// `elements_per_class` is zero, or `spread` is negative or not finite.
pub fn generate_around<R: Rng + ?Sized>(
    centers: &[(f64, f64)],
    elements_per_class: usize,
    spread: f64,
    rng: &mut R,
) -> Result<Dataset<f64>, DatasetError> {
    if centers.is_empty() {
        return Err(DatasetError::InvalidParameter(
            "at least one cluster centre is required",
        ));
    }
    let normal = zero_mean_normal(spread)?;
    let total = total_points(centers.len(), elements_per_class)?;

    let mut points = Vec::with_capacity(total);
    for (class, &center) in centers.iter().enumerate() {
        sample_cluster(class, center, elements_per_class, &normal, rng, &mut points);
    }
    Dataset::new(points, centers.len())
}

fn total_points(classes_count: usize, elements_per_class: usize) -> Result<usize, DatasetError> {
    if elements_per_class == 0 {
        return Err(DatasetError::InvalidParameter(
            "elements_per_class must be at least 1",
        ));
    }
    classes_count
        .checked_mul(elements_per_class)
        .ok_or(DatasetError::InvalidParameter(
            "classes_count * elements_per_class overflows",
        ))
}

fn zero_mean_normal(spread: f64) -> Result<Normal<f64>, DatasetError> {
    if !spread.is_finite() {
        return Err(DatasetError::InvalidParameter("spread must be finite"));
    }
    if spread < 0.0 {
        return Err(DatasetError::InvalidParameter("spread must not be negative"));
    }
    Normal::new(0.0, spread)
        .map_err(|_| DatasetError::InvalidParameter("spread must be a valid standard deviation"))
}

fn sample_cluster<R: Rng + ?Sized>(
    class: ClassId,
    (cx, cy): (f64, f64),
    count: usize,
    normal: &Normal<f64>,
    rng: &mut R,
    out: &mut Vec<DataPoint<ClassId, f64>>,
) {
    debug!(class, cx, cy, count, "sampling gaussian cluster");
    for _ in 0..count {
        let x = cx + normal.sample(rng);
        let y = cy + normal.sample(rng);
        out.push(DataPoint::planar(x, y, class));
    }
}
