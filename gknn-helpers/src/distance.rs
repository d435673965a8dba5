use ndarray::{ArrayView1, Zip};

use crate::Float;

/// A distance function over feature vectors.
///
/// Implementations must be symmetric and return zero for identical inputs.
/// Both views must have the same length; mismatched lengths panic inside
/// `ndarray::Zip`, so callers validate dimensions up front (see `Dataset::new`).
pub trait Distance<F: Float>: Clone + Send + Sync {
    /// Computes the distance between two points.
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F;

    /// A cheaper monotone proxy for `distance`, suitable for ordering only.
    ///
    /// Defaults to the true distance.
    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.distance(a, b)
    }

    /// Converts a reduced distance back into a true distance.
    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist
    }

    /// Converts a true distance into its reduced form.
    fn dist_to_rdist(&self, dist: F) -> F {
        dist
    }
}

/// Largest absolute coordinate difference. NaN wins over any number.
fn max_abs_diff<F: Float>(a: ArrayView1<F>, b: ArrayView1<F>) -> F {
    Zip::from(&a).and(&b).fold(F::zero(), |acc, &x, &y| {
        let d = (x - y).abs();
        if d.is_nan() || d > acc { d } else { acc }
    })
}

/// Manhattan distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct L1Dist;

impl<F: Float> Distance<F> for L1Dist {
    #[inline]
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        Zip::from(&a)
            .and(&b)
            .fold(F::zero(), |acc, &x, &y| acc + (x - y).abs())
    }
}

/// Euclidean distance. The reduced distance is the squared distance.
///
/// `distance` scales by the largest coordinate difference, like `hypot`, so
/// it neither underflows to zero nor overflows for extreme but finite inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct L2Dist;

impl<F: Float> Distance<F> for L2Dist {
    #[inline]
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        let scale = max_abs_diff(a, b);
        if scale.is_nan() || scale.is_infinite() || scale == F::zero() {
            return scale;
        }
        let sum = Zip::from(&a).and(&b).fold(F::zero(), |acc, &x, &y| {
            let d = (x - y) / scale;
            acc + d * d
        });
        scale * sum.sqrt()
    }

    #[inline]
    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        Zip::from(&a).and(&b).fold(F::zero(), |acc, &x, &y| {
            let d = x - y;
            acc + d * d
        })
    }

    #[inline]
    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist.sqrt()
    }

    #[inline]
    fn dist_to_rdist(&self, dist: F) -> F {
        dist * dist
    }
}

/// Chebyshev distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LInfDist;

impl<F: Float> Distance<F> for LInfDist {
    #[inline]
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        max_abs_diff(a, b)
    }
}

/// Minkowski distance of order `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpDist<F: Float>(pub F);

impl<F: Float> LpDist<F> {
    pub fn new(p: F) -> Self {
        LpDist(p)
    }
}

impl<F: Float> Distance<F> for LpDist<F> {
    #[inline]
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.rdistance(a, b).powf(F::one() / self.0)
    }

    #[inline]
    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        Zip::from(&a)
            .and(&b)
            .fold(F::zero(), |acc, &x, &y| acc + (x - y).abs().powf(self.0))
    }

    #[inline]
    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist.powf(F::one() / self.0)
    }

    #[inline]
    fn dist_to_rdist(&self, dist: F) -> F {
        dist.powf(self.0)
    }
}
