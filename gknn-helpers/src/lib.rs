use ndarray::{NdFloat, ScalarOperand};

use num_traits::{AsPrimitive, FromPrimitive, NumCast, Signed};
use rand::distr::uniform::SampleUniform;

use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

// Include submodules
mod common;
mod dataset;
mod distance;
pub mod generator;

// Re-export types from submodules
pub use common::DataPoint;
pub use dataset::{ClassId, Dataset, DatasetError};
pub use distance::{Distance, L1Dist, L2Dist, LInfDist, LpDist};
pub use generator::{generate, generate_around, generate_with_params, generate_with_seed, CloudParams};

pub trait Float:
    NdFloat
    + FromPrimitive
    + Default
    + Signed
    + Sum
    + AsPrimitive<usize>
    + for<'a> AddAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> DivAssign<&'a Self>
    + num_traits::MulAdd<Output = Self>
    + SampleUniform
    + ScalarOperand
    + std::marker::Unpin
{
    fn cast<T: NumCast>(x: T) -> Option<Self> {
        NumCast::from(x)
    }

    /// Converts an element count into the float domain, saturating on overflow.
    fn from_count(count: usize) -> Self {
        <Self as NumCast>::from(count).unwrap_or_else(Self::max_value)
    }
}

impl Float for f32 {}

impl Float for f64 {}
