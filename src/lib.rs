//! Gaussian point clouds, separability scores and distance-based classifiers.
//!
//! ```
//! use gknn::{generate_with_seed, L2Dist};
//! use gknn::k_nn::KnnClassifier;
//! use gknn::separability::SeparabilityAnalyzer;
//! use ndarray::array;
//!
//! let cloud = generate_with_seed(3, 40, 7).unwrap();
//! let score = SeparabilityAnalyzer::new(&cloud, L2Dist).informativeness().unwrap();
//! assert!(score > 0.0);
//!
//! let classifier = KnnClassifier::new(7, &cloud, L2Dist).unwrap();
//! let vote = classifier.k_nearest_neighbor(array![2.5, 2.5].view()).unwrap();
//! assert!(vote.label < 3);
//! ```

pub use gknn_helpers::*;
pub use k_nn;
pub use separability;
