use std::fmt::{Display, Formatter};

use clap::ValueEnum;
use gknn::{Dataset, Distance, L1Dist, L2Dist, LInfDist};
use k_nn::{KnnClassifier, KnnError, MajorityVote, NearestNeighbor, WeightedVote};
use ndarray::array;
use separability::{SeparabilityAnalyzer, SeparabilityError, SeparabilityReport};

use crate::app::Settings;

/// Metric shared by the separability score and all three rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DistanceMetric {
    L1,
    L2,
    #[value(name = "linf")]
    LInf,
}

impl Display for DistanceMetric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceMetric::L1 => write!(f, "L1 (Manhattan)"),
            DistanceMetric::L2 => write!(f, "L2 (Euclidean)"),
            DistanceMetric::LInf => write!(f, "L-Infinity"),
        }
    }
}

/// Outcome of every computation in one report. Each part fails independently.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub separability: Result<SeparabilityReport<f64>, SeparabilityError>,
    pub nearest: Result<NearestNeighbor<f64>, KnnError>,
    pub majority: Result<MajorityVote, KnnError>,
    pub weighted: Result<WeightedVote<f64>, KnnError>,
}

pub fn evaluate(dataset: &Dataset<f64>, query: (f64, f64), settings: &Settings) -> Evaluation {
    match settings.metric {
        DistanceMetric::L1 => evaluate_with(dataset, query, settings, L1Dist),
        DistanceMetric::L2 => evaluate_with(dataset, query, settings, L2Dist),
        DistanceMetric::LInf => evaluate_with(dataset, query, settings, LInfDist),
    }
}

fn evaluate_with<D: Distance<f64>>(
    dataset: &Dataset<f64>,
    query: (f64, f64),
    settings: &Settings,
    distance: D,
) -> Evaluation {
    let separability = SeparabilityAnalyzer::new(dataset, distance.clone())
        .with_pair_exclusion(settings.pair_exclusion)
        .report();

    let features = array![query.0, query.1];
    // Nearest-neighbor does not depend on k.
    let nearest = KnnClassifier::new(1, dataset, distance.clone())
        .and_then(|c| c.nearest_neighbor(features.view()));

    let classifier = KnnClassifier::new(settings.k, dataset, distance)
        .map(|c| c.with_oversized_k(settings.oversized_k));
    let (majority, weighted) = match &classifier {
        Ok(c) => (
            c.k_nearest_neighbor(features.view()),
            c.weighted_k_nearest_neighbor(features.view()),
        ),
        Err(e) => (Err(e.clone()), Err(e.clone())),
    };

    Evaluation {
        separability,
        nearest,
        majority,
        weighted,
    }
}
