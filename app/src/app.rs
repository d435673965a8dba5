use std::error::Error;
use std::fmt::{Display, Formatter};

use clap::Parser;
use gknn::{generate_with_seed, CloudParams, Dataset, DatasetError};
use k_nn::OversizedK;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use separability::PairExclusion;
use tracing::info;

use crate::classifier::{self, DistanceMetric, Evaluation};
use crate::ui;

/// Generate a labeled Gaussian point cloud, score its separability and
/// classify a query point with nearest-neighbor, k-NN and weighted k-NN.
#[derive(Parser, Debug, Clone)]
#[command(name = "gknn-report")]
#[command(version)]
#[command(about = "Separability and k-NN report for a synthetic Gaussian point cloud")]
pub struct Cli {
    /// Number of classes (one Gaussian cluster each)
    #[arg(long, default_value_t = 3)]
    pub classes: usize,

    /// Points generated per class
    #[arg(long, default_value_t = 40)]
    pub elements: usize,

    /// Neighbors consulted by the k-based rules
    #[arg(short = 'k', long = "neighbors", default_value_t = 7)]
    pub k: usize,

    /// Query point; drawn uniformly from the centre extent when omitted
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub query: Option<Vec<f64>>,

    /// Seed for cloud generation; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Distance metric used by every rule
    #[arg(long, value_enum, default_value_t = DistanceMetric::L2)]
    pub metric: DistanceMetric,

    /// Fail instead of clamping when k exceeds the number of points
    #[arg(long)]
    pub strict_k: bool,

    /// Only count intra-class pairs that differ in every coordinate
    #[arg(long)]
    pub legacy_pairs: bool,

    /// Emit the dataset and results as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Algorithm settings derived from the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub k: usize,
    pub metric: DistanceMetric,
    pub oversized_k: OversizedK,
    pub pair_exclusion: PairExclusion,
}

impl From<&Cli> for Settings {
    fn from(cli: &Cli) -> Self {
        Self {
            k: cli.k,
            metric: cli.metric,
            oversized_k: if cli.strict_k {
                OversizedK::Reject
            } else {
                OversizedK::Clamp
            },
            pair_exclusion: if cli.legacy_pairs {
                PairExclusion::DistinctCoordinates
            } else {
                PairExclusion::DistinctPoints
            },
        }
    }
}

/// Everything one report is rendered from.
#[derive(Debug, Clone)]
pub struct Run {
    pub seed: u64,
    pub settings: Settings,
    pub dataset: Dataset<f64>,
    pub query: (f64, f64),
    pub evaluation: Evaluation,
}

/// Errors that abort the report.
///
/// Classifier and separability failures are not here: they are rendered
/// into the report as messages.
#[derive(Debug)]
pub enum AppError {
    Dataset(DatasetError),
    InvalidQuery(usize),
    Format(std::fmt::Error),
    Json(serde_json::Error),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Dataset(e) => write!(f, "Could not generate the point cloud: {}", e),
            AppError::InvalidQuery(n) => {
                write!(f, "Query needs exactly two coordinates, got {}", n)
            }
            AppError::Format(e) => write!(f, "Could not format the report: {}", e),
            AppError::Json(e) => write!(f, "Could not serialize the report: {}", e),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Dataset(e) => Some(e),
            AppError::InvalidQuery(_) => None,
            AppError::Format(e) => Some(e),
            AppError::Json(e) => Some(e),
        }
    }
}

impl From<DatasetError> for AppError {
    fn from(e: DatasetError) -> Self {
        AppError::Dataset(e)
    }
}

impl From<std::fmt::Error> for AppError {
    fn from(e: std::fmt::Error) -> Self {
        AppError::Format(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e)
    }
}

/// Generates the cloud, evaluates every rule and renders the report.
pub fn run(cli: &Cli) -> Result<String, AppError> {
    let run = prepare(cli)?;
    if cli.json {
        ui::render_json(&run)
    } else {
        Ok(ui::render_text(&run)?)
    }
}

pub fn prepare(cli: &Cli) -> Result<Run, AppError> {
    let seed = cli.seed.unwrap_or_else(rand::random);
    let settings = Settings::from(cli);
    info!(seed, classes = cli.classes, elements = cli.elements, "generating point cloud");

    let dataset = generate_with_seed(cli.classes, cli.elements, seed)?;
    let query = match cli.query.as_deref() {
        Some(&[x, y]) => (x, y),
        Some(other) => return Err(AppError::InvalidQuery(other.len())),
        None => random_query(seed),
    };
    info!(x = query.0, y = query.1, k = settings.k, metric = %settings.metric, "classifying query");

    let evaluation = classifier::evaluate(&dataset, query, &settings);
    Ok(Run {
        seed,
        settings,
        dataset,
        query,
        evaluation,
    })
}

/// Draws the query from its own generator so the cloud's random stream is untouched.
fn random_query(seed: u64) -> (f64, f64) {
    let extent = CloudParams::default().center_extent;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(1));
    (rng.random::<f64>() * extent, rng.random::<f64>() * extent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["gknn-report"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_match_demo_run() {
        let cli = parse(&[]);
        assert_eq!(cli.classes, 3);
        assert_eq!(cli.elements, 40);
        assert_eq!(cli.k, 7);
        assert_eq!(cli.metric, DistanceMetric::L2);
        assert!(cli.query.is_none());
        let settings = Settings::from(&cli);
        assert_eq!(settings.oversized_k, OversizedK::Clamp);
        assert_eq!(settings.pair_exclusion, PairExclusion::DistinctPoints);
    }

    #[test]
    fn test_parse_flags() {
        let cli = parse(&[
            "--classes", "2", "--elements", "5", "-k", "3", "--query", "-1.5", "2.0", "--seed",
            "9", "--metric", "l1", "--strict-k", "--legacy-pairs", "-vv",
        ]);
        assert_eq!(cli.query, Some(vec![-1.5, 2.0]));
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.metric, DistanceMetric::L1);
        assert_eq!(cli.verbose, 2);
        let settings = Settings::from(&cli);
        assert_eq!(settings.k, 3);
        assert_eq!(settings.oversized_k, OversizedK::Reject);
        assert_eq!(settings.pair_exclusion, PairExclusion::DistinctCoordinates);
    }

    #[test]
    fn test_query_needs_two_values() {
        let argv = ["gknn-report", "--query", "1.0"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_prepare_is_deterministic_for_a_seed() {
        let cli = parse(&["--seed", "123"]);
        let a = prepare(&cli).unwrap();
        let b = prepare(&cli).unwrap();
        assert_eq!(a.dataset, b.dataset);
        assert_eq!(a.query, b.query);
        assert_eq!(a.dataset.len(), 120);
        assert!((0.0..5.0).contains(&a.query.0));
        assert!((0.0..5.0).contains(&a.query.1));
    }

    #[test]
    fn test_run_renders_text_report() {
        let cli = parse(&["--seed", "2", "--classes", "2", "--elements", "4", "-k", "3"]);
        let report = run(&cli).unwrap();
        assert!(report.starts_with(&"-".repeat(70)));
        assert!(report.contains("Point cloud: 2 classes x 4 points (seed 2)"));
        assert_eq!(report.matches("Assigned class:").count(), 3);
    }

    #[test]
    fn test_zero_classes_is_fatal() {
        let cli = parse(&["--classes", "0", "--seed", "1"]);
        assert!(matches!(run(&cli), Err(AppError::Dataset(_))));
    }
}
