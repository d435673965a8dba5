//! Text and JSON rendering of a report. Class ids become display names here only.

use std::fmt::Write;

use gknn::{ClassId, Dataset};
use serde::Serialize;

use crate::app::{AppError, Run};

const CLASS_NAMES: [&str; 10] = [
    "red", "green", "blue", "orange", "purple", "cyan", "magenta", "yellow", "brown", "gray",
];

const DIVIDER_WIDTH: usize = 70;

/// Display name for a class id; ids past the palette fall back to `class N`.
pub fn class_name(class: ClassId) -> String {
    CLASS_NAMES
        .get(class)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("class {}", class))
}

pub fn render_text(run: &Run) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    write_text(&mut out, run)?;
    Ok(out)
}

fn write_text(out: &mut String, run: &Run) -> std::fmt::Result {
    let divider = "-".repeat(DIVIDER_WIDTH);
    let eval = &run.evaluation;

    writeln!(out, "{}", divider)?;
    writeln!(
        out,
        "Point cloud: {} classes x {} points (seed {})",
        run.dataset.classes_count(),
        run.dataset.len() / run.dataset.classes_count().max(1),
        run.seed
    )?;
    writeln!(out, "Metric: {}", run.settings.metric)?;

    writeln!(out, "{}", divider)?;
    match &eval.separability {
        Ok(report) => {
            writeln!(out, "Feature space informativeness: {}", report.informativeness)?;
            writeln!(
                out,
                "Mean intra-class distance: {}, mean inter-class distance: {}",
                report.mean_intraclass, report.mean_interclass
            )?;
        }
        Err(e) => {
            writeln!(out, "Feature space informativeness is undefined: {}", e)?;
        }
    }

    writeln!(out, "{}", divider)?;
    writeln!(out, "Query point: X: {}, Y: {}", run.query.0, run.query.1)?;

    writeln!(out, "{}", divider)?;
    writeln!(out, "Nearest neighbor, k = 1")?;
    match &eval.nearest {
        Ok(nn) => {
            writeln!(out, "Distance to the nearest point: {}", nn.distance)?;
            writeln!(out, "Assigned class: {}", class_name(nn.label))?;
        }
        Err(e) => {
            writeln!(out, "Classification failed: {}", e)?;
        }
    }

    writeln!(out, "{}", divider)?;
    writeln!(out, "k nearest neighbors, k = {}", run.settings.k)?;
    match &eval.majority {
        Ok(vote) => {
            writeln!(
                out,
                "{} of the neighbors belong to class {}",
                vote.count,
                class_name(vote.label)
            )?;
            writeln!(out, "Assigned class: {}", class_name(vote.label))?;
        }
        Err(e) => {
            writeln!(out, "Classification failed: {}", e)?;
        }
    }

    writeln!(out, "{}", divider)?;
    writeln!(out, "Weighted k nearest neighbors, k = {}", run.settings.k)?;
    match &eval.weighted {
        Ok(vote) => {
            writeln!(
                out,
                "Largest weight {} belongs to class {}",
                vote.weight,
                class_name(vote.label)
            )?;
            writeln!(out, "Assigned class: {}", class_name(vote.label))?;
        }
        Err(e) => {
            writeln!(out, "Classification failed: {}", e)?;
        }
    }
    writeln!(out, "{}", divider)
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    seed: u64,
    metric: String,
    k: usize,
    query: [f64; 2],
    dataset: &'a Dataset<f64>,
    separability: JsonSeparability,
    nearest_neighbor: JsonVerdict,
    k_nearest_neighbor: JsonVerdict,
    weighted_k_nearest_neighbor: JsonVerdict,
}

#[derive(Debug, Default, Serialize)]
struct JsonSeparability {
    informativeness: Option<f64>,
    intraclass: Vec<f64>,
    mean_intraclass: Option<f64>,
    mean_interclass: Option<f64>,
    error: Option<String>,
}

/// `score` is a distance, a vote count or a summed weight depending on the rule.
/// An infinite weight serializes as `null` with `coincident` set.
#[derive(Debug, Default, Serialize)]
struct JsonVerdict {
    score: Option<f64>,
    coincident: bool,
    label: Option<ClassId>,
    class_name: Option<String>,
    error: Option<String>,
}

impl JsonVerdict {
    fn scored(score: f64, label: ClassId) -> Self {
        Self {
            score: score.is_finite().then_some(score),
            coincident: score.is_infinite(),
            label: Some(label),
            class_name: Some(class_name(label)),
            error: None,
        }
    }

    fn failed(error: &dyn std::error::Error) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

pub fn render_json(run: &Run) -> Result<String, AppError> {
    let eval = &run.evaluation;
    let separability = match &eval.separability {
        Ok(report) => JsonSeparability {
            informativeness: Some(report.informativeness),
            intraclass: report.intraclass.clone(),
            mean_intraclass: Some(report.mean_intraclass),
            mean_interclass: Some(report.mean_interclass),
            error: None,
        },
        Err(e) => JsonSeparability {
            error: Some(e.to_string()),
            ..JsonSeparability::default()
        },
    };

    let report = JsonReport {
        seed: run.seed,
        metric: run.settings.metric.to_string(),
        k: run.settings.k,
        query: [run.query.0, run.query.1],
        dataset: &run.dataset,
        separability,
        nearest_neighbor: match &eval.nearest {
            Ok(nn) => JsonVerdict::scored(nn.distance, nn.label),
            Err(e) => JsonVerdict::failed(e),
        },
        k_nearest_neighbor: match &eval.majority {
            Ok(vote) => JsonVerdict::scored(vote.count as f64, vote.label),
            Err(e) => JsonVerdict::failed(e),
        },
        weighted_k_nearest_neighbor: match &eval.weighted {
            Ok(vote) => JsonVerdict::scored(vote.weight, vote.label),
            Err(e) => JsonVerdict::failed(e),
        },
    };

    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}
