//! Trait profile computation — Likert answers in, normalized RIASEC scores out.
//!
//! This path never fails. Unknown question ids are skipped with a warning,
//! unmatched labels fall back to the neutral level, and an empty answer set
//! degenerates to the all-50 profile.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assessment::likert::resolve_level;
use crate::assessment::questions::dimension_for;
use crate::assessment::Dimension;

/// A single answer: the UI sends either one Likert label or an array of
/// labels (multi-select widgets). Only the first element of an array counts.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    One(String),
    Many(Vec<String>),
}

impl AnswerValue {
    pub fn first_label(&self) -> &str {
        match self {
            AnswerValue::One(label) => label,
            AnswerValue::Many(labels) => labels.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// A dimension with its normalized score, in ranking order.
#[derive(Debug, Clone, Serialize)]
pub struct RankedDimension {
    pub dimension: Dimension,
    pub score: f64,
}

/// The computed trait profile for one completed assessment.
#[derive(Debug, Clone, Serialize)]
pub struct TraitProfile {
    /// Min-max normalized scores in [0, 100], one per dimension.
    pub scores: BTreeMap<Dimension, f64>,
    /// The three highest-ranked dimension letters, concatenated.
    pub top3: String,
    /// All six dimensions sorted by descending raw mean.
    pub ordered: Vec<RankedDimension>,
}

/// Converts raw answers into a trait profile.
///
/// Ranking uses the raw pre-normalization means: normalization maps the
/// minimum to 0 and the maximum to 100, so sorting the normalized scores
/// would lose distinctions that ties in normalized space introduce. Equal
/// raw means keep the canonical R-I-A-S-E-C order (stable sort over
/// `Dimension::ALL`).
pub fn compute_profile(answers: &HashMap<u32, AnswerValue>) -> TraitProfile {
    let mut sums: BTreeMap<Dimension, f64> = BTreeMap::new();
    let mut counts: BTreeMap<Dimension, u32> = BTreeMap::new();

    // Iterate in question-id order so floating-point accumulation is
    // identical for identical inputs regardless of map iteration order.
    let mut question_ids: Vec<u32> = answers.keys().copied().collect();
    question_ids.sort_unstable();

    for question_id in question_ids {
        let Some(dimension) = dimension_for(question_id) else {
            warn!(question_id, "skipping answer for unknown question id");
            continue;
        };
        let label = match answers.get(&question_id) {
            Some(answer) => answer.first_label(),
            None => continue,
        };
        let level = resolve_level(label);
        *sums.entry(dimension).or_insert(0.0) += f64::from(level);
        *counts.entry(dimension).or_insert(0) += 1;
    }

    // Raw per-dimension means; dimensions without answers stay at 0.
    let means: Vec<(Dimension, f64)> = Dimension::ALL
        .iter()
        .map(|&dim| {
            let count = counts.get(&dim).copied().unwrap_or(0);
            let mean = if count > 0 {
                sums.get(&dim).copied().unwrap_or(0.0) / f64::from(count)
            } else {
                0.0
            };
            (dim, mean)
        })
        .collect();

    let min = means.iter().map(|(_, m)| *m).fold(f64::INFINITY, f64::min);
    let max = means
        .iter()
        .map(|(_, m)| *m)
        .fold(f64::NEG_INFINITY, f64::max);

    let normalize = |mean: f64| -> f64 {
        if (max - min).abs() < f64::EPSILON {
            50.0
        } else {
            100.0 * (mean - min) / (max - min)
        }
    };

    let scores: BTreeMap<Dimension, f64> = means
        .iter()
        .map(|&(dim, mean)| (dim, normalize(mean)))
        .collect();

    // Stable sort keeps canonical order for equal raw means.
    let mut ranked = means;
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let ordered: Vec<RankedDimension> = ranked
        .iter()
        .map(|&(dim, _)| RankedDimension {
            dimension: dim,
            score: scores.get(&dim).copied().unwrap_or(0.0),
        })
        .collect();

    let top3: String = ordered
        .iter()
        .take(3)
        .map(|r| r.dimension.letter())
        .collect();

    TraitProfile {
        scores,
        top3,
        ordered,
    }
}
