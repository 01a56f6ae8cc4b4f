//! Prediction scoring

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::EvalExample;

use super::Predictions;

/// Aggregate scores, percentages in `0..=100`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub exact: f64,
    pub total: usize,
    pub has_ans_exact: f64,
    pub has_ans_total: usize,
    pub no_ans_exact: f64,
    pub no_ans_total: usize,
}

/// Metric over a prediction set
pub trait PredictionScorer: Send + Sync {
    /// Score predictions against the examples' gold answers
    ///
    /// A question missing from `predictions` counts as the empty prediction.
    fn score(&self, examples: &[EvalExample], predictions: &Predictions) -> Result<Scores>;

    /// Metric name for logging
    fn name(&self) -> &str;
}

/// Case-insensitive, whitespace-trimmed exact match
///
/// Unanswerable questions match only the empty prediction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatchScorer;

impl ExactMatchScorer {
    fn matches(example: &EvalExample, prediction: &str) -> bool {
        let prediction = prediction.trim().to_lowercase();
        if example.answers.is_empty() {
            return prediction.is_empty();
        }
        example
            .answers
            .iter()
            .any(|gold| gold.trim().to_lowercase() == prediction)
    }
}

fn percent(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * hits as f64 / total as f64
    }
}

impl PredictionScorer for ExactMatchScorer {
    fn score(&self, examples: &[EvalExample], predictions: &Predictions) -> Result<Scores> {
        let (mut has_hits, mut has_total, mut no_hits, mut no_total) = (0, 0, 0, 0);

        for example in examples {
            let prediction = predictions
                .get(&example.qas_id)
                .map(String::as_str)
                .unwrap_or("");
            let hit = Self::matches(example, prediction);

            if example.answers.is_empty() {
                no_total += 1;
                no_hits += usize::from(hit);
            } else {
                has_total += 1;
                has_hits += usize::from(hit);
            }
        }

        Ok(Scores {
            exact: percent(has_hits + no_hits, has_total + no_total),
            total: has_total + no_total,
            has_ans_exact: percent(has_hits, has_total),
            has_ans_total: has_total,
            no_ans_exact: percent(no_hits, no_total),
            no_ans_total: no_total,
        })
    }

    fn name(&self) -> &str {
        "exact_match"
    }
}
