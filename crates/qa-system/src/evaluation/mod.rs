//! Batch evaluation of the end-to-end pipeline
//!
//! Runs every labeled question through the pipeline, persists the top answer
//! per question (and the full answer lists for inspection), then hands the
//! predictions to a [`PredictionScorer`].

pub mod scorer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::pipeline::QaSystem;
use crate::types::{Answer, EvalExample};

pub use scorer::{ExactMatchScorer, PredictionScorer, Scores};

/// Top answer text per question id
pub type Predictions = BTreeMap<String, String>;

/// Full answer list per question id
pub type MetaPredictions = BTreeMap<String, Vec<Answer>>;

/// Outcome of an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub scores: Scores,
    pub predictions_path: PathBuf,
    /// Absent when predictions were loaded from an earlier run
    pub meta_path: Option<PathBuf>,
    /// Predictions came from an existing file instead of fresh queries
    pub reused_predictions: bool,
    pub generated_at: DateTime<Utc>,
}

/// Where an evaluation run keeps its prediction files
#[derive(Debug, Clone)]
pub struct Evaluation {
    output_dir: PathBuf,
    filename: String,
}

impl Evaluation {
    pub fn new(output_dir: impl AsRef<Path>, filename: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            filename: filename.into(),
        }
    }

    /// Path of the prediction file
    pub fn predictions_path(&self) -> PathBuf {
        self.output_dir.join(&self.filename)
    }

    /// Path of the meta prediction file: `<stem>_meta.json`
    pub fn meta_path(&self) -> PathBuf {
        let path = self.predictions_path();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "predictions".to_string());
        path.with_file_name(format!("{}_meta.json", stem))
    }

    /// Run (or reuse) predictions and score them
    ///
    /// `on_progress` is called with the number of questions answered so far.
    /// A failed query aborts the run before anything is written.
    pub async fn run<F>(
        &self,
        qa: &QaSystem,
        examples: &[EvalExample],
        scorer: &dyn PredictionScorer,
        mut on_progress: F,
    ) -> Result<EvalReport>
    where
        F: FnMut(usize),
    {
        if examples.is_empty() {
            return Err(Error::evaluation("no examples to evaluate"));
        }

        let predictions_path = self.predictions_path();

        let (predictions, meta_path, reused) = if predictions_path.exists() {
            tracing::info!("Reusing predictions from {}", predictions_path.display());
            let predictions = load_predictions(&predictions_path)?;
            on_progress(examples.len());
            (predictions, None, true)
        } else {
            let mut predictions = Predictions::new();
            let mut meta = MetaPredictions::new();

            for (i, example) in examples.iter().enumerate() {
                let result = qa.query(&example.question_text).await?;
                predictions.insert(example.qas_id.clone(), result.output.best_text().to_string());
                meta.insert(example.qas_id.clone(), result.output.answers);
                on_progress(i + 1);
            }

            // Predictions last: an existing predictions file marks a finished run
            fs::create_dir_all(&self.output_dir)?;
            let meta_path = self.meta_path();
            write_json(&meta_path, &meta)?;
            write_json(&predictions_path, &predictions)?;

            tracing::info!(
                "Saved {} predictions to {}",
                predictions.len(),
                predictions_path.display()
            );

            (predictions, Some(meta_path), false)
        };

        let scores = scorer.score(examples, &predictions)?;
        tracing::info!(
            "{}: exact {:.2} over {} questions",
            scorer.name(),
            scores.exact,
            scores.total
        );

        Ok(EvalReport {
            scores,
            predictions_path,
            meta_path,
            reused_predictions: reused,
            generated_at: Utc::now(),
        })
    }
}

/// Load a prediction file written by an earlier run
pub fn load_predictions(path: impl AsRef<Path>) -> Result<Predictions> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)?;
    Ok(())
}
