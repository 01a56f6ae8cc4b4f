//! Labeled evaluation examples (SQuAD file format)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// One labeled question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalExample {
    /// Question id, the key predictions are stored under
    pub qas_id: String,
    pub question_text: String,
    /// Gold answer texts
    pub answers: Vec<String>,
    /// The question has no answer in its passage
    #[serde(default)]
    pub is_impossible: bool,
    /// Title of the article the question was written against
    #[serde(default)]
    pub title: String,
}

impl EvalExample {
    /// Create an answerable example
    pub fn new(
        qas_id: impl Into<String>,
        question_text: impl Into<String>,
        answers: Vec<String>,
    ) -> Self {
        let is_impossible = answers.is_empty();
        Self {
            qas_id: qas_id.into(),
            question_text: question_text.into(),
            answers,
            is_impossible,
            title: String::new(),
        }
    }

    /// Load every question from a SQuAD v1.1 / v2.0 JSON file
    pub fn load_squad(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        let examples = Self::parse_squad(&raw)?;
        tracing::info!("Loaded {} examples from {}", examples.len(), path.display());
        Ok(examples)
    }

    /// Parse SQuAD JSON text
    pub fn parse_squad(raw: &str) -> Result<Vec<Self>> {
        let file: SquadFile = serde_json::from_str(raw)?;

        let examples = file
            .data
            .into_iter()
            .flat_map(|article| {
                let title = article.title;
                article.paragraphs.into_iter().flat_map(move |paragraph| {
                    let title = title.clone();
                    paragraph.qas.into_iter().map(move |qa| EvalExample {
                        qas_id: qa.id,
                        question_text: qa.question,
                        answers: qa.answers.into_iter().map(|a| a.text).collect(),
                        is_impossible: qa.is_impossible,
                        title: title.clone(),
                    })
                })
            })
            .collect();

        Ok(examples)
    }
}

#[derive(Deserialize)]
struct SquadFile {
    data: Vec<SquadArticle>,
}

#[derive(Deserialize)]
struct SquadArticle {
    #[serde(default)]
    title: String,
    paragraphs: Vec<SquadParagraph>,
}

#[derive(Deserialize)]
struct SquadParagraph {
    qas: Vec<SquadQa>,
}

#[derive(Deserialize)]
struct SquadQa {
    id: String,
    question: String,
    #[serde(default)]
    answers: Vec<SquadAnswer>,
    #[serde(default)]
    is_impossible: bool,
}

#[derive(Deserialize)]
struct SquadAnswer {
    text: String,
}
