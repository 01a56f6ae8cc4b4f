//! Reader outputs: raw model spans and merged answers

use serde::{Deserialize, Serialize};

use super::document::Document;

/// One candidate span returned by the question-answering model
///
/// An empty `answer` is the model's null answer ("no answer in this passage").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSpan {
    /// Answer text
    pub answer: String,
    /// Model confidence
    pub score: f32,
    /// Character offset of the span start in the context
    pub start: usize,
    /// Character offset of the span end in the context
    pub end: usize,
}

impl AnswerSpan {
    /// True for the null answer
    pub fn is_null(&self) -> bool {
        self.answer.trim().is_empty()
    }
}

/// A merged answer tied back to its source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub probability: f32,
    pub answer_text: String,
    pub start_index: usize,
    pub end_index: usize,
    pub doc_id: String,
    pub title: String,
}

impl Answer {
    /// Attach a span to the document it was read from
    pub fn from_span(span: &AnswerSpan, document: &Document) -> Self {
        Self {
            probability: span.score,
            answer_text: span.answer.clone(),
            start_index: span.start,
            end_index: span.end,
            doc_id: document.id.clone(),
            title: document.title.clone(),
        }
    }

    /// True for the null answer
    pub fn is_null(&self) -> bool {
        self.answer_text.trim().is_empty()
    }
}

/// Answers for one question, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReaderOutput {
    pub question: String,
    pub answers: Vec<Answer>,
}

impl ReaderOutput {
    /// Output with no answers
    pub fn empty(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answers: Vec::new(),
        }
    }

    /// Text of the top answer, empty when there is none
    pub fn best_text(&self) -> &str {
        self.answers
            .first()
            .map(|a| a.answer_text.as_str())
            .unwrap_or("")
    }
}
