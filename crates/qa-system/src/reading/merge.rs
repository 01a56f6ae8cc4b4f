//! Answer merging across documents
//!
//! The reader produces candidate spans per document; these functions turn
//! them into one ranked answer list under a null-answer policy.

use serde::{Deserialize, Serialize};

use crate::types::{Answer, AnswerSpan, Document};

/// How per-document candidates become the final answer list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Best candidate per document, null answers only when nothing else exists
    #[default]
    BestPerDocument,
    /// Every non-null candidate from every document, pooled
    AllSpans,
}

/// Candidate spans read from one document, best first
#[derive(Debug, Clone)]
pub struct DocumentCandidates<'a> {
    pub document: &'a Document,
    pub spans: Vec<AnswerSpan>,
}

/// Merge limits
#[derive(Debug, Clone, Copy)]
pub struct MergeOptions {
    /// Answers kept
    pub top_k: usize,
    /// Spans considered per document (`AllSpans` only)
    pub top_n_per_doc: usize,
    /// Append null answers after the ranked ones (`BestPerDocument` only)
    pub include_null_answers: bool,
}

/// Merge candidates with the given strategy
pub fn merge(
    strategy: MergeStrategy,
    candidates: &[DocumentCandidates<'_>],
    options: MergeOptions,
) -> Vec<Answer> {
    match strategy {
        MergeStrategy::BestPerDocument => merge_best_per_document(candidates, options),
        MergeStrategy::AllSpans => merge_all_spans(candidates, options),
    }
}

/// Best candidate per document
///
/// If every document's best candidate is null, the top-k nulls by confidence
/// are returned. Otherwise nulls are dropped, the rest ranked and truncated,
/// and (optionally) the nulls follow in document order.
pub fn merge_best_per_document(
    candidates: &[DocumentCandidates<'_>],
    options: MergeOptions,
) -> Vec<Answer> {
    let best: Vec<Answer> = candidates
        .iter()
        .filter_map(|c| c.spans.first().map(|span| Answer::from_span(span, c.document)))
        .collect();

    if best.iter().all(Answer::is_null) {
        let mut answers = best;
        sort_by_confidence(&mut answers);
        answers.truncate(options.top_k);
        return answers;
    }

    let (mut answers, nulls): (Vec<Answer>, Vec<Answer>) =
        best.into_iter().partition(|a| !a.is_null());

    sort_by_confidence(&mut answers);
    answers.truncate(options.top_k);

    if options.include_null_answers {
        answers.extend(nulls);
    }

    answers
}

/// Pool every non-null span (up to `top_n_per_doc` per document)
///
/// There is no null fallback: no non-null span means no answers.
pub fn merge_all_spans(
    candidates: &[DocumentCandidates<'_>],
    options: MergeOptions,
) -> Vec<Answer> {
    let mut answers: Vec<Answer> = candidates
        .iter()
        .flat_map(|c| {
            c.spans
                .iter()
                .take(options.top_n_per_doc)
                .filter(|span| !span.is_null())
                .map(move |span| Answer::from_span(span, c.document))
        })
        .collect();

    sort_by_confidence(&mut answers);
    answers.truncate(options.top_k);
    answers
}

/// Descending confidence; stable, so ties keep document order
fn sort_by_confidence(answers: &mut [Answer]) {
    answers.sort_by(|a, b| b.probability.total_cmp(&a.probability));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> Document {
        Document::new(id, format!("Title {}", id), "context")
    }

    fn span(answer: &str, score: f32) -> AnswerSpan {
        AnswerSpan {
            answer: answer.to_string(),
            score,
            start: 0,
            end: answer.len(),
        }
    }

    fn options(top_k: usize, include_null_answers: bool) -> MergeOptions {
        MergeOptions {
            top_k,
            top_n_per_doc: 3,
            include_null_answers,
        }
    }

    fn texts(answers: &[Answer]) -> Vec<&str> {
        answers.iter().map(|a| a.answer_text.as_str()).collect()
    }

    #[test]
    fn test_non_null_ranked_before_nulls() {
        let (a, b, c) = (doc("a"), doc("b"), doc("c"));
        let candidates = vec![
            DocumentCandidates { document: &a, spans: vec![span("", 0.9)] },
            DocumentCandidates { document: &b, spans: vec![span("Paris", 0.4)] },
            DocumentCandidates { document: &c, spans: vec![span("Lyon", 0.7)] },
        ];

        let answers = merge_best_per_document(&candidates, options(3, true));
        assert_eq!(texts(&answers), vec!["Lyon", "Paris", ""]);
        assert_eq!(answers[0].doc_id, "c");
        assert_eq!(answers[2].doc_id, "a");

        let answers = merge_best_per_document(&candidates, options(3, false));
        assert_eq!(texts(&answers), vec!["Lyon", "Paris"]);
    }

    #[test]
    fn test_all_null_returns_top_k_nulls() {
        let (a, b, c) = (doc("a"), doc("b"), doc("c"));
        let candidates = vec![
            DocumentCandidates { document: &a, spans: vec![span("", 0.2)] },
            DocumentCandidates { document: &b, spans: vec![span("", 0.8)] },
            DocumentCandidates { document: &c, spans: vec![span("", 0.5)] },
        ];

        let answers = merge_best_per_document(&candidates, options(2, true));
        assert_eq!(answers.len(), 2);
        assert!(answers.iter().all(Answer::is_null));
        assert_eq!(answers[0].doc_id, "b");
        assert_eq!(answers[1].doc_id, "c");
    }

    #[test]
    fn test_ties_keep_document_order() {
        let (a, b, c) = (doc("a"), doc("b"), doc("c"));
        let candidates = vec![
            DocumentCandidates { document: &a, spans: vec![span("first", 0.5)] },
            DocumentCandidates { document: &b, spans: vec![span("second", 0.5)] },
            DocumentCandidates { document: &c, spans: vec![span("third", 0.6)] },
        ];

        let answers = merge_best_per_document(&candidates, options(3, false));
        assert_eq!(texts(&answers), vec!["third", "first", "second"]);
    }

    #[test]
    fn test_top_k_applies_before_nulls_are_appended() {
        let docs: Vec<Document> = (0..5).map(|i| doc(&i.to_string())).collect();
        let candidates = vec![
            DocumentCandidates { document: &docs[0], spans: vec![span("w", 0.1)] },
            DocumentCandidates { document: &docs[1], spans: vec![span("", 0.99)] },
            DocumentCandidates { document: &docs[2], spans: vec![span("x", 0.3)] },
            DocumentCandidates { document: &docs[3], spans: vec![span("y", 0.2)] },
            DocumentCandidates { document: &docs[4], spans: vec![span("", 0.5)] },
        ];

        let answers = merge_best_per_document(&candidates, options(2, true));
        assert_eq!(texts(&answers), vec!["x", "y", "", ""]);
        // Nulls stay in document order, not confidence order
        assert_eq!(answers[2].doc_id, "1");
        assert_eq!(answers[3].doc_id, "4");
    }

    #[test]
    fn test_only_best_span_per_document_counts() {
        let a = doc("a");
        let candidates = vec![DocumentCandidates {
            document: &a,
            spans: vec![span("", 0.6), span("Paris", 0.3)],
        }];

        let answers = merge_best_per_document(&candidates, options(3, true));
        assert_eq!(answers.len(), 1);
        assert!(answers[0].is_null());
    }

    #[test]
    fn test_whitespace_answer_is_null() {
        let (a, b) = (doc("a"), doc("b"));
        let candidates = vec![
            DocumentCandidates { document: &a, spans: vec![span("  ", 0.9)] },
            DocumentCandidates { document: &b, spans: vec![span("Rome", 0.1)] },
        ];

        let answers = merge_best_per_document(&candidates, options(1, false));
        assert_eq!(texts(&answers), vec!["Rome"]);
    }

    #[test]
    fn test_documents_without_spans_are_skipped() {
        let (a, b) = (doc("a"), doc("b"));
        let candidates = vec![
            DocumentCandidates { document: &a, spans: vec![] },
            DocumentCandidates { document: &b, spans: vec![span("Rome", 0.4)] },
        ];
        let answers = merge_best_per_document(&candidates, options(3, true));
        assert_eq!(texts(&answers), vec!["Rome"]);

        let answers = merge_best_per_document(&[], options(3, true));
        assert!(answers.is_empty());
    }

    #[test]
    fn test_all_spans_pools_every_document() {
        let (a, b) = (doc("a"), doc("b"));
        let candidates = vec![
            DocumentCandidates {
                document: &a,
                spans: vec![span("", 0.9), span("Paris", 0.5), span("France", 0.2)],
            },
            DocumentCandidates {
                document: &b,
                spans: vec![span("Lyon", 0.7), span("Nice", 0.05)],
            },
        ];

        let answers = merge_all_spans(&candidates, options(3, true));
        assert_eq!(texts(&answers), vec!["Lyon", "Paris", "France"]);
        assert_eq!(answers[1].doc_id, "a");
    }

    #[test]
    fn test_all_spans_respects_per_document_limit() {
        let a = doc("a");
        let candidates = vec![DocumentCandidates {
            document: &a,
            spans: vec![span("one", 0.5), span("two", 0.4), span("three", 0.3)],
        }];
        let limited = MergeOptions {
            top_k: 10,
            top_n_per_doc: 2,
            include_null_answers: false,
        };
        let answers = merge_all_spans(&candidates, limited);
        assert_eq!(texts(&answers), vec!["one", "two"]);
    }

    #[test]
    fn test_all_spans_without_answers_is_empty() {
        let a = doc("a");
        let candidates = vec![DocumentCandidates {
            document: &a,
            spans: vec![span("", 0.9)],
        }];
        assert!(merge(MergeStrategy::AllSpans, &candidates, options(3, true)).is_empty());
    }

    #[test]
    fn test_strategy_serde_names() {
        let value = serde_json::to_value(MergeStrategy::BestPerDocument).unwrap();
        assert_eq!(value, "best_per_document");
        let parsed: MergeStrategy = serde_json::from_str("\"all_spans\"").unwrap();
        assert_eq!(parsed, MergeStrategy::AllSpans);
    }
}
