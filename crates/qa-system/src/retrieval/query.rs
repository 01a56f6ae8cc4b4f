//! Search request bodies: question sanitization, query DSL, index mapping

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9]+").expect("static regex is valid")
});

/// Replace every run of non-alphanumeric characters with one space
///
/// Keeps `query_string` syntax characters (`?`, `:`, `"`, ...) out of the
/// query. Non-ASCII letters are stripped as well.
pub fn sanitize_question(question: &str) -> String {
    NON_ALPHANUMERIC.replace_all(question, " ").into_owned()
}

/// `query_string` search body for a sanitized question
pub fn question_query(sanitized: &str, default_field: &str, size: usize) -> Value {
    json!({
        "query": {
            "query_string": {
                "query": sanitized,
                "default_field": default_field
            }
        },
        "size": size
    })
}

/// Index settings: strict mapping over the corpus record fields
pub fn index_mapping() -> Value {
    json!({
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "document_title": {"type": "text"},
                "document_url": {"type": "text"},
                "document_text": {"type": "text"},
                "document_text_clean": {"type": "text"}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_question() {
        assert_eq!(sanitize_question("Why is the sky blue?"), "Why is the sky blue ");
        assert_eq!(
            sanitize_question("AND:(title\"x\") -- 1990s?!"),
            "AND title x 1990s "
        );
        assert_eq!(sanitize_question("???"), " ");
        assert_eq!(sanitize_question("café"), "caf ");
    }

    #[test]
    fn test_question_query_body() {
        let body = question_query("who wrote hamlet", "document_text_clean", 5);
        assert_eq!(body["size"], 5);
        assert_eq!(body["query"]["query_string"]["query"], "who wrote hamlet");
        assert_eq!(
            body["query"]["query_string"]["default_field"],
            "document_text_clean"
        );
    }

    #[test]
    fn test_index_mapping_is_strict() {
        let mapping = index_mapping();
        assert_eq!(mapping["mappings"]["dynamic"], "strict");
        let props = mapping["mappings"]["properties"].as_object().unwrap();
        assert_eq!(props.len(), 4);
        assert!(props.contains_key("document_text_clean"));
    }
}
