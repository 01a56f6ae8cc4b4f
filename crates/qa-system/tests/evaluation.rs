//! Batch evaluation against local search and inference stubs

mod support;

use std::fs;
use std::sync::Arc;

use qa_system::config::QaConfig;
use qa_system::evaluation::{load_predictions, Evaluation, ExactMatchScorer};
use qa_system::providers::{ElasticsearchRetriever, HuggingFaceQa};
use qa_system::{Answer, EvalExample, Error, QaSystem, Reader, ReaderOptions};
use support::{city_corpus, serve, stub_config, ReaderStub, SearchStub};

fn system(config: &QaConfig) -> QaSystem {
    let retriever = ElasticsearchRetriever::new(&config.elasticsearch).unwrap();
    let reader = Reader::new(
        Arc::new(HuggingFaceQa::new(&config.reader).unwrap()),
        ReaderOptions::from(&config.reader),
    );
    QaSystem::new(Arc::new(retriever), reader, config.pipeline.clone())
}

async fn seeded() -> (QaConfig, Arc<ReaderStub>) {
    let search = SearchStub::with_index("test_index");
    for (i, record) in city_corpus().iter().enumerate() {
        search.insert(&i.to_string(), record);
    }
    let reader = ReaderStub::new();
    let config = stub_config(&serve(search.router()).await, &serve(reader.router()).await);
    (config, reader)
}

fn examples() -> Vec<EvalExample> {
    vec![
        EvalExample::new("q1", "What is the capital of France?", vec!["Paris".to_string()]),
        EvalExample::new("q2", "Which city is the third largest?", vec!["Lyon".to_string()]),
        EvalExample::new("q3", "Who wrote Hamlet?", vec![]),
    ]
}

#[tokio::test]
async fn writes_predictions_and_scores_them() {
    let (config, _) = seeded().await;
    let qa = system(&config);
    let dir = tempfile::tempdir().unwrap();
    let evaluation = Evaluation::new(dir.path().join("run"), "qasystem_predictions.json");

    let mut progress = Vec::new();
    let report = evaluation
        .run(&qa, &examples(), &ExactMatchScorer, |done| progress.push(done))
        .await
        .unwrap();

    assert_eq!(progress, vec![1, 2, 3]);
    assert!(!report.reused_predictions);

    // q2's best span comes from the Paris passage
    let predictions = load_predictions(&report.predictions_path).unwrap();
    assert_eq!(predictions["q1"], "Paris");
    assert_eq!(predictions["q2"], "Paris");
    assert_eq!(predictions["q3"], "");

    let scores = &report.scores;
    assert_eq!(scores.total, 3);
    assert_eq!(scores.has_ans_total, 2);
    assert_eq!(scores.no_ans_total, 1);
    assert!((scores.has_ans_exact - 50.0).abs() < 1e-9);
    assert!((scores.no_ans_exact - 100.0).abs() < 1e-9);
    assert!((scores.exact - 200.0 / 3.0).abs() < 1e-9);

    let meta_path = report.meta_path.unwrap();
    assert_eq!(meta_path, dir.path().join("run/qasystem_predictions_meta.json"));
    let meta: std::collections::BTreeMap<String, Vec<Answer>> =
        serde_json::from_str(&fs::read_to_string(&meta_path).unwrap()).unwrap();
    assert_eq!(meta["q1"][0].answer_text, "Paris");
    assert!(meta["q3"].is_empty());
}

#[tokio::test]
async fn existing_predictions_are_reused() {
    let (config, reader) = seeded().await;
    let qa = system(&config);
    let dir = tempfile::tempdir().unwrap();

    let first = qa
        .evaluate(&examples(), dir.path(), "preds.json", &ExactMatchScorer)
        .await
        .unwrap();
    let calls = reader.models.lock().len();
    assert!(calls > 0);

    let second = qa
        .evaluate(&examples(), dir.path(), "preds.json", &ExactMatchScorer)
        .await
        .unwrap();

    assert!(second.reused_predictions);
    assert!(second.meta_path.is_none());
    assert_eq!(second.scores, first.scores);
    assert_eq!(reader.models.lock().len(), calls);
}

#[tokio::test]
async fn hand_edited_predictions_are_scored_as_found() {
    let (config, reader) = seeded().await;
    let qa = system(&config);
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("preds.json"), r#"{"q1": "paris", "q2": "Lyon"}"#).unwrap();

    let report = qa
        .evaluate(&examples(), dir.path(), "preds.json", &ExactMatchScorer)
        .await
        .unwrap();

    // q3 is missing and counts as the empty prediction
    assert!((report.scores.exact - 100.0).abs() < 1e-9);
    assert!(reader.models.lock().is_empty());
}

#[tokio::test]
async fn failed_query_aborts_without_writing() {
    let (mut config, _) = seeded().await;
    config.reader.base_url = "http://127.0.0.1:9".to_string();
    let qa = system(&config);
    let dir = tempfile::tempdir().unwrap();
    let evaluation = Evaluation::new(dir.path(), "preds.json");

    let err = evaluation
        .run(&qa, &examples(), &ExactMatchScorer, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Reader(_)));
    assert!(!evaluation.predictions_path().exists());
    assert!(!evaluation.meta_path().exists());
}

#[tokio::test]
async fn unwritable_meta_file_leaves_no_predictions() {
    let (config, _) = seeded().await;
    let qa = system(&config);
    let dir = tempfile::tempdir().unwrap();
    let evaluation = Evaluation::new(dir.path(), "preds.json");
    // A directory where the meta file should go makes its write fail
    fs::create_dir_all(evaluation.meta_path()).unwrap();

    let err = evaluation
        .run(&qa, &examples(), &ExactMatchScorer, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert!(!evaluation.predictions_path().exists());
}

#[tokio::test]
async fn empty_example_set_is_an_error() {
    let (config, _) = seeded().await;
    let qa = system(&config);
    let dir = tempfile::tempdir().unwrap();

    let err = Evaluation::new(dir.path(), "preds.json")
        .run(&qa, &[], &ExactMatchScorer, |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Evaluation(_)));
}
