//! In-process stand-ins for the search and inference services

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use qa_system::config::QaConfig;
use qa_system::CorpusRecord;

/// Bind a router to an ephemeral local port and return its base URL
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Search service holding documents in memory
#[derive(Default)]
pub struct SearchStub {
    indices: Mutex<BTreeSet<String>>,
    documents: Mutex<BTreeMap<String, Value>>,
    pub searches: Mutex<Vec<Value>>,
    pub refreshes: Mutex<usize>,
}

impl SearchStub {
    pub fn with_index(name: &str) -> Arc<Self> {
        let stub = Self::default();
        stub.indices.lock().insert(name.to_string());
        Arc::new(stub)
    }

    pub fn insert(&self, id: &str, record: &CorpusRecord) {
        self.documents
            .lock()
            .insert(id.to_string(), serde_json::to_value(record).unwrap());
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/", get(|| async { Json(json!({"tagline": "You Know, for Search"})) }))
            .route("/:index", put(create_index))
            .route("/:index/_doc/:id", put(index_document))
            .route("/:index/_refresh", post(refresh))
            .route("/:index/_count", get(count))
            .route("/:index/_search", post(search))
            .with_state(self.clone())
    }
}

async fn create_index(
    State(stub): State<Arc<SearchStub>>,
    Path(index): Path<String>,
) -> impl IntoResponse {
    if !stub.indices.lock().insert(index.clone()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"type": "resource_already_exists_exception", "index": index}})),
        );
    }
    (StatusCode::OK, Json(json!({"acknowledged": true, "index": index})))
}

async fn index_document(
    State(stub): State<Arc<SearchStub>>,
    Path((_index, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    stub.documents.lock().insert(id.clone(), body);
    (StatusCode::CREATED, Json(json!({"_id": id, "result": "created"})))
}

async fn refresh(State(stub): State<Arc<SearchStub>>) -> Json<Value> {
    *stub.refreshes.lock() += 1;
    Json(json!({"_shards": {"total": 1, "successful": 1, "failed": 0}}))
}

async fn count(
    State(stub): State<Arc<SearchStub>>,
    Path(index): Path<String>,
) -> impl IntoResponse {
    if !stub.indices.lock().contains(&index) {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "index_not_found_exception"})));
    }
    (StatusCode::OK, Json(json!({"count": stub.documents.lock().len()})))
}

/// Ranks documents by the number of query terms their clean text contains
async fn search(State(stub): State<Arc<SearchStub>>, Json(body): Json<Value>) -> Json<Value> {
    stub.searches.lock().push(body.clone());

    let query = body["query"]["query_string"]["query"].as_str().unwrap_or("");
    let size = body["size"].as_u64().unwrap_or(10) as usize;
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

    let mut hits: Vec<(usize, String, Value)> = stub
        .documents
        .lock()
        .iter()
        .filter_map(|(id, source)| {
            let text = source["document_text_clean"].as_str().unwrap_or("").to_lowercase();
            let words: BTreeSet<&str> = text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .collect();
            let score = terms.iter().filter(|t| words.contains(t.as_str())).count();
            (score > 0).then(|| (score, id.clone(), source.clone()))
        })
        .collect();

    hits.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    let total = hits.len();
    hits.truncate(size);

    let hits: Vec<Value> = hits
        .into_iter()
        .map(|(score, id, source)| json!({"_id": id, "_score": score as f32, "_source": source}))
        .collect();

    Json(json!({
        "took": 1,
        "hits": {"total": {"value": total, "relation": "eq"}, "hits": hits}
    }))
}

/// Question-answering inference service with canned answers
///
/// A context mentioning a known answer yields that answer; anything else
/// yields the null answer.
///
/// Every call is recorded in `models`, including calls answered with an
/// error while `failures` is above zero.
#[derive(Default)]
pub struct ReaderStub {
    pub models: Mutex<Vec<String>>,
    failures: Mutex<usize>,
}

const KNOWN_ANSWERS: &[(&str, f32)] = &[("Paris", 0.9), ("Lyon", 0.6), ("Marseille", 0.3)];

impl ReaderStub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers the first `failures` calls with 503
    pub fn failing(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures: Mutex::new(failures),
            ..Self::default()
        })
    }

    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/models/*model", post(answer))
            .with_state(self.clone())
    }
}

async fn answer(
    State(stub): State<Arc<ReaderStub>>,
    Path(model): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    stub.models.lock().push(model);

    {
        let mut failures = stub.failures.lock();
        if *failures > 0 {
            *failures -= 1;
            return (StatusCode::SERVICE_UNAVAILABLE, "model is loading").into_response();
        }
    }

    let context = body["inputs"]["context"].as_str().unwrap_or("");
    let top_k = body["parameters"]["top_k"].as_u64().unwrap_or(1);

    let null = json!({"answer": "", "score": 0.4, "start": 0, "end": 0});
    let best = KNOWN_ANSWERS
        .iter()
        .find_map(|(text, score)| {
            context.find(text).map(|start| {
                json!({"answer": text, "score": score, "start": start, "end": start + text.len()})
            })
        })
        .unwrap_or_else(|| null.clone());

    if top_k == 1 {
        Json(best).into_response()
    } else {
        Json(json!([best, {"answer": "", "score": 0.05, "start": 0, "end": 0}])).into_response()
    }
}

/// Small corpus about French cities
pub fn city_corpus() -> Vec<CorpusRecord> {
    vec![
        CorpusRecord::new(
            "Paris",
            "https://en.wikipedia.org/wiki/Paris",
            "Paris is the capital and largest city of France.",
        ),
        CorpusRecord::new(
            "Lyon",
            "https://en.wikipedia.org/wiki/Lyon",
            "Lyon is the third largest city of France.",
        ),
        CorpusRecord::new(
            "Cheese",
            "https://en.wikipedia.org/wiki/Cheese",
            "Cheese is a dairy product made in France and elsewhere.",
        ),
    ]
}

/// Configuration pointing at the given stubs, with retries disabled
pub fn stub_config(search_url: &str, reader_url: &str) -> QaConfig {
    let mut config = QaConfig::default();
    config.elasticsearch.url = search_url.to_string();
    config.elasticsearch.index_name = "test_index".to_string();
    config.reader.base_url = reader_url.to_string();
    config.reader.max_retries = 0;
    config.reader.timeout_secs = 5;
    config.pipeline.n_docs = 3;
    config
}
