//! End-to-end API tests over the in-memory wiring.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use docchat_chat::{
    CONTEXT_HEADER, ChatConfig, ChatError, ChatOrchestrator, GenerationClient, GenerationRequest,
    NO_CONTEXT_MARKER,
};
use docchat_rag::{
    EmbeddingProvider, FixedSizeChunker, IndexGateway, IngestionPipeline, InMemoryVectorStore,
    PlainTextExtractor, RagConfig, RagError,
};
use docchat_server::{
    AppState, CHAT_FALLBACK, InMemoryDocumentStore, InMemoryObjectStore, StaticTokenAuthenticator,
    router,
};

const TOKEN: &str = "test-token";
const DIM: usize = 8;

/// Deterministic embedder: identical texts map to identical vectors.
struct HashEmbedder;

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let mut v = vec![0.0f32; DIM];
        for (i, b) in text.bytes().enumerate() {
            v[i % DIM] += f32::from(b) / 255.0;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Generation client returning a fixed answer and recording every request.
struct RecordingClient {
    answer: String,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl RecordingClient {
    fn new(answer: &str) -> Self {
        Self { answer: answer.to_string(), requests: Mutex::new(Vec::new()) }
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for RecordingClient {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, ChatError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.answer.clone())
    }
}

/// Generation client that always fails.
struct BrokenClient;

#[async_trait]
impl GenerationClient for BrokenClient {
    fn name(&self) -> &str {
        "broken"
    }

    async fn generate(&self, _request: GenerationRequest) -> Result<String, ChatError> {
        Err(ChatError::Generation { provider: "broken".into(), message: "model offline".into() })
    }
}

struct TestApp {
    router: Router,
    store: Arc<InMemoryVectorStore>,
    client: Arc<RecordingClient>,
}

fn test_app_with(client: Arc<dyn GenerationClient>, recording: Arc<RecordingClient>) -> TestApp {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder);
    let store = Arc::new(InMemoryVectorStore::new());
    let config = RagConfig::default();
    let gateway =
        Arc::new(IndexGateway::new(store.clone(), embedder.dimensions(), config.max_top_k));

    let pipeline = IngestionPipeline::builder()
        .config(config.clone())
        .extractor(Arc::new(PlainTextExtractor))
        .chunker(Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)))
        .embedding_provider(embedder.clone())
        .gateway(gateway.clone())
        .build()
        .unwrap();

    let orchestrator = ChatOrchestrator::builder()
        .config(ChatConfig::default())
        .embedding_provider(embedder)
        .gateway(gateway.clone())
        .generation_client(client)
        .build()
        .unwrap();

    let state = AppState {
        auth: Arc::new(StaticTokenAuthenticator::single(TOKEN, "test-user")),
        documents: Arc::new(InMemoryDocumentStore::new()),
        objects: Arc::new(InMemoryObjectStore::new()),
        pipeline: Arc::new(pipeline),
        gateway,
        orchestrator: Arc::new(orchestrator),
    };

    TestApp { router: router(state), store, client: recording }
}

fn test_app() -> TestApp {
    let recording = Arc::new(RecordingClient::new("The capital is Paris."));
    test_app_with(recording.clone(), recording)
}

fn authed_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn ingest_body(file_name: &str, text: &str, collection_id: &str) -> Value {
    json!({
        "file_name": file_name,
        "content_base64": BASE64.encode(text.as_bytes()),
        "collection_id": collection_id,
    })
}

#[tokio::test]
async fn health_needs_no_auth() {
    let app = test_app();
    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_or_wrong_token_is_rejected() {
    let app = test_app();
    let no_auth = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "message": "hi", "collection_id": "f1" }).to_string()))
        .unwrap();
    let response = app.router.clone().oneshot(no_auth).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bad_auth = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "message": "hi", "collection_id": "f1" }).to_string()))
        .unwrap();
    let response = app.router.oneshot(bad_auth).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ingest_rejects_missing_fields() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(authed_json("POST", "/api/ingest", ingest_body("", "text", "f1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .oneshot(authed_json(
            "POST",
            "/api/ingest",
            json!({ "file_name": "a.txt", "content_base64": "not base64!!", "collection_id": "f1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_file_type_is_unprocessable() {
    let app = test_app();
    let response = app
        .router
        .oneshot(authed_json("POST", "/api/ingest", ingest_body("slides.pdf", "%PDF-1.4", "f1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Could not read file");
}

#[tokio::test]
async fn ingest_then_chat_uses_retrieved_context() {
    let app = test_app();

    let text = "The capital of France is Paris. ".repeat(94); // ~3000 chars
    let response = app
        .router
        .clone()
        .oneshot(authed_json("POST", "/api/ingest", ingest_body("geography.txt", &text, "f1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["document_name"], "geography.txt");
    assert!(body["document_url"].as_str().unwrap().contains("geography.txt"));
    assert_eq!(app.store.collection_len("f1").await, 4);

    let response = app
        .router
        .oneshot(authed_json(
            "POST",
            "/api/chat",
            json!({
                "message": "What is the capital of France?",
                "collection_id": "f1",
                "history": [
                    { "role": "user", "content": "Hello" },
                    { "role": "assistant", "content": "Hi! Ask me about your documents." },
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["response"], "The capital is Paris.");

    let requests = app.client.requests();
    assert_eq!(requests.len(), 1);
    let messages = &requests[0].messages;
    // [context, history..., question] with retrieved text in the context.
    assert_eq!(messages.len(), 4);
    assert!(messages[0].content.starts_with(CONTEXT_HEADER));
    assert!(messages[0].content.contains("capital of France"));
    assert_eq!(messages[3].content, "What is the capital of France?");
    assert_eq!(requests[0].temperature, 0.0);
}

#[tokio::test]
async fn reingest_replaces_rather_than_duplicates() {
    let app = test_app();
    let text = "alpha beta gamma. ".repeat(200);

    for _ in 0..2 {
        let response = app
            .router
            .clone()
            .oneshot(authed_json("POST", "/api/ingest", ingest_body("notes.txt", &text, "f1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let expected = app.store.collection_len("f1").await;
    let response = app
        .router
        .oneshot(authed_json("POST", "/api/ingest", ingest_body("notes.txt", &text, "f1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.collection_len("f1").await, expected);
}

#[tokio::test]
async fn chat_on_empty_collection_degrades_gracefully() {
    let app = test_app();
    let response = app
        .router
        .oneshot(authed_json(
            "POST",
            "/api/chat",
            json!({ "message": "Anything there?", "collection_id": "empty" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = app.client.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].messages[0].content.contains(NO_CONTEXT_MARKER));
}

#[tokio::test]
async fn generation_failure_returns_fallback_answer() {
    let recording = Arc::new(RecordingClient::new("unused"));
    let app = test_app_with(Arc::new(BrokenClient), recording);

    let response = app
        .router
        .oneshot(authed_json(
            "POST",
            "/api/chat",
            json!({ "message": "hi", "collection_id": "f1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["response"], CHAT_FALLBACK);
}

#[tokio::test]
async fn listing_a_collection_returns_its_document_records() {
    let app = test_app();
    let text = "kappa lambda mu. ".repeat(100);

    let response = app
        .router
        .clone()
        .oneshot(authed_json("POST", "/api/ingest", ingest_body("notes.txt", &text, "f1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/collections/f1/documents")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "notes");
    assert_eq!(records[0]["name"], "notes.txt");
    assert!(records[0]["chunk_count"].as_u64().unwrap() > 0);

    // Other collections stay invisible.
    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/collections/other/documents")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn document_delete_removes_its_chunks() {
    let app = test_app();
    let text = "delta epsilon zeta. ".repeat(200);

    let response = app
        .router
        .clone()
        .oneshot(authed_json("POST", "/api/ingest", ingest_body("notes.txt", &text, "f1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.collection_len("f1").await > 0);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/collections/f1/documents/notes")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.store.collection_len("f1").await, 0);

    // Gone now, so a second delete is a 404.
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/collections/f1/documents/notes")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn collection_delete_tears_down_namespace() {
    let app = test_app();
    let text = "eta theta iota. ".repeat(200);

    for name in ["a.txt", "b.txt"] {
        let response = app
            .router
            .clone()
            .oneshot(authed_json("POST", "/api/ingest", ingest_body(name, &text, "f1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert!(app.store.collection_len("f1").await > 0);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/collections/f1")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.store.collection_len("f1").await, 0);
}
