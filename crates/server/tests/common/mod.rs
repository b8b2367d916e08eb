//! Common test utilities for API testing with mocks.
//!
//! Provides a test fixture that builds an in-process server backed by an
//! in-memory store, a mock feed source and a mock translator, so full
//! request/refresh flows run without external infrastructure.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use gazette_core::testing::{MockFeedSource, MockTranslator};
use gazette_core::translation::{AiUsageTracker, TranslationResolver, Translator};
use gazette_core::{
    ArticleStore, Config, FeedPipeline, FeedSource, RefreshScheduler, SettingsStore, SqliteStore,
};
use gazette_server::api::create_router;
use gazette_server::state::AppState;

/// Re-export fixtures for test convenience
pub use gazette_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Backing store, shared with the server
    pub store: Arc<SqliteStore>,
    /// Mock feed source - configure items per feed
    pub source: Arc<MockFeedSource>,
    /// Mock fallback translator - configure responses
    pub translator: Arc<MockTranslator>,
    /// Scheduler handle for waiting on cycles
    pub scheduler: Arc<RefreshScheduler>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with the translation resolver wired in.
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Create a fixture without a translation resolver, for testing the
    /// unconfigured path.
    pub fn without_resolver() -> Self {
        Self::build(false)
    }

    fn build(with_resolver: bool) -> Self {
        let store = Arc::new(SqliteStore::in_memory().expect("Failed to create store"));
        let source = Arc::new(MockFeedSource::new());
        let translator = Arc::new(MockTranslator::new("google"));

        let settings: Arc<dyn SettingsStore> = Arc::clone(&store) as Arc<dyn SettingsStore>;
        let usage = Arc::new(AiUsageTracker::new(Arc::clone(&settings)));
        let resolver = Arc::new(TranslationResolver::new(
            Arc::clone(&settings),
            usage,
            Arc::clone(&translator) as Arc<dyn Translator>,
        ));

        let mut pipeline = FeedPipeline::new(Arc::clone(&source) as Arc<dyn FeedSource>);
        if with_resolver {
            pipeline = pipeline.with_resolver(Arc::clone(&resolver));
        }

        let scheduler = Arc::new(RefreshScheduler::new(
            Arc::clone(&store) as Arc<dyn ArticleStore>,
            Arc::clone(&settings),
            Arc::new(pipeline),
        ));

        let state = Arc::new(AppState::new(
            Config::default(),
            Arc::clone(&store) as Arc<dyn ArticleStore>,
            settings,
            Arc::clone(&scheduler),
            with_resolver.then_some(resolver),
        ));

        let router = create_router(state);

        Self {
            router,
            store,
            source,
            translator,
            scheduler,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a GET request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
