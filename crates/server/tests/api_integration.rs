//! API integration tests driving the in-process server through full
//! feed, refresh, settings and translation flows.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};
use gazette_core::{ArticleStore, SettingsStore};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_endpoint_exposes_sanitized_config() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["server"]["port"], 8080);
    assert_eq!(response.body["database"]["path"], "gazette.db");
}

#[tokio::test]
async fn test_feed_subscription_lifecycle() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/feeds",
            json!({"title": "Example", "url": "https://feeds.example.com/1.xml"}),
        )
        .await;
    assert_status!(response, StatusCode::CREATED);
    let feed_id = response.body["id"].as_i64().unwrap();

    let response = fixture.get("/api/v1/feeds").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 1);
    assert_eq!(response.body[0]["title"], "Example");

    let response = fixture.delete(&format!("/api/v1/feeds/{}", feed_id)).await;
    assert_status!(response, StatusCode::NO_CONTENT);

    let response = fixture.delete(&format!("/api/v1/feeds/{}", feed_id)).await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_feed_rejects_empty_url() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/feeds", json!({"title": "Broken", "url": "  "}))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_stores_articles() {
    let fixture = TestFixture::new();

    let feed = fixture
        .store
        .add_feed("Example", "https://feeds.example.com/1.xml")
        .unwrap();
    fixture
        .source
        .set_items(feed.id, vec![fixtures::item("item-1", "A headline")])
        .await;

    let response = fixture.post("/api/v1/refresh", json!({})).await;
    assert_status!(response, StatusCode::ACCEPTED);
    assert_eq!(response.body["feeds"], 1);

    assert!(fixture.scheduler.wait_until_idle(WAIT).await);

    let response = fixture.get("/api/v1/refresh/progress").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["current"], 1);
    assert_eq!(response.body["is_running"], false);

    let response = fixture.get("/api/v1/articles").await;
    assert_status!(response, StatusCode::OK);
    let articles = response.body.as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["title"], "A headline");
}

#[tokio::test]
async fn test_refresh_with_explicit_feed_ids() {
    let fixture = TestFixture::new();

    let feed = fixture
        .store
        .add_feed("One", "https://feeds.example.com/1.xml")
        .unwrap();
    let other = fixture
        .store
        .add_feed("Two", "https://feeds.example.com/2.xml")
        .unwrap();
    fixture
        .source
        .set_items(feed.id, vec![fixtures::item("a-1", "From one")])
        .await;
    fixture
        .source
        .set_items(other.id, vec![fixtures::item("b-1", "From two")])
        .await;

    let response = fixture
        .post("/api/v1/refresh", json!({"feed_ids": [feed.id]}))
        .await;
    assert_status!(response, StatusCode::ACCEPTED);
    assert!(fixture.scheduler.wait_until_idle(WAIT).await);

    // Only the requested feed was fetched
    assert_eq!(fixture.source.fetch_count().await, 1);
    assert_eq!(fixture.source.fetch_order().await, vec![feed.id]);
}

#[tokio::test]
async fn test_refresh_unknown_feed_id_is_rejected() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/refresh", json!({"feed_ids": [999]}))
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_refresh_returns_conflict() {
    let fixture = TestFixture::new();

    let feed = fixture
        .store
        .add_feed("Slow", "https://feeds.example.com/slow.xml")
        .unwrap();
    fixture
        .source
        .set_items(feed.id, vec![fixtures::item("s-1", "Slow headline")])
        .await;
    fixture.source.set_delay(Duration::from_millis(300)).await;

    let response = fixture.post("/api/v1/refresh", json!({})).await;
    assert_status!(response, StatusCode::ACCEPTED);

    let response = fixture.post("/api/v1/refresh", json!({})).await;
    assert_status!(response, StatusCode::CONFLICT);

    assert!(fixture.scheduler.wait_until_idle(WAIT).await);
}

#[tokio::test]
async fn test_pool_and_queue_endpoints() {
    let fixture = TestFixture::new();
    fixture
        .store
        .set_setting("max_concurrent_refreshes", "1")
        .unwrap();

    for i in 1..=3 {
        let feed = fixture
            .store
            .add_feed(
                &format!("Feed {}", i),
                &format!("https://feeds.example.com/{}.xml", i),
            )
            .unwrap();
        fixture
            .source
            .set_items(feed.id, vec![fixtures::item(&format!("q-{}", i), "Headline")])
            .await;
    }
    fixture.source.set_delay(Duration::from_millis(300)).await;

    let response = fixture.post("/api/v1/refresh", json!({})).await;
    assert_status!(response, StatusCode::ACCEPTED);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let response = fixture.get("/api/v1/refresh/pool").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 1);

    let response = fixture.get("/api/v1/refresh/queue?limit=10").await;
    assert_status!(response, StatusCode::OK);
    let queue = response.body.as_array().unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0]["position"], 1);

    assert!(fixture.scheduler.wait_until_idle(WAIT).await);

    let response = fixture.get("/api/v1/refresh/pool").await;
    assert!(response.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_settings_roundtrip() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/settings/update_interval").await;
    assert_status!(response, StatusCode::NOT_FOUND);

    let response = fixture
        .put("/api/v1/settings/update_interval", json!({"value": "15"}))
        .await;
    assert_status!(response, StatusCode::OK);

    let response = fixture.get("/api/v1/settings/update_interval").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["value"], "15");
}

#[tokio::test]
async fn test_article_translation_endpoint() {
    let fixture = TestFixture::new();
    fixture
        .translator
        .set_response("Article about technology")
        .await;

    let feed = fixture
        .store
        .add_feed("Foreign", "https://feeds.example.com/foreign.xml")
        .unwrap();
    fixture
        .store
        .save_articles(&[gazette_core::NewArticle {
            feed_id: feed.id,
            guid: "f-1".to_string(),
            title: "这是一篇关于技术的文章。".to_string(),
            url: "https://example.com/articles/f-1".to_string(),
            ..Default::default()
        }])
        .unwrap();
    let article_id = fixture.store.list_articles(None, 1).unwrap()[0].id;

    let response = fixture
        .post(&format!("/api/v1/articles/{}/translation", article_id), json!({}))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["translated_title"], "Article about technology");
    assert_eq!(response.body["skipped"], false);

    let stored = fixture.store.get_article(article_id).unwrap().unwrap();
    assert_eq!(stored.translated_title, "Article about technology");
}

#[tokio::test]
async fn test_translation_endpoint_persists_title_when_skipped() {
    let fixture = TestFixture::new();

    let feed = fixture
        .store
        .add_feed("Local", "https://feeds.example.com/local.xml")
        .unwrap();
    fixture
        .store
        .save_articles(&[gazette_core::NewArticle {
            feed_id: feed.id,
            guid: "l-1".to_string(),
            title: "This is an article about technology.".to_string(),
            url: "https://example.com/articles/l-1".to_string(),
            ..Default::default()
        }])
        .unwrap();
    let article_id = fixture.store.list_articles(None, 1).unwrap()[0].id;

    let response = fixture
        .post(&format!("/api/v1/articles/{}/translation", article_id), json!({}))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["skipped"], true);
    assert_eq!(
        response.body["translated_title"],
        "This is an article about technology."
    );

    // The stored translation mirrors the title on the skip path.
    let stored = fixture.store.get_article(article_id).unwrap().unwrap();
    assert_eq!(
        stored.translated_title,
        "This is an article about technology."
    );
}

#[tokio::test]
async fn test_translation_endpoint_missing_article() {
    let fixture = TestFixture::new();

    let response = fixture.post("/api/v1/articles/999/translation", json!({})).await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_translation_endpoint_unconfigured() {
    let fixture = TestFixture::without_resolver();

    let response = fixture.post("/api/v1/articles/1/translation", json!({})).await;
    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();

    // Generate some traffic first
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("gazette_http_requests_total"));
}
