use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{articles, handlers, refresh, settings};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Refresh cycle
        .route("/refresh", post(refresh::trigger_refresh))
        .route("/refresh/progress", get(refresh::get_progress))
        .route("/refresh/pool", get(refresh::get_pool))
        .route("/refresh/queue", get(refresh::get_queue))
        // Feeds
        .route("/feeds", get(articles::list_feeds))
        .route("/feeds", post(articles::add_feed))
        .route("/feeds/{id}", delete(articles::remove_feed))
        // Articles
        .route("/articles", get(articles::list_articles))
        .route("/articles/{id}/translation", post(articles::update_translation))
        // Settings
        .route("/settings/{key}", get(settings::get_setting))
        .route("/settings/{key}", put(settings::set_setting))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(super::middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
