//! Refresh cycle API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use gazette_core::refresh::{PoolTask, QueuedTask};
use gazette_core::{Feed, ProgressSnapshot, RefreshError, RefreshReason};

use crate::state::AppState;

/// Default number of queued tasks returned by the queue endpoint.
const DEFAULT_QUEUE_LIMIT: usize = 50;

/// Request body for triggering a refresh. An empty body refreshes every
/// subscribed feed.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub feed_ids: Option<Vec<i64>>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub started: bool,
    pub feeds: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query parameters for the queue endpoint.
#[derive(Debug, Deserialize)]
pub struct QueueParams {
    pub limit: Option<usize>,
}

/// Start a refresh cycle over the requested feeds (all feeds when the body
/// names none). Returns 409 while another cycle is running.
pub async fn trigger_refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> Result<(StatusCode, Json<RefreshResponse>), (StatusCode, Json<ErrorResponse>)> {
    let feeds = match body.feed_ids {
        Some(ids) => {
            let mut feeds: Vec<Feed> = Vec::with_capacity(ids.len());
            for id in ids {
                match state.articles().get_feed(id) {
                    Ok(Some(feed)) => feeds.push(feed),
                    Ok(None) => {
                        return Err((
                            StatusCode::NOT_FOUND,
                            Json(ErrorResponse {
                                error: format!("feed not found: {}", id),
                            }),
                        ))
                    }
                    Err(e) => return Err(internal_error(e)),
                }
            }
            feeds
        }
        None => state.articles().list_feeds().map_err(internal_error)?,
    };

    let count = feeds.len();
    match state.scheduler().refresh(feeds, RefreshReason::Manual) {
        Ok(()) => Ok((
            StatusCode::ACCEPTED,
            Json(RefreshResponse {
                started: true,
                feeds: count,
            }),
        )),
        Err(RefreshError::AlreadyRunning) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "a refresh cycle is already running".to_string(),
            }),
        )),
        Err(e) => Err(internal_error(e)),
    }
}

/// Aggregate progress of the current (or most recent) cycle.
pub async fn get_progress(State(state): State<Arc<AppState>>) -> Json<ProgressSnapshot> {
    Json(state.scheduler().progress())
}

/// Feeds currently being refreshed.
pub async fn get_pool(State(state): State<Arc<AppState>>) -> Json<Vec<PoolTask>> {
    Json(state.scheduler().pool_tasks())
}

/// Feeds waiting for a pool slot, in promotion order.
pub async fn get_queue(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueueParams>,
) -> Json<Vec<QueuedTask>> {
    let limit = params.limit.unwrap_or(DEFAULT_QUEUE_LIMIT);
    Json(state.scheduler().queue_tasks(limit))
}

fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
