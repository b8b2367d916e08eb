//! Feed and article API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use gazette_core::translation::Resolution;
use gazette_core::{Article, Feed, StoreError};

use crate::state::AppState;

/// Default number of articles returned by the list endpoint.
const DEFAULT_ARTICLE_LIMIT: usize = 100;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Request body for subscribing to a feed.
#[derive(Debug, Deserialize)]
pub struct AddFeedBody {
    pub title: String,
    pub url: String,
}

/// Query parameters for listing articles.
#[derive(Debug, Deserialize)]
pub struct ListArticlesParams {
    pub feed_id: Option<i64>,
    pub limit: Option<usize>,
}

/// Response for the per-article translation endpoint.
#[derive(Debug, Serialize)]
pub struct TranslationResponse {
    pub article_id: i64,
    pub translated_title: String,
    pub skipped: bool,
    pub limit_reached: bool,
}

pub async fn list_feeds(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Feed>>, (StatusCode, Json<ErrorResponse>)> {
    let feeds = state.articles().list_feeds().map_err(internal_error)?;
    Ok(Json(feeds))
}

pub async fn add_feed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddFeedBody>,
) -> Result<(StatusCode, Json<Feed>), (StatusCode, Json<ErrorResponse>)> {
    if body.url.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "feed url must not be empty".to_string(),
            }),
        ));
    }
    let feed = state
        .articles()
        .add_feed(&body.title, &body.url)
        .map_err(internal_error)?;
    Ok((StatusCode::CREATED, Json(feed)))
}

pub async fn remove_feed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.articles().remove_feed(id) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::FeedNotFound(id)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("feed not found: {}", id),
            }),
        )),
        Err(e) => Err(internal_error(e)),
    }
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListArticlesParams>,
) -> Result<Json<Vec<Article>>, (StatusCode, Json<ErrorResponse>)> {
    let limit = params.limit.unwrap_or(DEFAULT_ARTICLE_LIMIT);
    let articles = state
        .articles()
        .list_articles(params.feed_id, limit)
        .map_err(internal_error)?;
    Ok(Json(articles))
}

/// Re-resolve the translation for one article's title and persist the result.
pub async fn update_translation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TranslationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(resolver) = state.resolver() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "translation is not configured".to_string(),
            }),
        ));
    };

    let article = match state.articles().get_article(id) {
        Ok(Some(article)) => article,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("article not found: {}", id),
                }),
            ))
        }
        Err(e) => return Err(internal_error(e)),
    };

    let target = state
        .settings()
        .get_setting("target_language")
        .map_err(internal_error)?
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "en".to_string());

    let resolution: Resolution = resolver
        .translate(&article.title, &target)
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    // A skipped resolution carries the original title; persisted as-is.
    state
        .articles()
        .update_translation(id, &resolution.text)
        .map_err(internal_error)?;

    Ok(Json(TranslationResponse {
        article_id: id,
        translated_title: resolution.text,
        skipped: resolution.skipped,
        limit_reached: resolution.limit_reached,
    }))
}

fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
