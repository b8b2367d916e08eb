//! Settings API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SettingResponse {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SetSettingBody {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn get_setting(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<SettingResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.settings().get_setting(&key) {
        Ok(Some(value)) => Ok(Json(SettingResponse { key, value })),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("setting not found: {}", key),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

pub async fn set_setting(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<SetSettingBody>,
) -> Result<Json<SettingResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.settings().set_setting(&key, &body.value) {
        Ok(()) => Ok(Json(SettingResponse {
            key,
            value: body.value,
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
