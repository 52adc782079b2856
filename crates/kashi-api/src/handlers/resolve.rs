// SPDX-License-Identifier: GPL-3.0-or-later
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kashi_matching::AppState;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{debug_enabled, ErrorResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ResolveParams {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// `1` attaches the matching trace.
    pub debug: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResolveResponse {
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub trace: Option<serde_json::Value>,
}

/// Resolve a lyrics page for a raw title/artist pair.
#[utoipa::path(
    get,
    path = "/api/v1/resolve",
    params(ResolveParams),
    responses(
        (status = 200, description = "Resolved URL, null when nothing matched", body = ResolveResponse),
        (status = 400, description = "Missing title", body = ErrorResponse)
    ),
    tag = "resolve"
)]
pub async fn resolve(State(state): State<AppState>, Query(params): Query<ResolveParams>) -> Response {
    let Some(title) = params.title.filter(|title| !title.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Title is required")),
        )
            .into_response();
    };
    let artist = params.artist.unwrap_or_default();
    let debug = debug_enabled(params.debug.as_deref());

    let resolution = state.tracks.resolve(&title, &artist, debug).await;
    Json(ResolveResponse {
        url: resolution.url,
        trace: resolution
            .trace
            .as_ref()
            .and_then(|trace| serde_json::to_value(trace).ok()),
    })
    .into_response()
}
