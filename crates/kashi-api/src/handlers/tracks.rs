// SPDX-License-Identifier: GPL-3.0-or-later
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kashi_matching::{AppState, TrackLookup, TrackLookupError};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use super::{debug_enabled, ErrorResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct TrackParams {
    /// YouTube video id.
    pub v: Option<String>,
    /// `1` attaches the matching trace.
    pub debug: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotASongResponse {
    pub song: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SongResponse {
    pub song: bool,
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Lyrics page, or null when nothing matched.
    pub genius_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub debug: Option<serde_json::Value>,
}

/// Look up the song card of a video and resolve its lyrics page.
#[utoipa::path(
    get,
    path = "/track",
    params(TrackParams),
    responses(
        (status = 200, description = "Song card with resolved lyrics URL, or `{song: false}`", body = SongResponse),
        (status = 400, description = "Missing video id", body = ErrorResponse),
        (status = 500, description = "Video metadata could not be fetched", body = ErrorResponse)
    ),
    tag = "tracks"
)]
pub async fn get_track(State(state): State<AppState>, Query(params): Query<TrackParams>) -> Response {
    let video_id = params.v.unwrap_or_default();
    let debug = debug_enabled(params.debug.as_deref());

    match state.tracks.lookup(&video_id, debug).await {
        Ok(TrackLookup::NotASong) => Json(NotASongResponse { song: false }).into_response(),
        Ok(TrackLookup::Song {
            metadata,
            resolution,
        }) => {
            info!(target: "api", %video_id, matched = resolution.is_match(), "track resolved");
            let debug = resolution
                .trace
                .as_ref()
                .and_then(|trace| serde_json::to_value(trace).ok());
            Json(SongResponse {
                song: true,
                title: metadata.title,
                artist: metadata.artist,
                thumbnail: metadata.thumbnail_url,
                genius_url: resolution.url,
                debug,
            })
            .into_response()
        }
        Err(TrackLookupError::MissingVideoId) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Video ID is required")),
        )
            .into_response(),
        Err(TrackLookupError::VideoMetadata(detail)) => {
            error!(target: "api", %video_id, %detail, "video metadata lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to fetch video info").with_detail(detail)),
            )
                .into_response()
        }
    }
}
