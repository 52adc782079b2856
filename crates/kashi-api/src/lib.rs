// SPDX-License-Identifier: GPL-3.0-or-later
pub mod handlers;

use axum::{routing::get, Json, Router};
use handlers::resolve::{resolve, ResolveResponse, __path_resolve};
use handlers::tracks::{get_track, NotASongResponse, SongResponse, __path_get_track};
use handlers::ErrorResponse;
use kashi_matching::AppState;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize, utoipa::ToSchema)]
struct HealthResponse {
    status: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(OpenApi)]
#[openapi(
    paths(health, get_track, resolve),
    components(
        schemas(
            HealthResponse,
            SongResponse,
            NotASongResponse,
            ResolveResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "tracks", description = "Video song card and lyrics lookup"),
        (name = "resolve", description = "Direct access to title matching")
    ),
    info(
        title = "Kashi API",
        version = "0.1.0",
        description = "Resolves lyrics pages for music videos",
    )
)]
struct ApiDoc;

pub fn router(state: AppState) -> Router {
    info!(target: "api", "building router");

    let api_v1 = Router::new().route("/resolve", get(resolve));
    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/health", get(health))
        .route("/track", get(get_track))
        .nest("/api/v1", api_v1)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", openapi))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use kashi_config::AppConfig;
    use kashi_domain::{SearchHit, VideoMetadata};
    use kashi_matching::{
        MatchEngine, Resolver, SearchProvider, TrackService, VideoMetadataProvider,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    struct StubVideos;

    #[async_trait]
    impl VideoMetadataProvider for StubVideos {
        async fn fetch(&self, video_id: &str) -> anyhow::Result<Option<VideoMetadata>> {
            match video_id {
                "song" => Ok(Some(VideoMetadata {
                    title: "Artist - Song (Official Music Video)".to_string(),
                    artist: "Artist".to_string(),
                    thumbnail_url: Some("https://i.ytimg.com/thumb.jpg".to_string()),
                })),
                "vlog" => Ok(None),
                _ => Err(anyhow!("HTTP status 500")),
            }
        }
    }

    struct StubSearch {
        configured: bool,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn search(&self, _query: &str) -> anyhow::Result<Vec<SearchHit>> {
            Ok(vec![SearchHit {
                id: "1".to_string(),
                title: "Song".to_string(),
                full_title: Some("Song by Artist".to_string()),
                artist_name: "Artist".to_string(),
                url: "https://genius.com/Artist-song-lyrics".to_string(),
            }])
        }
    }

    fn app(configured: bool) -> Router {
        let resolver = Resolver::new(
            Arc::new(MatchEngine::default()),
            Arc::new(StubSearch { configured }),
        );
        let tracks = TrackService::new(Arc::new(StubVideos), resolver, None);
        router(AppState::new(AppConfig::default(), tracks))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(true), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_track_requires_video_id() {
        let (status, body) = get(app(true), "/track").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Video ID is required" }));
    }

    #[tokio::test]
    async fn test_track_resolves_song() {
        let (status, body) = get(app(true), "/track?v=song").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["song"], true);
        assert_eq!(body["title"], "Artist - Song (Official Music Video)");
        assert_eq!(body["thumbnail"], "https://i.ytimg.com/thumb.jpg");
        assert_eq!(body["genius_url"], "https://genius.com/Artist-song-lyrics");
        assert!(body.get("debug").is_none());
    }

    #[tokio::test]
    async fn test_track_debug_trace() {
        let (_, body) = get(app(true), "/track?v=song&debug=1").await;
        let steps = body["debug"]["steps"].as_array().unwrap();
        assert_eq!(steps[0]["query"]["label"], "base_with_artist");
        assert_eq!(steps[0]["examined"][0]["outcome"], "accept");
    }

    #[tokio::test]
    async fn test_track_without_token_returns_null_url() {
        let (status, body) = get(app(false), "/track?v=song&debug=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["genius_url"], Value::Null);
        assert_eq!(body["debug"]["reason"], "no_token");
    }

    #[tokio::test]
    async fn test_track_not_a_song() {
        let (status, body) = get(app(true), "/track?v=vlog").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "song": false }));
    }

    #[tokio::test]
    async fn test_track_metadata_failure() {
        let (status, body) = get(app(true), "/track?v=broken").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch video info");
        assert!(body["detail"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_resolve_endpoint() {
        let (status, body) = get(app(true), "/api/v1/resolve?title=Song&artist=Artist").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "url": "https://genius.com/Artist-song-lyrics" }));

        let (status, _) = get(app(true), "/api/v1/resolve?artist=Artist").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://www.youtube.com")
            .body(Body::empty())
            .unwrap();
        let response = app(true).oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
