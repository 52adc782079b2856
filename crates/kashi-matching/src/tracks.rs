// SPDX-License-Identifier: GPL-3.0-or-later

//! Video id in, song card plus lyrics URL out.

use std::sync::Arc;
use std::time::Duration;

use kashi_domain::{Resolution, VideoMetadata};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::providers::VideoMetadataProvider;
use crate::recorder::DecisionRecorder;
use crate::resolver::Resolver;

#[derive(Debug, Clone)]
pub enum TrackLookup {
    /// The video has no music card.
    NotASong,
    Song {
        metadata: VideoMetadata,
        resolution: Resolution,
    },
}

#[derive(Debug, Error)]
pub enum TrackLookupError {
    #[error("Video ID is required")]
    MissingVideoId,
    #[error("Failed to fetch video info: {0}")]
    VideoMetadata(String),
}

#[derive(Clone)]
pub struct TrackService {
    videos: Arc<dyn VideoMetadataProvider>,
    resolver: Resolver,
    resolve_timeout: Option<Duration>,
}

impl TrackService {
    pub fn new(
        videos: Arc<dyn VideoMetadataProvider>,
        resolver: Resolver,
        resolve_timeout: Option<Duration>,
    ) -> Self {
        Self {
            videos,
            resolver,
            resolve_timeout,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    #[instrument(skip(self), target = "resolver")]
    pub async fn lookup(
        &self,
        video_id: &str,
        want_trace: bool,
    ) -> Result<TrackLookup, TrackLookupError> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(TrackLookupError::MissingVideoId);
        }

        let metadata = self
            .videos
            .fetch(video_id)
            .await
            .map_err(|error| TrackLookupError::VideoMetadata(error.to_string()))?;
        let Some(metadata) = metadata else {
            info!(target: "resolver", video_id, "video has no music card");
            return Ok(TrackLookup::NotASong);
        };

        let resolution = self.resolve(&metadata.title, &metadata.artist, want_trace).await;
        Ok(TrackLookup::Song {
            metadata,
            resolution,
        })
    }

    /// Resolve under the configured deadline. Running out of time is a no-match whose
    /// trace, when requested, carries the reason `timeout`.
    pub async fn resolve(&self, title: &str, artist: &str, want_trace: bool) -> Resolution {
        let Some(limit) = self.resolve_timeout else {
            return self.resolver.resolve(title, artist, want_trace).await;
        };
        match tokio::time::timeout(limit, self.resolver.resolve(title, artist, want_trace)).await {
            Ok(resolution) => resolution,
            Err(_) => {
                warn!(target: "resolver", title, artist, timeout_secs = limit.as_secs(), "resolve timed out");
                let mut recorder = DecisionRecorder::new(
                    want_trace,
                    title,
                    artist,
                    self.resolver.engine().strategy(),
                );
                recorder.set_reason("timeout");
                Resolution {
                    url: None,
                    trace: recorder.finish(None, false),
                }
            }
        }
    }
}
