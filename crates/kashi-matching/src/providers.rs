// SPDX-License-Identifier: GPL-3.0-or-later

//! Seams to the search and video-metadata collaborators.

use anyhow::Result;
use async_trait::async_trait;
use kashi_domain::{SearchHit, VideoMetadata};
use kashi_metadata::{GeniusClient, YoutubeClient};

/// Lyrics search. Hits must come back in the provider's relevance order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Without credentials no search is attempted at all.
    fn is_configured(&self) -> bool;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Song card lookup for a video; `Ok(None)` when the video carries no music card.
#[async_trait]
pub trait VideoMetadataProvider: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Option<VideoMetadata>>;
}

#[async_trait]
impl SearchProvider for GeniusClient {
    fn is_configured(&self) -> bool {
        self.has_access_token()
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        Ok(GeniusClient::search(self, query).await?)
    }
}

#[async_trait]
impl VideoMetadataProvider for YoutubeClient {
    async fn fetch(&self, video_id: &str) -> Result<Option<VideoMetadata>> {
        Ok(self.fetch_song_card(video_id).await?)
    }
}
