// SPDX-License-Identifier: GPL-3.0-or-later

//! Reads the music card YouTube attaches to a video's structured description.

use kashi_domain::VideoMetadata;
use reqwest::{header, Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

const YOUTUBE_BASE: &str = "https://www.youtube.com";
const STRUCTURED_DESCRIPTION_PANEL: &str = "engagement-panel-structured-description";
const INITIAL_DATA_MARKERS: [&str; 3] = [
    "var ytInitialData = ",
    "window[\"ytInitialData\"] = ",
    "ytInitialData = ",
];

#[derive(Debug, Clone)]
pub struct YoutubeClient {
    client: Client,
    base_url: String,
}

impl YoutubeClient {
    pub fn new() -> Result<Self, YoutubeError> {
        Self::builder().build()
    }

    pub fn builder() -> YoutubeClientBuilder {
        YoutubeClientBuilder::default()
    }

    /// Fetch the song card for a video. `Ok(None)` means the video has no music card.
    #[instrument(skip(self), target = "youtube")]
    pub async fn fetch_song_card(
        &self,
        video_id: &str,
    ) -> Result<Option<VideoMetadata>, YoutubeError> {
        if !is_valid_video_id(video_id) {
            return Err(YoutubeError::InvalidVideoId(video_id.to_string()));
        }

        let mut url = Url::parse(&format!("{}/watch", self.base_url))
            .map_err(|source| YoutubeError::InvalidBaseUrl(source.to_string()))?;
        url.query_pairs_mut().append_pair("v", video_id);

        debug!(target: "youtube", url = %url, "fetching watch page");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(YoutubeError::HttpStatus { status, body });
        }

        let initial_data = extract_initial_data(&body)?;
        let card = parse_song_card(&initial_data);
        debug!(target: "youtube", found = card.is_some(), "song card lookup finished");
        Ok(card)
    }
}

#[derive(Debug)]
pub struct YoutubeClientBuilder {
    base_url: String,
    timeout: Duration,
}

impl Default for YoutubeClientBuilder {
    fn default() -> Self {
        Self {
            base_url: YOUTUBE_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl YoutubeClientBuilder {
    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<YoutubeClient, YoutubeError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("kashi/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(YoutubeClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum YoutubeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),
    #[error("Watch page did not contain initial data")]
    MissingInitialData,
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

fn is_valid_video_id(video_id: &str) -> bool {
    !video_id.is_empty()
        && video_id.len() <= 64
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Pull the `ytInitialData` object out of a watch page.
pub fn extract_initial_data(html: &str) -> Result<Value, YoutubeError> {
    for marker in INITIAL_DATA_MARKERS {
        let Some(start) = html.find(marker) else {
            continue;
        };
        let rest = &html[start + marker.len()..];
        // The object is followed by `;</script>`, so only the first value is read.
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        return match stream.next() {
            Some(value) => Ok(value?),
            None => Err(YoutubeError::MissingInitialData),
        };
    }
    Err(YoutubeError::MissingInitialData)
}

/// Walk the structured-description panel down to the first music card.
pub fn parse_song_card(initial_data: &Value) -> Option<VideoMetadata> {
    let panel = initial_data
        .get("engagementPanels")?
        .as_array()?
        .iter()
        .find(|panel| {
            panel
                .pointer("/engagementPanelSectionListRenderer/panelIdentifier")
                .and_then(Value::as_str)
                == Some(STRUCTURED_DESCRIPTION_PANEL)
        })?;

    let card = panel
        .pointer("/engagementPanelSectionListRenderer/content/structuredDescriptionContentRenderer/items")?
        .as_array()?
        .iter()
        .find_map(|item| item.get("horizontalCardListRenderer"))?
        .pointer("/cards/0/videoAttributeViewModel")?;

    let title = text_of(card.get("title")?)?;
    let artist = card.get("subtitle").and_then(text_of).unwrap_or_default();
    let thumbnail_url = card
        .pointer("/image/sources/0/url")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(VideoMetadata {
        title,
        artist,
        thumbnail_url,
    })
}

// View models carry either a bare string or `{ "content": "..." }`.
fn text_of(value: &Value) -> Option<String> {
    value
        .as_str()
        .or_else(|| value.get("content").and_then(Value::as_str))
        .map(str::to_string)
}
