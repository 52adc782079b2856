// SPDX-License-Identifier: GPL-3.0-or-later

//! Genius search API client.

use kashi_domain::SearchHit;
use moka::sync::Cache;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

const GENIUS_API_BASE: &str = "https://api.genius.com";

pub struct GeniusClient {
    client: Client,
    access_token: Option<String>,
    rate_limiter: Arc<Semaphore>,
    cache: Cache<String, Vec<SearchHit>>,
    base_url: String,
}

impl GeniusClient {
    /// Create a client against the public API with default limits.
    pub fn new(access_token: Option<String>) -> Result<Self, GeniusError> {
        Self::builder().access_token(access_token).build()
    }

    pub fn new_with_base_url(
        access_token: Option<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GeniusError> {
        Self::builder()
            .access_token(access_token)
            .base_url(base_url)
            .build()
    }

    pub fn builder() -> GeniusClientBuilder {
        GeniusClientBuilder::default()
    }

    /// Whether a credential is present. Without one no request is ever issued.
    pub fn has_access_token(&self) -> bool {
        self.access_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    /// Search songs; hits come back in Genius' own relevance order.
    #[instrument(skip(self), target = "genius")]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, GeniusError> {
        let token = self
            .access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or(GeniusError::MissingAccessToken)?;

        let cache_key = query.to_string();
        if let Some(cached) = self.cache.get(&cache_key) {
            debug!(target: "genius", hits = cached.len(), "search served from cache");
            return Ok(cached);
        }

        let _permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|_| GeniusError::RateLimiterClosed)?;

        let mut url = Url::parse(&format!("{}/search", self.base_url))
            .map_err(|source| GeniusError::InvalidBaseUrl(source.to_string()))?;
        url.query_pairs_mut().append_pair("q", query);

        debug!(target: "genius", url = %url, "searching songs");

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        let response_body = response.text().await?;
        let hits = parse_search_body(status, &response_body)?;

        debug!(target: "genius", hits = hits.len(), "search completed");
        self.cache.insert(cache_key, hits.clone());
        Ok(hits)
    }
}

/// Builder for configuring a Genius client.
#[derive(Debug)]
pub struct GeniusClientBuilder {
    access_token: Option<String>,
    base_url: String,
    timeout: Duration,
    max_concurrent_requests: usize,
    cache_capacity: u64,
}

impl Default for GeniusClientBuilder {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: GENIUS_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
            max_concurrent_requests: 4,
            cache_capacity: 512,
        }
    }
}

impl GeniusClientBuilder {
    pub fn access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    pub fn cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<GeniusClient, GeniusError> {
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(GeniusClient {
            client,
            access_token: self.access_token,
            rate_limiter: Arc::new(Semaphore::new(self.max_concurrent_requests.max(1))),
            cache: Cache::new(self.cache_capacity),
            base_url: self.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum GeniusError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("No Genius access token configured")]
    MissingAccessToken,
    #[error("Rate limiter closed")]
    RateLimiterClosed,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    response: Option<SearchPayload>,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    result: Option<RawSong>,
}

#[derive(Debug, Deserialize)]
struct RawSong {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    full_title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    primary_artist: Option<RawArtist>,
}

#[derive(Debug, Deserialize)]
struct RawArtist {
    #[serde(default)]
    name: Option<String>,
}

fn parse_search_body(status: StatusCode, response_body: &str) -> Result<Vec<SearchHit>, GeniusError> {
    if !status.is_success() {
        return Err(GeniusError::HttpStatus {
            status,
            body: response_body.to_string(),
        });
    }

    let envelope: SearchEnvelope = serde_json::from_str(response_body)?;
    let hits = envelope
        .response
        .map(|payload| payload.hits)
        .unwrap_or_default()
        .into_iter()
        .filter(|hit| hit.kind.as_deref().map_or(true, |kind| kind == "song"))
        .filter_map(|hit| hit.result)
        .map(into_search_hit)
        .collect();

    Ok(hits)
}

// Missing fields become empty strings; the evaluator rejects such hits on its own.
fn into_search_hit(song: RawSong) -> SearchHit {
    let id = match song.id {
        Some(Value::String(id)) => id,
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    };

    SearchHit {
        id,
        title: song.title.unwrap_or_default(),
        full_title: song.full_title,
        artist_name: song
            .primary_artist
            .and_then(|artist| artist.name)
            .unwrap_or_default(),
        url: song.url.unwrap_or_default(),
    }
}
