// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use kashi_domain::MatchStrategy;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeniusConfig {
    /// Without a token every resolve short-circuits to "no match".
    pub access_token: Option<String>,
    pub base_url: Option<String>,
    pub max_concurrent_requests: usize,
    pub timeout_secs: u64,
    pub cache_capacity: u64,
}

impl Default for GeniusConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: None,
            max_concurrent_requests: 4,
            timeout_secs: 10,
            cache_capacity: 512,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
        }
    }
}

/// Additions to the built-in matching vocabulary tables.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct VocabularyOverrides {
    pub extra_noise_words: Vec<String>,
    pub extra_descriptor_words: Vec<String>,
    pub extra_bracket_triggers: Vec<String>,
    pub extra_bad_words: Vec<String>,
    pub extra_romanized_markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub strategy: MatchStrategy,
    pub min_token_overlap: f32,
    pub cache_capacity: u64,
    /// Deadline for a whole resolve; 0 disables it.
    pub resolve_timeout_secs: u64,
    pub vocabulary: VocabularyOverrides,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::Lenient,
            min_token_overlap: 0.6,
            cache_capacity: 256,
            resolve_timeout_secs: 20,
            vocabulary: VocabularyOverrides::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub telemetry: TelemetryConfig,
    pub genius: GeniusConfig,
    pub youtube: YoutubeConfig,
    pub matching: MatchingConfig,
}

/// Load configuration from defaults, optional TOML file, the bare `GENIUS_ACCESS_TOKEN`
/// variable, and environment overrides (prefix: KASHI_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment
        .merge(
            Env::raw()
                .only(&["GENIUS_ACCESS_TOKEN"])
                .map(|_| "genius.access_token".into()),
        )
        .merge(Env::prefixed("KASHI_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(
        target: "config",
        strategy = %config.matching.strategy,
        genius_configured = config.genius.access_token.is_some(),
        "configuration loaded"
    );
    Ok(config)
}
