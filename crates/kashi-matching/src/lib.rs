// SPDX-License-Identifier: GPL-3.0-or-later
pub mod artist;
pub mod cache;
pub mod canonicalize;
pub mod compare;
pub mod engine;
pub mod evaluator;
pub mod parens;
pub mod planner;
pub mod providers;
pub mod recorder;
pub mod resolver;
pub mod text;
pub mod tracks;
pub mod variants;
pub mod vocabulary;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use kashi_config::AppConfig;
use kashi_metadata::{GeniusClient, YoutubeClient};
use tracing::info;

pub use artist::ArtistMatcher;
pub use cache::MatchCache;
pub use canonicalize::{Canonicalizer, ParsedTitle};
pub use compare::TitleComparator;
pub use engine::MatchEngine;
pub use evaluator::{CandidateEvaluator, MatchContext};
pub use parens::{Paren, ParenClassifier};
pub use planner::QueryPlanner;
pub use providers::{SearchProvider, VideoMetadataProvider};
pub use recorder::DecisionRecorder;
pub use resolver::Resolver;
pub use tracks::{TrackLookup, TrackLookupError, TrackService};
pub use variants::{AlternateTitle, TitleVariants, VariantGenerator};
pub use vocabulary::{MarkerSet, Vocabulary, VOCABULARY_VERSION};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub tracks: Arc<TrackService>,
}

impl AppState {
    pub fn new(config: AppConfig, tracks: TrackService) -> Self {
        Self {
            config,
            tracks: Arc::new(tracks),
        }
    }

    /// Wire the Genius and YouTube clients and the matching engine from configuration.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let mut genius = GeniusClient::builder()
            .access_token(config.genius.access_token.clone())
            .timeout(Duration::from_secs(config.genius.timeout_secs))
            .max_concurrent_requests(config.genius.max_concurrent_requests)
            .cache_capacity(config.genius.cache_capacity);
        if let Some(base_url) = &config.genius.base_url {
            genius = genius.base_url(base_url.clone());
        }

        let mut youtube =
            YoutubeClient::builder().timeout(Duration::from_secs(config.youtube.timeout_secs));
        if let Some(base_url) = &config.youtube.base_url {
            youtube = youtube.base_url(base_url.clone());
        }

        let engine = Arc::new(MatchEngine::new(&config.matching));
        let resolver = Resolver::new(engine, Arc::new(genius.build()?));
        let resolve_timeout = match config.matching.resolve_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let tracks = TrackService::new(Arc::new(youtube.build()?), resolver, resolve_timeout);

        Ok(Self::new(config, tracks))
    }

    pub fn on_start(&self) {
        info!(
            target: "application",
            strategy = %self.config.matching.strategy,
            vocabulary_version = VOCABULARY_VERSION,
            "application state initialized"
        );
    }
}
