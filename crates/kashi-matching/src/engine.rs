// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;

use kashi_config::MatchingConfig;
use kashi_domain::{CandidateDecision, MatchStrategy, Query, SearchHit};

use crate::artist::ArtistMatcher;
use crate::cache::MatchCache;
use crate::canonicalize::{Canonicalizer, ParsedTitle};
use crate::compare::TitleComparator;
use crate::evaluator::{CandidateEvaluator, MatchContext};
use crate::planner::QueryPlanner;
use crate::variants::{TitleVariants, VariantGenerator};
use crate::vocabulary::Vocabulary;

/// Every matching component wired to one vocabulary and one memo cache.
#[derive(Clone)]
pub struct MatchEngine {
    vocab: Arc<Vocabulary>,
    cache: MatchCache,
    generator: VariantGenerator,
    planner: QueryPlanner,
    evaluator: CandidateEvaluator,
    strategy: MatchStrategy,
}

impl MatchEngine {
    pub fn new(config: &MatchingConfig) -> Self {
        Self::with_vocabulary(
            Vocabulary::with_overrides(&config.vocabulary),
            config.strategy,
            config.min_token_overlap,
            MatchCache::new(config.cache_capacity),
        )
    }

    pub fn with_vocabulary(
        vocab: Vocabulary,
        strategy: MatchStrategy,
        min_token_overlap: f32,
        cache: MatchCache,
    ) -> Self {
        let vocab = Arc::new(vocab);
        let canonicalizer = Canonicalizer::new(vocab.clone(), cache.clone());
        let generator = VariantGenerator::new(canonicalizer.clone(), cache.clone());
        let comparator = TitleComparator::new(canonicalizer, strategy, min_token_overlap);
        let artists = ArtistMatcher::new(vocab.clone(), cache.clone());
        let evaluator =
            CandidateEvaluator::new(vocab.clone(), generator.clone(), comparator, artists);

        Self {
            vocab,
            cache,
            generator,
            planner: QueryPlanner::new(),
            evaluator,
            strategy,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn cache(&self) -> &MatchCache {
        &self.cache
    }

    pub fn canonicalize(&self, raw: &str, artist: Option<&str>) -> String {
        self.generator.canonicalizer().canonicalize(raw, artist)
    }

    pub fn parse(&self, raw: &str, artist: Option<&str>) -> ParsedTitle {
        self.generator.canonicalizer().parse(raw, artist)
    }

    pub fn variants(&self, raw: &str, artist: Option<&str>) -> Arc<TitleVariants> {
        self.generator.variants(raw, artist)
    }

    pub fn plan(&self, variants: &TitleVariants, artist: &str) -> Vec<Query> {
        self.planner.plan(variants, artist)
    }

    pub fn context(&self, title: &str, artist: &str) -> MatchContext {
        self.evaluator.context(title, artist)
    }

    pub fn evaluate(&self, ctx: &MatchContext, query: &Query, hit: &SearchHit) -> CandidateDecision {
        self.evaluator.evaluate(ctx, query, hit)
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kashi_config::VocabularyOverrides;

    #[test]
    fn config_overrides_reach_the_vocabulary() {
        let config = MatchingConfig {
            strategy: MatchStrategy::Strict,
            cache_capacity: 0,
            vocabulary: VocabularyOverrides {
                extra_bracket_triggers: vec!["dance practice".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let engine = MatchEngine::new(&config);
        assert_eq!(engine.strategy(), MatchStrategy::Strict);
        assert!(!engine.cache().is_enabled());
        assert_eq!(engine.canonicalize("Song (Dance Practice)", None), "song");
    }

    #[test]
    fn context_carries_prefix_stripped_variants() {
        let engine = MatchEngine::default();
        let ctx = engine.context("Artist - Song (Official Music Video)", "Artist");
        assert!(ctx.variants.contains("song"));
        assert_eq!(ctx.original_title, "Artist - Song (Official Music Video)");
    }
}
