// SPDX-License-Identifier: GPL-3.0-or-later

//! Accept / penalize / reject verdicts for individual search hits.

use std::sync::Arc;

use kashi_domain::{CandidateDecision, Outcome, Query, RejectReason, SearchHit};
use tracing::trace;

use crate::artist::ArtistMatcher;
use crate::compare::TitleComparator;
use crate::variants::{TitleVariants, VariantGenerator};
use crate::vocabulary::Vocabulary;

/// The title/artist being resolved, prepared once per resolve.
#[derive(Debug, Clone)]
pub struct MatchContext {
    pub original_title: String,
    pub artist: String,
    pub variants: Arc<TitleVariants>,
}

#[derive(Clone)]
pub struct CandidateEvaluator {
    vocab: Arc<Vocabulary>,
    generator: VariantGenerator,
    comparator: TitleComparator,
    artists: ArtistMatcher,
}

impl CandidateEvaluator {
    pub fn new(
        vocab: Arc<Vocabulary>,
        generator: VariantGenerator,
        comparator: TitleComparator,
        artists: ArtistMatcher,
    ) -> Self {
        Self {
            vocab,
            generator,
            comparator,
            artists,
        }
    }

    pub fn context(&self, title: &str, artist: &str) -> MatchContext {
        let artist_hint = Some(artist).filter(|a| !a.trim().is_empty());
        MatchContext {
            original_title: title.to_string(),
            artist: artist.to_string(),
            variants: self.generator.variants(title, artist_hint),
        }
    }

    pub fn evaluate(&self, ctx: &MatchContext, query: &Query, hit: &SearchHit) -> CandidateDecision {
        let (outcome, penalized) = self.judge(ctx, query, hit);
        trace!(
            target: "matching",
            query = %query.label,
            candidate = %hit.display_title(),
            artist = %hit.artist_name,
            %outcome,
            "candidate evaluated"
        );
        CandidateDecision::new(hit, query, outcome, penalized)
    }

    fn judge(&self, ctx: &MatchContext, query: &Query, hit: &SearchHit) -> (Outcome, bool) {
        let title = hit.display_title();

        if self.vocab.non_song_markers().find(title).is_some() {
            return (Outcome::Reject(RejectReason::NonSongContent), false);
        }
        if self
            .vocab
            .bad_words()
            .introduced(title, &ctx.original_title)
            .is_some()
        {
            return (Outcome::Reject(RejectReason::BadWord), false);
        }
        if query.require_artist_match && !self.artists.matches(&ctx.artist, &hit.artist_name) {
            return (Outcome::Reject(RejectReason::ArtistMismatch), false);
        }

        let penalized = self
            .vocab
            .romanized_page_markers()
            .introduced(title, &ctx.original_title)
            .is_some();

        if !self.titles_agree(ctx, query, hit) {
            return (Outcome::Reject(RejectReason::TitleMismatch), penalized);
        }
        if penalized {
            return (Outcome::Penalized, true);
        }
        (Outcome::Accept, false)
    }

    fn titles_agree(&self, ctx: &MatchContext, query: &Query, hit: &SearchHit) -> bool {
        let candidate_artist = Some(hit.artist_name.as_str()).filter(|a| !a.trim().is_empty());
        let candidate = self.generator.variants(hit.display_title(), candidate_artist);
        if candidate.is_empty() {
            return false;
        }
        if self.comparator.same_title(&ctx.variants, &candidate) {
            return true;
        }
        let from_query = self.generator.variants(&query.title, None);
        self.comparator.same_title(&from_query, &candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MatchCache;
    use crate::canonicalize::Canonicalizer;
    use kashi_domain::MatchStrategy;

    fn evaluator() -> CandidateEvaluator {
        let vocab = Arc::new(Vocabulary::default());
        let cache = MatchCache::new(64);
        let canonicalizer = Canonicalizer::new(vocab.clone(), cache.clone());
        CandidateEvaluator::new(
            vocab.clone(),
            VariantGenerator::new(canonicalizer.clone(), cache.clone()),
            TitleComparator::new(canonicalizer, MatchStrategy::Lenient, 0.6),
            ArtistMatcher::new(vocab, cache),
        )
    }

    fn hit(title: &str, artist: &str) -> SearchHit {
        SearchHit {
            id: "1".to_string(),
            title: title.to_string(),
            full_title: None,
            artist_name: artist.to_string(),
            url: "https://genius.com/x".to_string(),
        }
    }

    fn outcome(original: &str, query: &Query, title: &str, artist: &str) -> CandidateDecision {
        let e = evaluator();
        let ctx = e.context(original, "Artist");
        e.evaluate(&ctx, query, &hit(title, artist))
    }

    #[test]
    fn accepts_matching_song() {
        let query = Query::with_artist("base_with_artist", "song", "Artist");
        let decision = outcome("Artist - Song (Official Music Video)", &query, "Song", "Artist");
        assert_eq!(decision.outcome, Outcome::Accept);
        assert_eq!(decision.used_query_label, "base_with_artist");
        assert!(!decision.penalized);
    }

    #[test]
    fn non_song_content_is_rejected_first() {
        let query = Query::title_only("base_title_only", "song");
        let decision = outcome("Song", &query, "Song (Interview)", "Artist");
        assert_eq!(decision.outcome, Outcome::Reject(RejectReason::NonSongContent));
    }

    #[test]
    fn bad_words_are_asymmetric() {
        let query = Query::with_artist("base_with_artist", "song", "Artist");
        let rejected = outcome("Song", &query, "Song (Karaoke)", "Artist");
        assert_eq!(rejected.outcome, Outcome::Reject(RejectReason::BadWord));

        let accepted = outcome("Song Karaoke", &query, "Song (Karaoke)", "Artist");
        assert!(accepted.outcome.is_accept(), "got {}", accepted.outcome);
    }

    #[test]
    fn artist_requirement_follows_query() {
        let with_artist = Query::with_artist("base_with_artist", "song", "Artist");
        let decision = outcome("Song", &with_artist, "Song", "Somebody Else");
        assert_eq!(decision.outcome, Outcome::Reject(RejectReason::ArtistMismatch));

        let title_only = Query::title_only("base_title_only", "song");
        let decision = outcome("Song", &title_only, "Song", "");
        assert_eq!(decision.outcome, Outcome::Accept);
    }

    #[test]
    fn title_mismatch_keeps_penalty_flag() {
        let query = Query::title_only("base_title_only", "song");
        let decision = outcome("Song", &query, "Other Thing (Romanized)", "Artist");
        assert_eq!(decision.outcome, Outcome::Reject(RejectReason::TitleMismatch));
        assert!(decision.penalized);
    }

    #[test]
    fn romanized_page_is_penalized() {
        let query = Query::with_artist("base_with_artist", "song title", "Artist");
        let decision = outcome("Song Title", &query, "Song Title (Romanized)", "Artist");
        assert_eq!(decision.outcome, Outcome::Penalized);
        assert!(decision.penalized);

        let decision = outcome("Song Title (Romanized)", &query, "Song Title (Romanized)", "Artist");
        assert_eq!(decision.outcome, Outcome::Accept);
    }

    #[test]
    fn malformed_hit_is_rejected_not_fatal() {
        let query = Query::title_only("base_title_only", "song");
        let decision = outcome("Song", &query, "", "");
        assert_eq!(decision.outcome, Outcome::Reject(RejectReason::TitleMismatch));
    }
}
