// SPDX-License-Identifier: GPL-3.0-or-later

//! Title equivalence under a [`MatchStrategy`].

use std::collections::HashSet;

use kashi_domain::MatchStrategy;

use crate::canonicalize::Canonicalizer;
use crate::text::{ascii_fold, strip_punct_lower};
use crate::variants::TitleVariants;

/// Folded forms shorter than this never count as equal on their own.
const MIN_FOLDED_LEN: usize = 3;
/// Containment needs the shorter side to be at least this long.
const MIN_CONTAINED_LEN: usize = 2;

#[derive(Clone)]
pub struct TitleComparator {
    canonicalizer: Canonicalizer,
    strategy: MatchStrategy,
    min_token_overlap: f32,
}

impl TitleComparator {
    pub fn new(canonicalizer: Canonicalizer, strategy: MatchStrategy, min_token_overlap: f32) -> Self {
        Self {
            canonicalizer,
            strategy,
            min_token_overlap: min_token_overlap.clamp(0.0, 1.0),
        }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// True when any pair of forms agrees.
    pub fn same_title(&self, a: &TitleVariants, b: &TitleVariants) -> bool {
        a.iter().any(|x| b.iter().any(|y| self.forms_match(x, y)))
    }

    pub fn forms_match(&self, a: &str, b: &str) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        if a == b {
            return true;
        }
        let folded = ascii_fold(a);
        if folded.len() >= MIN_FOLDED_LEN && folded == ascii_fold(b) {
            return true;
        }
        match self.strategy {
            MatchStrategy::Strict => false,
            MatchStrategy::Lenient => self.tokens_overlap(a, b) || contained(a, b),
        }
    }

    fn tokens_overlap(&self, a: &str, b: &str) -> bool {
        let left = self.core_tokens(a);
        let right = self.core_tokens(b);
        let smaller = left.len().min(right.len());
        if smaller == 0 {
            return false;
        }
        let shared = left.intersection(&right).count();
        shared > 0 && shared as f32 / smaller as f32 >= self.min_token_overlap
    }

    /// Match tokens without descriptor or feature words, unless that leaves nothing.
    fn core_tokens(&self, form: &str) -> HashSet<String> {
        let vocab = self.canonicalizer.vocabulary();
        let tokens = self.canonicalizer.match_tokens(form);
        let core: HashSet<String> = tokens
            .iter()
            .filter(|t| !vocab.is_descriptor(t) && !vocab.is_feature_marker(t))
            .cloned()
            .collect();
        if core.is_empty() {
            tokens.into_iter().collect()
        } else {
            core
        }
    }
}

fn contained(a: &str, b: &str) -> bool {
    let (a, b) = (strip_punct_lower(a), strip_punct_lower(b));
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    short.chars().count() >= MIN_CONTAINED_LEN && long.contains(&short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MatchCache;
    use crate::variants::VariantGenerator;
    use crate::vocabulary::Vocabulary;
    use std::sync::Arc;

    fn setup(strategy: MatchStrategy) -> (VariantGenerator, TitleComparator) {
        let cache = MatchCache::new(64);
        let canonicalizer = Canonicalizer::new(Arc::new(Vocabulary::default()), cache.clone());
        (
            VariantGenerator::new(canonicalizer.clone(), cache),
            TitleComparator::new(canonicalizer, strategy, 0.6),
        )
    }

    fn same(strategy: MatchStrategy, a: &str, b: &str) -> bool {
        let (generator, comparator) = setup(strategy);
        comparator.same_title(&generator.variants(a, None), &generator.variants(b, None))
    }

    #[test]
    fn both_strategies_accept_canonical_equality() {
        for strategy in [MatchStrategy::Strict, MatchStrategy::Lenient] {
            assert!(same(strategy, "Song (Official Video)", "Song"));
            assert!(same(strategy, "Don't Stop", "Dont Stop"));
        }
    }

    #[test]
    fn romanized_paren_matches_romanized_candidate() {
        for strategy in [MatchStrategy::Strict, MatchStrategy::Lenient] {
            assert!(same(strategy, "曲名 (Song Title)", "Song Title"));
        }
    }

    #[test]
    fn lenient_allows_partial_overlap_and_containment() {
        assert!(same(MatchStrategy::Lenient, "Blue Bird", "Blue Bird Remix Edit"));
        assert!(same(MatchStrategy::Lenient, "Idol", "Idol Forever"));
        assert!(!same(MatchStrategy::Strict, "Idol", "Idol Forever"));
    }

    #[test]
    fn unrelated_titles_do_not_match() {
        for strategy in [MatchStrategy::Strict, MatchStrategy::Lenient] {
            assert!(!same(strategy, "Yesterday", "Tomorrow Never Knows"));
            assert!(!same(strategy, "夜に駆ける", "群青"));
        }
    }

    #[test]
    fn short_folds_are_not_enough() {
        let (_, comparator) = setup(MatchStrategy::Strict);
        assert!(!comparator.forms_match("a!", "a?"));
        assert!(!comparator.forms_match("", ""));
    }
}
