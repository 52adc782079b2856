// SPDX-License-Identifier: GPL-3.0-or-later

//! Fuzzy equivalence between two artist credits.

use std::collections::BTreeSet;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::cache::MatchCache;
use crate::text::{nfkc, normalize_spaces, strip_punct_lower, tokenize};
use crate::vocabulary::Vocabulary;

/// Containment needs the shorter name to be at least this long.
const MIN_CONTAINED_LEN: usize = 3;

lazy_static! {
    static ref ARTIST_SPLIT: Regex =
        Regex::new(r"\s*(?:,|&|/|、|\band\b|\bvs\.?)\s*").expect("valid artist split regex");
    static ref PAREN_ALIAS: Regex = Regex::new(r"\(([^()]*)\)").expect("valid alias regex");
}

#[derive(Clone)]
pub struct ArtistMatcher {
    vocab: Arc<Vocabulary>,
    cache: MatchCache,
}

impl ArtistMatcher {
    pub fn new(vocab: Arc<Vocabulary>, cache: MatchCache) -> Self {
        Self { vocab, cache }
    }

    pub fn matches(&self, query: &str, candidate: &str) -> bool {
        self.cache
            .artist_match(query, candidate, || self.compute(query, candidate))
    }

    fn compute(&self, query: &str, candidate: &str) -> bool {
        let left = artist_variants(query);
        let right = artist_variants(candidate);
        left.iter()
            .any(|q| right.iter().any(|c| self.variants_match(q, c)))
    }

    fn variants_match(&self, query: &str, candidate: &str) -> bool {
        let (q, c) = (strip_punct_lower(query), strip_punct_lower(candidate));
        if q.is_empty() || c.is_empty() {
            return false;
        }
        if q == c {
            return true;
        }
        if (q.chars().count() >= MIN_CONTAINED_LEN && c.contains(&q))
            || (c.chars().count() >= MIN_CONTAINED_LEN && q.contains(&c))
        {
            return true;
        }
        let candidate_tokens = self.name_tokens(candidate);
        self.name_tokens(query)
            .iter()
            .any(|token| candidate_tokens.contains(token))
    }

    fn name_tokens(&self, name: &str) -> BTreeSet<String> {
        tokenize(name)
            .into_iter()
            .filter(|t| !self.vocab.is_noise(t) && !self.vocab.is_feature_marker(t))
            .collect()
    }
}

/// Whole credit, each collaborator, bracketed aliases, and names with aliases removed.
fn artist_variants(name: &str) -> BTreeSet<String> {
    let name = normalize_spaces(&nfkc(name)).to_lowercase();
    let mut segments = vec![name.clone()];
    segments.extend(
        ARTIST_SPLIT
            .split(&PAREN_ALIAS.replace_all(&name, " "))
            .map(str::to_string),
    );

    let mut variants = BTreeSet::new();
    for segment in segments {
        for alias in PAREN_ALIAS.captures_iter(&segment) {
            variants.insert(alias[1].trim().to_string());
        }
        variants.insert(normalize_spaces(&PAREN_ALIAS.replace_all(&segment, " ")));
        variants.insert(segment.trim().to_string());
    }
    variants.retain(|v| !v.is_empty());
    variants
}
