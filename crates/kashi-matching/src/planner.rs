// SPDX-License-Identifier: GPL-3.0-or-later

//! Ordered, de-duplicated search queries for one title/artist pair.

use std::collections::HashSet;

use kashi_domain::{ParenRole, Query};
use tracing::debug;

use crate::text::normalize_spaces;
use crate::variants::TitleVariants;

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanner;

impl QueryPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Queries in decreasing confidence. Texts are unique ignoring case.
    pub fn plan(&self, variants: &TitleVariants, artist: &str) -> Vec<Query> {
        let mut plan = Plan::new(artist);
        let base = variants.base();
        let japanese = variants.japanese_title();

        if let Some(japanese) = &japanese {
            plan.with_artist("japanese_with_artist", japanese);
        }
        plan.with_artist("base_with_artist", &base);
        if let Some(japanese) = &japanese {
            plan.title_only("japanese_title_only", japanese);
        }
        plan.title_only("base_title_only", &base);

        for alt in variants.alternates() {
            plan.with_artist(
                &format!("{}_{}_with_artist", alt.role.as_str(), alt.index),
                &alt.text,
            );
        }
        for alt in variants
            .alternates()
            .iter()
            .filter(|alt| alt.role == ParenRole::Romanization)
        {
            plan.title_only(&format!("romanization_{}_title_only", alt.index), &alt.text);
        }

        for (i, fragment) in variants.fragments().iter().enumerate() {
            plan.with_artist(&format!("fragment_{i}_with_artist"), fragment);
            plan.title_only(&format!("fragment_{i}_title_only"), fragment);
        }

        plan.with_artist("raw_with_artist", &normalize_spaces(variants.raw()));

        let queries = plan.finish();
        debug!(
            target: "planner",
            base = %base,
            queries = queries.len(),
            "query plan built"
        );
        queries
    }
}

struct Plan<'a> {
    artist: &'a str,
    seen: HashSet<String>,
    queries: Vec<Query>,
}

impl<'a> Plan<'a> {
    fn new(artist: &'a str) -> Self {
        Self {
            artist: artist.trim(),
            seen: HashSet::new(),
            queries: Vec::new(),
        }
    }

    fn with_artist(&mut self, label: &str, title: &str) {
        if self.artist.is_empty() || title.trim().is_empty() {
            return;
        }
        self.push(Query::with_artist(label, title, self.artist));
    }

    fn title_only(&mut self, label: &str, title: &str) {
        if title.trim().is_empty() {
            return;
        }
        self.push(Query::title_only(label, title));
    }

    fn push(&mut self, query: Query) {
        if self.seen.insert(query.text.to_lowercase()) {
            self.queries.push(query);
        }
    }

    fn finish(self) -> Vec<Query> {
        self.queries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MatchCache;
    use crate::canonicalize::Canonicalizer;
    use crate::variants::VariantGenerator;
    use crate::vocabulary::Vocabulary;
    use std::sync::Arc;

    fn plan(raw: &str, artist: &str) -> Vec<Query> {
        let cache = MatchCache::new(64);
        let generator = VariantGenerator::new(
            Canonicalizer::new(Arc::new(Vocabulary::default()), cache.clone()),
            cache,
        );
        let variants = generator.variants(raw, Some(artist));
        QueryPlanner::new().plan(&variants, artist)
    }

    fn labels(queries: &[Query]) -> Vec<&str> {
        queries.iter().map(|q| q.label.as_str()).collect()
    }

    #[test]
    fn first_query_excludes_marketing_brackets() {
        let queries = plan("Artist - Song (Official Music Video)", "Artist");
        assert_eq!(queries[0].label, "base_with_artist");
        assert_eq!(queries[0].text, "song Artist");
        assert!(queries[0].require_artist_match);
        assert_eq!(queries[1].label, "base_title_only");
        assert!(!queries[1].require_artist_match);
        assert_eq!(queries.last().map(|q| q.label.as_str()), Some("raw_with_artist"));
    }

    #[test]
    fn japanese_subsequence_goes_first() {
        let queries = plan("夜に駆ける Racing Into The Night", "YOASOBI");
        assert_eq!(
            &labels(&queries)[..4],
            [
                "japanese_with_artist",
                "base_with_artist",
                "japanese_title_only",
                "base_title_only"
            ]
        );
        assert_eq!(queries[0].text, "夜に駆ける YOASOBI");
        assert_eq!(queries[2].text, "夜に駆ける");
    }

    #[test]
    fn romanization_is_tried_alone() {
        let queries = plan("曲名 (Song Title)", "Artist");
        let standalone = queries
            .iter()
            .find(|q| q.label == "romanization_0_title_only")
            .expect("romanization query");
        assert_eq!(standalone.text, "song title");
        assert!(!standalone.require_artist_match);
        assert!(labels(&queries).contains(&"romanization_0_with_artist"));
    }

    #[test]
    fn texts_are_unique_ignoring_case() {
        for (raw, artist) in [
            ("曲名", "Artist"),
            ("SONG", "song"),
            ("A / B | MV", "X"),
            ("夜に駆ける (Yoru ni Kakeru) [English Translation: Racing]", "YOASOBI"),
        ] {
            let queries = plan(raw, artist);
            let mut seen = HashSet::new();
            for query in &queries {
                assert!(seen.insert(query.text.to_lowercase()), "duplicate {:?}", query.text);
            }
        }
    }

    #[test]
    fn blank_artist_skips_artist_queries() {
        let queries = plan("Song", "  ");
        assert_eq!(labels(&queries), ["base_title_only"]);
    }

    #[test]
    fn medley_fragments_are_planned() {
        let queries = plan("Alpha Song / Beta Song", "Artist");
        let labels = labels(&queries);
        assert!(labels.contains(&"fragment_0_with_artist"));
        assert!(labels.contains(&"fragment_1_title_only"));
    }
}
