// SPDX-License-Identifier: GPL-3.0-or-later

//! Bounded memoization for the pure parts of matching.

use std::sync::Arc;

use moka::sync::Cache;

use crate::variants::TitleVariants;

type TitleKey = (String, Option<String>);

/// Bounded, recency-evicting caches shared by one engine instance.
///
/// A capacity of zero disables memoization entirely. Every entry is keyed by the
/// complete input, so a hit can only ever return the value for identical inputs.
#[derive(Clone, Default)]
pub struct MatchCache {
    inner: Option<Inner>,
}

#[derive(Clone)]
struct Inner {
    canonical: Cache<TitleKey, String>,
    variants: Cache<TitleKey, Arc<TitleVariants>>,
    artists: Cache<(String, String), bool>,
}

impl MatchCache {
    pub fn new(capacity: u64) -> Self {
        if capacity == 0 {
            return Self::disabled();
        }
        Self {
            inner: Some(Inner {
                canonical: Cache::new(capacity),
                variants: Cache::new(capacity),
                artists: Cache::new(capacity),
            }),
        }
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub(crate) fn canonical(
        &self,
        raw: &str,
        artist: Option<&str>,
        compute: impl FnOnce() -> String,
    ) -> String {
        match &self.inner {
            Some(inner) => inner.canonical.get_with(title_key(raw, artist), compute),
            None => compute(),
        }
    }

    pub(crate) fn variants(
        &self,
        raw: &str,
        artist: Option<&str>,
        compute: impl FnOnce() -> TitleVariants,
    ) -> Arc<TitleVariants> {
        match &self.inner {
            Some(inner) => inner
                .variants
                .get_with(title_key(raw, artist), || Arc::new(compute())),
            None => Arc::new(compute()),
        }
    }

    pub(crate) fn artist_match(
        &self,
        query: &str,
        candidate: &str,
        compute: impl FnOnce() -> bool,
    ) -> bool {
        match &self.inner {
            Some(inner) => inner
                .artists
                .get_with((query.to_string(), candidate.to_string()), compute),
            None => compute(),
        }
    }
}

fn title_key(raw: &str, artist: Option<&str>) -> TitleKey {
    (raw.to_string(), artist.map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn memoizes_by_full_key() {
        let cache = MatchCache::new(16);
        let calls = Cell::new(0);
        let compute = |value: &str| {
            calls.set(calls.get() + 1);
            value.to_string()
        };

        assert_eq!(cache.canonical("A", Some("x"), || compute("a")), "a");
        assert_eq!(cache.canonical("A", Some("x"), || compute("other")), "a");
        assert_eq!(cache.canonical("A", None, || compute("b")), "b");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn zero_capacity_always_recomputes() {
        let cache = MatchCache::new(0);
        assert!(!cache.is_enabled());
        assert!(cache.artist_match("a", "b", || true));
        assert!(!cache.artist_match("a", "b", || false));
    }
}
