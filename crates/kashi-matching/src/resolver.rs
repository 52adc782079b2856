// SPDX-License-Identifier: GPL-3.0-or-later

//! Runs a query plan against the search provider and picks the answer.

use std::sync::Arc;

use kashi_domain::{CandidateDecision, Outcome, Resolution};
use tracing::{debug, info, instrument, warn};

use crate::engine::MatchEngine;
use crate::providers::SearchProvider;
use crate::recorder::DecisionRecorder;

#[derive(Clone)]
pub struct Resolver {
    engine: Arc<MatchEngine>,
    provider: Arc<dyn SearchProvider>,
}

impl Resolver {
    pub fn new(engine: Arc<MatchEngine>, provider: Arc<dyn SearchProvider>) -> Self {
        Self { engine, provider }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// First accepted hit in plan order wins; otherwise the first penalized hit seen
    /// anywhere in the plan; otherwise no match. Never fails.
    #[instrument(skip(self), target = "resolver")]
    pub async fn resolve(&self, title: &str, artist: &str, want_trace: bool) -> Resolution {
        let mut recorder = DecisionRecorder::new(want_trace, title, artist, self.engine.strategy());

        if !self.provider.is_configured() {
            info!(target: "resolver", "search provider not configured, skipping");
            recorder.set_reason("no_token");
            return Resolution {
                url: None,
                trace: recorder.finish(None, false),
            };
        }

        let ctx = self.engine.context(title, artist);
        recorder.set_variants(&ctx.variants.base(), ctx.variants.iter());
        recorder.set_title_details(ctx.variants.fragments(), ctx.variants.cover_detected());
        let plan = self.engine.plan(&ctx.variants, artist);
        debug!(target: "resolver", queries = plan.len(), "executing query plan");

        let mut fallback: Option<CandidateDecision> = None;
        for query in &plan {
            recorder.begin_query(query);
            let hits = match self.provider.search(&query.text).await {
                Ok(hits) => hits,
                Err(error) => {
                    warn!(target: "resolver", query = %query.label, error = %error, "search failed, continuing plan");
                    recorder.query_failed(&error.to_string());
                    continue;
                }
            };

            for hit in &hits {
                let decision = self.engine.evaluate(&ctx, query, hit);
                recorder.record(&decision);
                let outcome = decision.outcome;
                match outcome {
                    Outcome::Accept => {
                        info!(target: "resolver", query = %query.label, url = %decision.url, "accepted candidate");
                        return Resolution {
                            url: Some(decision.url.clone()),
                            trace: recorder.finish(Some(&decision), false),
                        };
                    }
                    Outcome::Penalized if fallback.is_none() => fallback = Some(decision),
                    _ => {}
                }
            }
        }

        match fallback {
            Some(decision) => {
                info!(target: "resolver", url = %decision.url, "using penalized candidate");
                Resolution {
                    url: Some(decision.url.clone()),
                    trace: recorder.finish(Some(&decision), true),
                }
            }
            None => {
                info!(target: "resolver", "no candidate accepted");
                Resolution {
                    url: None,
                    trace: recorder.finish(None, false),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use kashi_domain::SearchHit;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned hits per query text; queries not listed fail like an upstream outage.
    #[derive(Default)]
    struct StubSearch {
        configured: bool,
        responses: HashMap<String, Vec<SearchHit>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSearch {
        fn configured() -> Self {
            Self {
                configured: true,
                ..Default::default()
            }
        }

        fn respond(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
            self.responses.insert(query.to_string(), hits);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
            self.calls.lock().unwrap().push(query.to_string());
            self.responses
                .get(query)
                .cloned()
                .ok_or_else(|| anyhow!("HTTP status 503"))
        }
    }

    fn hit(id: &str, title: &str, artist: &str) -> SearchHit {
        SearchHit {
            id: id.to_string(),
            title: title.to_string(),
            full_title: None,
            artist_name: artist.to_string(),
            url: format!("https://genius.com/{id}"),
        }
    }

    fn resolver(stub: Arc<StubSearch>) -> Resolver {
        Resolver::new(Arc::new(MatchEngine::default()), stub)
    }

    #[tokio::test]
    async fn missing_credentials_short_circuit() {
        let stub = Arc::new(StubSearch::default());
        let resolution = resolver(stub.clone()).resolve("Song", "Artist", true).await;
        assert_eq!(resolution.url, None);
        assert_eq!(resolution.trace.unwrap().reason.as_deref(), Some("no_token"));
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn first_query_accept_ends_the_plan() {
        let stub = Arc::new(StubSearch::configured().respond(
            "song Artist",
            vec![hit("1", "Song (Karaoke)", "Artist"), hit("2", "Song", "Artist")],
        ));
        let resolution = resolver(stub.clone())
            .resolve("Artist - Song (Official Music Video)", "Artist", true)
            .await;

        assert_eq!(resolution.url.as_deref(), Some("https://genius.com/2"));
        assert_eq!(stub.calls(), vec!["song Artist"]);
        let trace = resolution.trace.unwrap();
        assert_eq!(trace.base_title, "song");
        assert!(trace.fragments.is_empty());
        assert!(!trace.cover_detected);
        assert_eq!(trace.steps[0].examined.len(), 2);
        assert_eq!(
            trace.steps[0].examined[0].outcome,
            Outcome::Reject(kashi_domain::RejectReason::BadWord)
        );
        assert!(!trace.penalized_used);
    }

    #[tokio::test]
    async fn accept_beats_earlier_penalized_hit() {
        let stub = Arc::new(
            StubSearch::configured()
                .respond("song title Artist", vec![hit("p", "Song Title (Romanized)", "Artist")])
                .respond("song title", vec![hit("a", "Song Title", "Artist")]),
        );
        let resolution = resolver(stub).resolve("Song Title", "Artist", false).await;
        assert_eq!(resolution.url.as_deref(), Some("https://genius.com/a"));
        assert!(resolution.trace.is_none());
    }

    #[tokio::test]
    async fn penalized_hit_is_the_fallback() {
        let stub = Arc::new(
            StubSearch::configured()
                .respond("song title Artist", vec![hit("p1", "Song Title (Romanized)", "Artist")])
                .respond("song title", vec![hit("p2", "Song Title (English Translation)", "Artist")]),
        );
        let resolution = resolver(stub).resolve("Song Title", "Artist", true).await;
        assert_eq!(resolution.url.as_deref(), Some("https://genius.com/p1"));
        let trace = resolution.trace.unwrap();
        assert!(trace.penalized_used);
        assert_eq!(trace.accepted.unwrap().outcome, Outcome::Penalized);
    }

    #[tokio::test]
    async fn failed_queries_do_not_abort_the_plan() {
        // Only the title-only query is answered; the artist query fails upstream.
        let stub = Arc::new(
            StubSearch::configured().respond("song", vec![hit("1", "Song", "Someone Else")]),
        );
        let resolution = resolver(stub.clone()).resolve("Song", "Artist", true).await;
        assert_eq!(resolution.url.as_deref(), Some("https://genius.com/1"));
        assert_eq!(stub.calls(), vec!["song Artist", "song"]);
        let trace = resolution.trace.unwrap();
        assert_eq!(trace.steps[0].error.as_deref(), Some("HTTP status 503"));
        assert_eq!(trace.accepted.unwrap().used_query_label, "base_title_only");
    }

    #[tokio::test]
    async fn nothing_found_is_no_match() {
        let stub = Arc::new(StubSearch::configured());
        let resolution = resolver(stub.clone()).resolve("Song", "Artist", false).await;
        assert_eq!(resolution.url, None);
        assert_eq!(stub.calls(), vec!["song Artist", "song"]);
    }
}
