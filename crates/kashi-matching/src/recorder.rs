// SPDX-License-Identifier: GPL-3.0-or-later

//! Optional per-resolve decision trace.

use chrono::Utc;
use kashi_domain::{CandidateDecision, MatchStrategy, MatchTrace, Query, QueryTrace, ResolutionId};

/// Collects a [`MatchTrace`] when enabled; every call is a no-op otherwise.
#[derive(Debug)]
pub struct DecisionRecorder {
    trace: Option<MatchTrace>,
}

impl DecisionRecorder {
    pub fn new(enabled: bool, title: &str, artist: &str, strategy: MatchStrategy) -> Self {
        let trace = enabled.then(|| MatchTrace {
            id: ResolutionId::new(),
            started_at: Utc::now(),
            title: title.to_string(),
            artist: artist.to_string(),
            strategy,
            reason: None,
            base_title: String::new(),
            variants: Vec::new(),
            fragments: Vec::new(),
            cover_detected: false,
            steps: Vec::new(),
            accepted: None,
            penalized_used: false,
        });
        Self { trace }
    }

    pub fn is_enabled(&self) -> bool {
        self.trace.is_some()
    }

    pub fn set_reason(&mut self, reason: &str) {
        if let Some(trace) = &mut self.trace {
            trace.reason = Some(reason.to_string());
        }
    }

    pub fn set_variants<'a>(&mut self, base: &str, forms: impl IntoIterator<Item = &'a str>) {
        if let Some(trace) = &mut self.trace {
            trace.base_title = base.to_string();
            trace.variants = forms.into_iter().map(str::to_string).collect();
        }
    }

    pub fn set_title_details(&mut self, fragments: &[String], cover_detected: bool) {
        if let Some(trace) = &mut self.trace {
            trace.fragments = fragments.to_vec();
            trace.cover_detected = cover_detected;
        }
    }

    pub fn begin_query(&mut self, query: &Query) {
        if let Some(trace) = &mut self.trace {
            trace.steps.push(QueryTrace {
                query: query.clone(),
                error: None,
                examined: Vec::new(),
            });
        }
    }

    /// Marks the current query as failed upstream.
    pub fn query_failed(&mut self, error: &str) {
        if let Some(step) = self.current_step() {
            step.error = Some(error.to_string());
        }
    }

    pub fn record(&mut self, decision: &CandidateDecision) {
        if let Some(step) = self.current_step() {
            step.examined.push(decision.clone());
        }
    }

    pub fn finish(self, accepted: Option<&CandidateDecision>, penalized_used: bool) -> Option<MatchTrace> {
        self.trace.map(|mut trace| {
            trace.accepted = accepted.cloned();
            trace.penalized_used = penalized_used;
            trace
        })
    }

    fn current_step(&mut self) -> Option<&mut QueryTrace> {
        self.trace.as_mut().and_then(|trace| trace.steps.last_mut())
    }
}
