// SPDX-License-Identifier: GPL-3.0-or-later
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

// ============================================================================
// Value Objects & IDs
// ============================================================================

/// Identifies one resolve operation in logs and traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionId(pub Uuid);

impl ResolutionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ResolutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResolutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Title structure
// ============================================================================

/// Semantic role of a parenthesised or bracketed span inside a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParenRole {
    Romanization,
    Translation,
    Descriptor,
    Feature,
    Edition,
    Other,
}

impl ParenRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParenRole::Romanization => "romanization",
            ParenRole::Translation => "translation",
            ParenRole::Descriptor => "descriptor",
            ParenRole::Feature => "feature",
            ParenRole::Edition => "edition",
            ParenRole::Other => "other",
        }
    }

    /// Romanized and translated spans carry an alternative spelling of the title itself.
    pub fn is_alternate_title(&self) -> bool {
        matches!(self, ParenRole::Romanization | ParenRole::Translation)
    }
}

impl std::fmt::Display for ParenRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly two titles must agree before a candidate counts as the same song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Canonical or ASCII-folded equality only.
    Strict,
    /// Equality, token overlap, or punctuation-free containment.
    #[default]
    Lenient,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Strict => "strict",
            MatchStrategy::Lenient => "lenient",
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Search
// ============================================================================

/// One search string in a query plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub label: String,
    pub text: String,
    /// Title portion of `text`, without the artist.
    pub title: String,
    pub require_artist_match: bool,
}

impl Query {
    pub fn with_artist(label: impl Into<String>, title: &str, artist: &str) -> Self {
        Self {
            label: label.into(),
            text: format!("{} {}", title.trim(), artist.trim()),
            title: title.trim().to_string(),
            require_artist_match: true,
        }
    }

    pub fn title_only(label: impl Into<String>, title: &str) -> Self {
        Self {
            label: label.into(),
            text: title.trim().to_string(),
            title: title.trim().to_string(),
            require_artist_match: false,
        }
    }
}

/// A single hit returned by the lyrics search provider, in provider ranking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchHit {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub full_title: Option<String>,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub url: String,
}

impl SearchHit {
    /// The short title when present, otherwise the full title, otherwise empty.
    pub fn display_title(&self) -> &str {
        if !self.title.trim().is_empty() {
            return &self.title;
        }
        self.full_title.as_deref().unwrap_or("")
    }
}

// ============================================================================
// Decisions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    NonSongContent,
    BadWord,
    ArtistMismatch,
    TitleMismatch,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NonSongContent => "non_song_content",
            RejectReason::BadWord => "bad_word",
            RejectReason::ArtistMismatch => "artist_mismatch",
            RejectReason::TitleMismatch => "title_mismatch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accept,
    Reject(RejectReason),
    Penalized,
}

impl Outcome {
    pub fn is_accept(&self) -> bool {
        matches!(self, Outcome::Accept)
    }

    pub fn is_reject(&self) -> bool {
        matches!(self, Outcome::Reject(_))
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Accept => f.write_str("accept"),
            Outcome::Reject(reason) => write!(f, "reject:{}", reason.as_str()),
            Outcome::Penalized => f.write_str("penalized"),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Verdict on one examined search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateDecision {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub url: String,
    pub outcome: Outcome,
    pub used_query_label: String,
    pub penalized: bool,
}

impl CandidateDecision {
    pub fn new(hit: &SearchHit, query: &Query, outcome: Outcome, penalized: bool) -> Self {
        Self {
            id: hit.id.clone(),
            title: hit.display_title().to_string(),
            artist: hit.artist_name.clone(),
            url: hit.url.clone(),
            outcome,
            used_query_label: query.label.clone(),
            penalized,
        }
    }
}

// ============================================================================
// Video metadata
// ============================================================================

/// Song card attached to a video by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub artist: String,
    pub thumbnail_url: Option<String>,
}

// ============================================================================
// Resolution
// ============================================================================

/// Everything examined for one planned query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryTrace {
    pub query: Query,
    /// Upstream failure swallowed for this query, if any.
    pub error: Option<String>,
    pub examined: Vec<CandidateDecision>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchTrace {
    pub id: ResolutionId,
    pub started_at: DateTime<Utc>,
    pub title: String,
    pub artist: String,
    pub strategy: MatchStrategy,
    /// Why resolution ended without an answer, e.g. `no_token` or `timeout`.
    pub reason: Option<String>,
    pub base_title: String,
    pub variants: Vec<String>,
    /// Medley pieces planned as separate queries.
    pub fragments: Vec<String>,
    pub cover_detected: bool,
    pub steps: Vec<QueryTrace>,
    pub accepted: Option<CandidateDecision>,
    pub penalized_used: bool,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Resolution {
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<MatchTrace>,
}

impl Resolution {
    pub fn no_match() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        self.url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_renders_reason_suffix() {
        assert_eq!(Outcome::Accept.to_string(), "accept");
        assert_eq!(Outcome::Penalized.to_string(), "penalized");
        assert_eq!(
            Outcome::Reject(RejectReason::BadWord).to_string(),
            "reject:bad_word"
        );
        assert_eq!(
            serde_json::to_value(Outcome::Reject(RejectReason::ArtistMismatch)).unwrap(),
            serde_json::json!("reject:artist_mismatch")
        );
    }

    #[test]
    fn display_title_falls_back_to_full_title() {
        let hit = SearchHit {
            id: "1".to_string(),
            title: "  ".to_string(),
            full_title: Some("Song by Artist".to_string()),
            ..Default::default()
        };
        assert_eq!(hit.display_title(), "Song by Artist");

        let empty = SearchHit::default();
        assert_eq!(empty.display_title(), "");
    }

    #[test]
    fn query_constructors_set_artist_requirement() {
        let q = Query::with_artist("base_with_artist", " Song ", "Artist");
        assert_eq!(q.text, "Song Artist");
        assert_eq!(q.title, "Song");
        assert!(q.require_artist_match);

        let t = Query::title_only("base_title_only", "Song");
        assert_eq!(t.text, "Song");
        assert!(!t.require_artist_match);
    }

    #[test]
    fn strategy_defaults_to_lenient() {
        assert_eq!(MatchStrategy::default(), MatchStrategy::Lenient);
        let parsed: MatchStrategy = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(parsed, MatchStrategy::Strict);
    }

    #[test]
    fn resolution_skips_absent_trace() {
        let json = serde_json::to_value(Resolution::no_match()).unwrap();
        assert_eq!(json, serde_json::json!({ "url": null }));
    }
}
