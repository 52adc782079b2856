// SPDX-License-Identifier: GPL-3.0-or-later

//! Word tables that drive normalization and candidate filtering.
//!
//! Matching logic never hard-codes a marketing or format term; it asks the
//! [`Vocabulary`]. Deployments extend the built-in tables through
//! [`VocabularyOverrides`] instead of touching the matchers.

use std::collections::HashSet;

use kashi_config::VocabularyOverrides;
use regex::Regex;
use tracing::warn;

use crate::text::{contains_phrase, tokenize};

/// Bumped whenever a built-in table changes in a way that alters match results.
pub const VOCABULARY_VERSION: u32 = 1;

/// Marketing, format and filler words that never identify a song.
const NOISE_WORDS: &[&str] = &[
    "official", "offical", "music", "video", "musicvideo", "mv", "pv", "lyric", "lyrics",
    "ver", "version", "visualizer", "teaser", "trailer", "short", "shorts", "full",
    "performance", "live", "romanized", "romaji", "translation", "translated", "clip", "hd",
    "hq", "the", "first", "take", "thefirsttake", "youtube", "yt", "tour", "livetour",
    "session", "lounge", "behind", "scenes", "behindthescenes", "making", "makingof", "remix",
    "mix", "alternate", "alt", "remastered", "remaster", "tv", "tvsize", "demo", "edit",
    "piano", "acoustic", "english", "by", "from", "original", "ost", "soundtrack", "eng",
];

/// Words naming an arrangement or edition of the same song.
const DESCRIPTOR_WORDS: &[&str] = &[
    "instrumental", "inst", "offvocal", "acoustic", "acapella", "cappella", "karaoke",
    "カラオケ", "original", "remix", "mix", "alternate", "alt", "remastered", "remaster", "tv",
    "tvsize", "demo", "edit", "short", "piano", "live", "version", "ver", "unplugged",
    "extended", "orchestra",
];

/// Words describing how a video was produced rather than what it contains.
const EDITION_WORDS: &[&str] = &[
    "official", "offical", "mv", "pv", "music", "video", "musicvideo", "visualizer", "teaser",
    "trailer", "clip", "lyric", "lyrics", "hd", "hq", "4k", "full", "performance", "audio",
    "ost", "soundtrack", "youtube", "shorts",
];

/// Whole-phrase triggers: a bracketed span containing any of these is dropped.
const BRACKET_TRIGGERS: &[&str] = &[
    "music", "video", "mv", "pv", "official", "live", "live ver", "live version",
    "performance", "session", "lounge", "tour", "stage", "studio", "behind",
    "behind the scenes", "bts", "making", "making of", "the first take", "first take",
    "youtube ver", "youtube version", "yt ver", "lyric", "lyrics", "english translation",
    "translation", "translated", "romanized", "romaji", "ver", "version", "alt ver",
    "alternate", "alternate ver", "alternate version", "remix", "mix", "edit", "demo",
    "short ver", "short version", "short", "tv", "tv size", "tvsize", "acoustic", "piano",
    "inst", "instrumental", "off vocal", "offvocal", "visualizer", "teaser", "trailer", "clip",
    "full ver", "full version", "english ver", "english version", "japanese ver",
    "japanese version",
];

const FEATURE_MARKERS: &[&str] = &["feat", "ft", "featuring"];

/// `with` only introduces a feature credit at the start of a bracket.
const PAREN_FEATURE_MARKERS: &[&str] = &["feat", "ft", "featuring", "with"];

const ROMANIZATION_MARKERS: &[&str] = &["romanized", "romaji", "romanization", "transliteration"];

const TRANSLATION_MARKERS: &[&str] = &["translation", "translated", "english", "eng"];

const COVER_WORDS: &[&str] = &["cover", "covered", "歌ってみた", "カバー"];

/// Stripped from romanized/translated spans to leave only the alternate title.
const PAYLOAD_STOPWORDS: &[&str] = &["ver", "version", "lyric", "lyrics"];

/// Candidate markers that disqualify a hit unless the original title has them too.
const BAD_WORDS: &[&str] = &[
    "cover", "karaoke", "tribute", "sped up", "speed up", "slowed", "nightcore",
];

/// Candidate markers for romanized or translated lyric pages.
const ROMANIZED_PAGE_MARKERS: &[&str] = &["romanized", "translation", "translated", "english"];

/// Candidate markers for pages that are not song lyrics at all.
const NON_SONG_MARKERS: &[&str] = &["chapter", "interview", "review", "article"];

/// Prefix-anchored, case-insensitive phrase matchers.
///
/// `cover` matches "cover", "covered" and "covers" but not "discover"; multi-word
/// markers accept space, hyphen or underscore between words.
#[derive(Debug, Clone)]
pub struct MarkerSet {
    markers: Vec<(String, Regex)>,
}

impl MarkerSet {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut markers: Vec<(String, Regex)> = Vec::new();
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if phrase.is_empty() || markers.iter().any(|(existing, _)| *existing == phrase) {
                continue;
            }
            match marker_regex(&phrase) {
                Ok(regex) => markers.push((phrase, regex)),
                Err(error) => {
                    warn!(target: "matching", %phrase, %error, "skipping unusable marker");
                }
            }
        }
        Self { markers }
    }

    /// First marker present in `text`.
    pub fn find(&self, text: &str) -> Option<&str> {
        self.markers
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|(phrase, _)| phrase.as_str())
    }

    /// First marker present in `candidate` but absent from `original`.
    pub fn introduced(&self, candidate: &str, original: &str) -> Option<&str> {
        self.markers
            .iter()
            .find(|(_, regex)| regex.is_match(candidate) && !regex.is_match(original))
            .map(|(phrase, _)| phrase.as_str())
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

fn marker_regex(phrase: &str) -> Result<Regex, regex::Error> {
    let body = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[\s\-_]*");
    let word_start = phrase
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    let pattern = if word_start {
        format!(r"(?i)\b{body}")
    } else {
        format!("(?i){body}")
    };
    Regex::new(&pattern)
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    version: u32,
    noise_words: HashSet<String>,
    descriptor_words: HashSet<String>,
    edition_words: HashSet<String>,
    bracket_triggers: Vec<Vec<String>>,
    feature_markers: HashSet<String>,
    paren_feature_markers: HashSet<String>,
    romanization_markers: HashSet<String>,
    translation_markers: HashSet<String>,
    cover_words: HashSet<String>,
    payload_stopwords: HashSet<String>,
    bad_words: MarkerSet,
    romanized_page_markers: MarkerSet,
    non_song_markers: MarkerSet,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::with_overrides(&VocabularyOverrides::default())
    }
}

impl Vocabulary {
    /// Built-in tables extended by the configured extras.
    pub fn with_overrides(overrides: &VocabularyOverrides) -> Self {
        Self {
            version: VOCABULARY_VERSION,
            noise_words: word_set(NOISE_WORDS, &overrides.extra_noise_words),
            descriptor_words: word_set(DESCRIPTOR_WORDS, &overrides.extra_descriptor_words),
            edition_words: word_set(EDITION_WORDS, &[]),
            bracket_triggers: BRACKET_TRIGGERS
                .iter()
                .map(|phrase| phrase.to_string())
                .chain(overrides.extra_bracket_triggers.iter().cloned())
                .map(|phrase| tokenize(&phrase))
                .filter(|tokens| !tokens.is_empty())
                .collect(),
            feature_markers: word_set(FEATURE_MARKERS, &[]),
            paren_feature_markers: word_set(PAREN_FEATURE_MARKERS, &[]),
            romanization_markers: word_set(ROMANIZATION_MARKERS, &[]),
            translation_markers: word_set(TRANSLATION_MARKERS, &[]),
            cover_words: word_set(COVER_WORDS, &[]),
            payload_stopwords: word_set(PAYLOAD_STOPWORDS, &[]),
            bad_words: MarkerSet::new(
                BAD_WORDS
                    .iter()
                    .map(|word| word.to_string())
                    .chain(overrides.extra_bad_words.iter().cloned()),
            ),
            romanized_page_markers: MarkerSet::new(
                ROMANIZED_PAGE_MARKERS
                    .iter()
                    .map(|word| word.to_string())
                    .chain(overrides.extra_romanized_markers.iter().cloned()),
            ),
            non_song_markers: MarkerSet::new(NON_SONG_MARKERS),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_noise(&self, token: &str) -> bool {
        self.noise_words.contains(token)
    }

    pub fn is_descriptor(&self, token: &str) -> bool {
        self.descriptor_words.contains(token)
    }

    pub fn is_edition(&self, token: &str) -> bool {
        self.edition_words.contains(token)
    }

    pub fn is_cover_word(&self, token: &str) -> bool {
        self.cover_words.contains(token)
    }

    pub fn is_feature_marker(&self, token: &str) -> bool {
        self.feature_markers.contains(token)
    }

    pub fn is_paren_feature_marker(&self, token: &str) -> bool {
        self.paren_feature_markers.contains(token)
    }

    pub fn is_romanization_marker(&self, token: &str) -> bool {
        self.romanization_markers.contains(token)
    }

    pub fn is_translation_marker(&self, token: &str) -> bool {
        self.translation_markers.contains(token)
    }

    /// Tokens that are not part of an alternate-title payload.
    pub fn is_payload_stopword(&self, token: &str) -> bool {
        self.payload_stopwords.contains(token)
            || self.is_romanization_marker(token)
            || self.is_translation_marker(token)
    }

    /// Noise, descriptor or production word: trimmed from the end of a title base.
    pub fn is_trailing_filler(&self, token: &str) -> bool {
        self.is_noise(token) || self.is_descriptor(token) || self.is_edition(token)
    }

    /// Whether `text` credits a cover, as a word ("Covered by X") or a Japanese tag.
    pub fn mentions_cover(&self, text: &str) -> bool {
        tokenize(text).iter().any(|token| self.is_cover_word(token))
            || self
                .cover_words
                .iter()
                .any(|word| !word.is_ascii() && text.contains(word.as_str()))
    }

    pub fn has_bracket_trigger<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        self.bracket_triggers
            .iter()
            .any(|phrase| contains_phrase(tokens, phrase))
    }

    /// Whether any token is recognised vocabulary rather than free text.
    pub fn has_known_term<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        tokens.iter().any(|token| {
            let token = token.as_ref();
            self.is_descriptor(token) || self.is_edition(token) || self.is_cover_word(token)
        }) || self.has_bracket_trigger(tokens)
    }

    pub fn bad_words(&self) -> &MarkerSet {
        &self.bad_words
    }

    pub fn romanized_page_markers(&self) -> &MarkerSet {
        &self.romanized_page_markers
    }

    pub fn non_song_markers(&self) -> &MarkerSet {
        &self.non_song_markers
    }
}

fn word_set(builtin: &[&str], extra: &[String]) -> HashSet<String> {
    builtin
        .iter()
        .map(|word| word.to_string())
        .chain(extra.iter().map(|word| word.trim().to_lowercase()))
        .filter(|word| !word.is_empty())
        .collect()
}
