// SPDX-License-Identifier: GPL-3.0-or-later

//! Title normalization: turns a displayed title into canonical tokens.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::trace;

use crate::cache::MatchCache;
use crate::parens::{Paren, ParenClassifier};
use crate::text::{dedupe_tokens, has_japanese, nfkc, normalize_spaces, tokenize, SEPARATOR_CLASS};
use crate::vocabulary::Vocabulary;
use kashi_domain::ParenRole;

/// Upper bound on canonicalization passes; every pass only removes material.
const MAX_PASSES: usize = 4;

/// Separators that may introduce a trailing noise segment, e.g. "Song - Official MV".
const TAIL_SEPARATORS: [&str; 5] = [" - ", " – ", " — ", "|", "｜"];

lazy_static! {
    static ref BRACKET_SPAN: Regex =
        Regex::new(r"\[[^\[\]]*\]|\([^()]*\)").expect("valid bracket span regex");
    static ref EMPTY_BRACKETS: Regex =
        Regex::new(r"\(\s*\)|\[\s*\]").expect("valid empty bracket regex");
    static ref COVER_CREDIT: Regex =
        Regex::new(&format!(r"(?i)\bcover(?:ed)?{SEPARATOR_CLASS}+by\b.*$"))
            .expect("valid cover credit regex");
    static ref JA_COVER_TAIL: Regex =
        Regex::new(r"(?:歌ってみた|カバー).*$").expect("valid japanese cover regex");
}

/// Structured view of one displayed title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    /// Lowercase tokens outside any bracket, trailing noise and descriptors trimmed.
    pub base: Vec<String>,
    pub parens: Vec<Paren>,
    /// Tokens from a feature marker onward.
    pub feature_tail: Vec<String>,
    pub has_japanese: bool,
}

impl ParsedTitle {
    pub fn base_text(&self) -> String {
        self.base.join(" ")
    }

    pub fn without_feature_tail(&self) -> Option<String> {
        let tail = self.feature_tail.len();
        if tail == 0 || self.base.len() <= tail || !self.base.ends_with(&self.feature_tail) {
            return None;
        }
        Some(self.base[..self.base.len() - tail].join(" "))
    }

    /// Base tokens written in Japanese script, in order.
    pub fn japanese_text(&self) -> Option<String> {
        let tokens: Vec<&str> = self
            .base
            .iter()
            .filter(|token| has_japanese(token))
            .map(String::as_str)
            .collect();
        (!tokens.is_empty()).then(|| tokens.join(" "))
    }

    pub fn parens_with_role(&self, role: ParenRole) -> impl Iterator<Item = &Paren> {
        self.parens.iter().filter(move |paren| paren.role == role)
    }
}

#[derive(Clone)]
pub struct Canonicalizer {
    vocab: Arc<Vocabulary>,
    classifier: ParenClassifier,
    cache: MatchCache,
}

impl Canonicalizer {
    pub fn new(vocab: Arc<Vocabulary>, cache: MatchCache) -> Self {
        Self {
            classifier: ParenClassifier::new(vocab.clone()),
            vocab,
            cache,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Canonical, space-joined token form of `raw`. Applying it to its own output
    /// returns the same string.
    pub fn canonicalize(&self, raw: &str, artist: Option<&str>) -> String {
        self.cache.canonical(raw, artist, || {
            let mut current = self.canonical_pass(raw, artist);
            for _ in 1..MAX_PASSES {
                let next = self.canonical_pass(&current, artist);
                if next == current {
                    break;
                }
                current = next;
            }
            trace!(target: "matching", raw, canonical = %current, "canonicalized title");
            current
        })
    }

    /// Canonical tokens used for overlap scoring: noise and pure numbers removed.
    pub fn match_tokens(&self, canonical: &str) -> Vec<String> {
        canonical
            .split_whitespace()
            .filter(|token| !self.vocab.is_noise(token))
            .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
            .collect()
    }

    pub fn parse(&self, raw: &str, artist: Option<&str>) -> ParsedTitle {
        let prepared = self.prepare(raw, artist);
        let truncated = self.truncate_noise_tail(&prepared);

        let mut inners = Vec::new();
        let outside = BRACKET_SPAN
            .replace_all(&truncated, |caps: &Captures| {
                let span = &caps[0];
                let inner = span[1..span.len() - 1].trim();
                if !inner.is_empty() {
                    inners.push(inner.to_string());
                }
                " "
            })
            .into_owned();
        let outside = self.strip_cover_credit(&outside);

        let mut base = dedupe_tokens(tokenize(&outside));
        if base.is_empty() {
            // The whole title sits inside brackets, e.g. "【曲名】".
            base = self
                .canonicalize(raw, artist)
                .split_whitespace()
                .map(str::to_string)
                .collect();
        }
        while base.len() > 1
            && base
                .last()
                .is_some_and(|token| self.vocab.is_trailing_filler(token))
        {
            base.pop();
        }

        let has_japanese = base.iter().any(|token| has_japanese(token));
        let parens: Vec<Paren> = inners
            .into_iter()
            .map(|inner| Paren {
                role: self.classifier.classify(&inner, has_japanese),
                inner,
            })
            .collect();

        let feature_tail = match base
            .iter()
            .skip(1)
            .position(|token| self.vocab.is_feature_marker(token))
        {
            Some(offset) => base[offset + 1..].to_vec(),
            None => parens
                .iter()
                .find(|paren| paren.role == ParenRole::Feature)
                .map(|paren| tokenize(&paren.inner))
                .unwrap_or_default(),
        };

        ParsedTitle {
            base,
            parens,
            feature_tail,
            has_japanese,
        }
    }

    /// Glyph mapping, quote folding, NFKC and artist prefix removal.
    pub fn prepare(&self, raw: &str, artist: Option<&str>) -> String {
        let mapped: String = raw
            .chars()
            .map(|c| match c {
                '「' | '『' | '【' | '〈' | '《' | '〔' | '［' | '〖' => '[',
                '」' | '』' | '】' | '〉' | '》' | '〕' | '］' | '〗' => ']',
                '“' | '”' | '„' => '"',
                '‘' | '’' => '\'',
                other => other,
            })
            .collect();
        let normalized = normalize_spaces(&nfkc(&mapped));
        match artist {
            Some(artist) => self.strip_artist_prefix(&normalized, artist),
            None => normalized,
        }
    }

    fn canonical_pass(&self, input: &str, artist: Option<&str>) -> String {
        let prepared = self.prepare(input, artist);
        let truncated = self.truncate_noise_tail(&prepared);
        let debracketed = self.strip_noise_brackets(&truncated);
        let uncovered = self.strip_cover_credit(&debracketed);
        let collapsed = EMPTY_BRACKETS.replace_all(&uncovered, " ");

        let mut tokens = dedupe_tokens(tokenize(&collapsed));
        if tokens.is_empty() {
            tokens = dedupe_tokens(tokenize(&prepared));
        }
        tokens.join(" ")
    }

    /// Drop trailing separator segments made only of noise words.
    fn truncate_noise_tail(&self, title: &str) -> String {
        let mut current = title.trim().to_string();
        loop {
            let Some((idx, sep_len)) = TAIL_SEPARATORS
                .iter()
                .filter_map(|sep| current.rfind(sep).map(|idx| (idx, sep.len())))
                .max_by_key(|(idx, _)| *idx)
            else {
                break;
            };

            let head = current[..idx].trim();
            let tail = tokenize(&current[idx + sep_len..]);
            let head_is_title = head.chars().count() >= 3 || has_japanese(head);
            if tail.is_empty() || !head_is_title || !tail.iter().all(|t| self.vocab.is_noise(t)) {
                break;
            }
            current = head.to_string();
        }
        current
    }

    fn strip_noise_brackets(&self, title: &str) -> String {
        BRACKET_SPAN
            .replace_all(title, |caps: &Captures| {
                let span = &caps[0];
                if self.is_noise_span(&span[1..span.len() - 1]) {
                    " ".to_string()
                } else {
                    span.to_string()
                }
            })
            .into_owned()
    }

    fn is_noise_span(&self, inner: &str) -> bool {
        let tokens = tokenize(inner);
        tokens.is_empty()
            || self.vocab.has_bracket_trigger(&tokens)
            || tokens.iter().all(|t| self.vocab.is_noise(t))
            || tokens.iter().any(|t| self.vocab.is_cover_word(t))
    }

    /// Remove a trailing cover credit unless that would leave nothing.
    fn strip_cover_credit(&self, title: &str) -> String {
        let stripped = COVER_CREDIT.replace(title, "");
        let stripped = JA_COVER_TAIL.replace(&stripped, "");
        if tokenize(&stripped).is_empty() {
            title.to_string()
        } else {
            stripped.trim().to_string()
        }
    }

    /// Remove `"{artist} - "`, `"{artist}: "` or `"{artist}[Song]"` from the front of a title.
    pub fn strip_artist_prefix(&self, title: &str, artist: &str) -> String {
        let artist = normalize_spaces(&nfkc(artist));
        if artist.is_empty() {
            return title.to_string();
        }
        let pattern = format!(
            r"(?i)^\s*{}\s*(?:[-–—/:|]\s*(?P<rest>.+)|\[(?P<quoted>[^\]]+)\](?P<tail>.*))$",
            regex::escape(&artist)
        );
        let Ok(prefix) = Regex::new(&pattern) else {
            return title.to_string();
        };
        let Some(caps) = prefix.captures(title) else {
            return title.to_string();
        };

        let stripped = match (caps.name("rest"), caps.name("quoted")) {
            (Some(rest), _) => rest.as_str().to_string(),
            (None, Some(quoted)) => {
                let tail = caps.name("tail").map_or("", |m| m.as_str());
                // "Artist「Song」MV": the words after the quote are usually marketing.
                if tokenize(tail).iter().all(|t| self.vocab.is_noise(t)) {
                    format!("[{}]", quoted.as_str())
                } else {
                    format!("[{}] {}", quoted.as_str(), tail)
                }
            }
            (None, None) => return title.to_string(),
        };
        let stripped = stripped.trim();
        if tokenize(stripped).is_empty() {
            title.to_string()
        } else {
            stripped.to_string()
        }
    }
}
