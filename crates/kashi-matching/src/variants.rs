// SPDX-License-Identifier: GPL-3.0-or-later

//! The set of canonical strings a displayed title could stand for.

use std::collections::BTreeSet;
use std::sync::Arc;

use kashi_domain::ParenRole;
use lazy_static::lazy_static;
use regex::Regex;

use crate::cache::MatchCache;
use crate::canonicalize::{Canonicalizer, ParsedTitle};
use crate::text::{ascii_fold, tokenize};

lazy_static! {
    // "A / B" and "A | B" medleys; "AC/DC" is not split.
    static ref FRAGMENT_SPLIT: Regex =
        Regex::new(r"\s+/\s*|\s*/\s+|\s*\|\s*").expect("valid fragment split regex");
}

/// Alternate title carried by a romanization or translation bracket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateTitle {
    pub role: ParenRole,
    /// Index among brackets of the same role.
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleVariants {
    raw: String,
    forms: BTreeSet<String>,
    parsed: ParsedTitle,
    alternates: Vec<AlternateTitle>,
    fragments: Vec<String>,
    cover_detected: bool,
}

impl TitleVariants {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn parsed(&self) -> &ParsedTitle {
        &self.parsed
    }

    pub fn base(&self) -> String {
        self.parsed.base_text()
    }

    pub fn japanese_title(&self) -> Option<String> {
        self.parsed.japanese_text()
    }

    /// Romanization and translation payloads in bracket order.
    pub fn alternates(&self) -> &[AlternateTitle] {
        &self.alternates
    }

    /// Canonical bases of medley fragments that differ from the main base.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// The title credits a cover performance.
    pub fn cover_detected(&self) -> bool {
        self.cover_detected
    }

    pub fn forms(&self) -> &BTreeSet<String> {
        &self.forms
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.forms.iter().map(String::as_str)
    }

    pub fn contains(&self, form: &str) -> bool {
        self.forms.contains(form)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

#[derive(Clone)]
pub struct VariantGenerator {
    canonicalizer: Canonicalizer,
    cache: MatchCache,
}

impl VariantGenerator {
    pub fn new(canonicalizer: Canonicalizer, cache: MatchCache) -> Self {
        Self {
            canonicalizer,
            cache,
        }
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Deterministic for a given `(raw, artist)`; non-empty whenever `raw` is.
    pub fn variants(&self, raw: &str, artist: Option<&str>) -> Arc<TitleVariants> {
        self.cache
            .variants(raw, artist, || self.generate(raw, artist))
    }

    fn generate(&self, raw: &str, artist: Option<&str>) -> TitleVariants {
        let canonicalizer = &self.canonicalizer;
        let vocab = canonicalizer.vocabulary();
        let parsed = canonicalizer.parse(raw, artist);
        let base = parsed.base_text();

        let mut alternates = Vec::new();
        let (mut romanized, mut translated) = (0, 0);
        for paren in &parsed.parens {
            let counter = match paren.role {
                ParenRole::Romanization => &mut romanized,
                ParenRole::Translation => &mut translated,
                _ => continue,
            };
            let text = paren.payload(vocab);
            if text.is_empty() {
                continue;
            }
            alternates.push(AlternateTitle {
                role: paren.role,
                index: *counter,
                text,
            });
            *counter += 1;
        }

        let mut forms = BTreeSet::new();
        forms.insert(base.clone());
        if let Some(short) = parsed.without_feature_tail() {
            forms.insert(short);
        }
        forms.insert(canonicalizer.canonicalize(raw, artist));
        if !alternates.is_empty() {
            let combined = alternates
                .iter()
                .fold(base.clone(), |acc, alt| format!("{acc} {}", alt.text));
            forms.insert(canonicalizer.canonicalize(&combined, None));
        }
        for alt in &alternates {
            match alt.role {
                ParenRole::Romanization => forms.insert(ascii_fold(&alt.text)),
                _ => forms.insert(canonicalizer.canonicalize(&alt.text, None)),
            };
        }
        if !parsed.has_japanese {
            forms.insert(ascii_fold(&base));
        }
        forms.retain(|form| !form.is_empty());

        if forms.is_empty() {
            let tokens = tokenize(raw).join(" ");
            let fallback = if tokens.is_empty() {
                raw.trim().to_lowercase()
            } else {
                tokens
            };
            let fallback = if fallback.is_empty() {
                raw.to_lowercase()
            } else {
                fallback
            };
            if !fallback.is_empty() {
                forms.insert(fallback);
            }
        }

        let fragments = self.fragments(raw, artist, &base);
        let cover_detected = vocab.mentions_cover(&canonicalizer.prepare(raw, artist));

        TitleVariants {
            raw: raw.to_string(),
            forms,
            parsed,
            alternates,
            fragments,
            cover_detected,
        }
    }

    fn fragments(&self, raw: &str, artist: Option<&str>, base: &str) -> Vec<String> {
        let prepared = self.canonicalizer.prepare(raw, artist);
        let vocab = self.canonicalizer.vocabulary();
        let pieces: Vec<&str> = FRAGMENT_SPLIT
            .split(&prepared)
            .filter(|piece| !piece.trim().is_empty())
            .collect();
        if pieces.len() < 2 {
            return Vec::new();
        }

        let mut fragments: Vec<String> = Vec::new();
        for piece in pieces {
            if tokenize(piece).iter().all(|token| vocab.is_noise(token)) {
                continue;
            }
            let fragment = self.canonicalizer.parse(piece, None).base_text();
            if fragment.chars().count() > 1 && fragment != base && !fragments.contains(&fragment) {
                fragments.push(fragment);
            }
        }
        fragments
    }
}
