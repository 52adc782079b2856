// SPDX-License-Identifier: GPL-3.0-or-later

//! Labels bracketed spans of a title with a [`ParenRole`].

use std::sync::Arc;

use kashi_domain::ParenRole;

use crate::text::tokenize;
use crate::vocabulary::Vocabulary;

/// One bracketed span of a title, in the order it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paren {
    pub inner: String,
    pub role: ParenRole,
}

impl Paren {
    /// Inner tokens minus marker and version words, i.e. the alternate title itself.
    pub fn payload(&self, vocab: &Vocabulary) -> String {
        tokenize(&self.inner)
            .into_iter()
            .filter(|token| !vocab.is_payload_stopword(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone)]
pub struct ParenClassifier {
    vocab: Arc<Vocabulary>,
}

impl ParenClassifier {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    /// First matching rule wins. ASCII-only text on a Japanese title is read as a
    /// romanization unless it is made of known vocabulary.
    pub fn classify(&self, inner: &str, has_japanese: bool) -> ParenRole {
        let tokens = tokenize(inner);
        let vocab = &self.vocab;

        if tokens
            .first()
            .is_some_and(|first| vocab.is_paren_feature_marker(first))
        {
            return ParenRole::Feature;
        }
        if tokens.iter().any(|t| vocab.is_translation_marker(t)) {
            return ParenRole::Translation;
        }
        if tokens.iter().any(|t| vocab.is_romanization_marker(t)) {
            return ParenRole::Romanization;
        }
        if has_japanese && !tokens.is_empty() && inner.is_ascii() && !vocab.has_known_term(&tokens)
        {
            return ParenRole::Romanization;
        }
        if tokens
            .iter()
            .any(|t| vocab.is_descriptor(t) || vocab.is_cover_word(t))
        {
            return ParenRole::Descriptor;
        }
        if tokens.iter().any(|t| vocab.is_edition(t)) || vocab.has_bracket_trigger(&tokens) {
            return ParenRole::Edition;
        }
        ParenRole::Other
    }
}
