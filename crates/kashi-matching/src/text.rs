// SPDX-License-Identifier: GPL-3.0-or-later

//! Low-level string helpers shared by the canonicalizer and the matchers.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Characters the tokenizer splits on, as a regex character class.
pub(crate) const SEPARATOR_CLASS: &str = r#"[\s\-–—_:/|.,!?~"'“”‘’#(){}\[\]]"#;

lazy_static! {
    static ref TOKEN_SPLIT: Regex =
        Regex::new(&format!("{SEPARATOR_CLASS}+")).expect("valid token split regex");
    static ref MULTI_SPACE: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
}

pub fn nfkc(input: &str) -> String {
    input.nfkc().collect()
}

pub fn normalize_spaces(input: &str) -> String {
    MULTI_SPACE.replace_all(input, " ").trim().to_string()
}

/// NFKC, lowercase, then split on whitespace, punctuation and bracket glyphs.
pub fn tokenize(input: &str) -> Vec<String> {
    let lowered = nfkc(input).to_lowercase();
    TOKEN_SPLIT
        .split(&lowered)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drop repeated tokens, keeping first occurrences. Single tokens are left alone.
pub fn dedupe_tokens(tokens: Vec<String>) -> Vec<String> {
    if tokens.len() <= 1 {
        return tokens;
    }
    let mut seen = std::collections::HashSet::new();
    tokens
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

pub fn is_japanese_char(c: char) -> bool {
    matches!(c,
        '\u{3005}'                  // 々
        | '\u{3040}'..='\u{309F}'   // hiragana
        | '\u{30A0}'..='\u{30FF}'   // katakana
        | '\u{31F0}'..='\u{31FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FF66}'..='\u{FF9F}')
}

pub fn has_japanese(input: &str) -> bool {
    input.chars().any(is_japanese_char)
}

/// Lowercase ASCII letters and digits only.
pub fn ascii_fold(input: &str) -> String {
    nfkc(input)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Lowercase with whitespace and punctuation removed; keeps non-ASCII letters.
pub fn strip_punct_lower(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .filter(|c| {
            !(c.is_whitespace()
                || c.is_ascii_punctuation()
                || matches!(c, '–' | '—' | '‘' | '’' | '“' | '”' | '・' | '〜'))
        })
        .collect()
}

/// Whether `phrase` occurs as a contiguous run inside `tokens`.
pub fn contains_phrase<S: AsRef<str>>(tokens: &[S], phrase: &[String]) -> bool {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return false;
    }
    tokens.windows(phrase.len()).any(|window| {
        window
            .iter()
            .zip(phrase)
            .all(|(token, word)| token.as_ref() == word)
    })
}
