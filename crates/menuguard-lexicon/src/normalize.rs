//! Text normalization with source offset tracking.
//!
//! OCR output is NFKC-normalized and lowercased, punctuation runs collapse to
//! a single space and hyphenated line wraps are rejoined. Every byte of the
//! normalized text keeps the byte span of the source characters that produced
//! it, so matches found in normalized text can be reported against the
//! original input.

use std::ops::Range;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const SOFT_HYPHEN: char = '\u{00AD}';

/// Normalized text plus a per-byte map back into the source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    source_spans: Vec<(usize, usize)>,
}

impl NormalizedText {
    /// The normalized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether normalization left nothing to scan.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Map a byte range of the normalized text to the source byte range it
    /// was produced from.
    ///
    /// Returns `None` for empty or out-of-bounds ranges.
    #[must_use]
    pub fn source_range(&self, range: Range<usize>) -> Option<Range<usize>> {
        if range.start >= range.end || range.end > self.text.len() {
            return None;
        }
        let start = self.source_spans[range.start].0;
        let end = self.source_spans[range.end - 1].1;
        Some(start..end)
    }

    fn push(&mut self, c: char, span: (usize, usize)) {
        self.text.push(c);
        for _ in 0..c.len_utf8() {
            self.source_spans.push(span);
        }
    }

    fn push_separator(&mut self, span: (usize, usize)) {
        if !self.text.is_empty() && !self.text.ends_with(' ') {
            self.push(' ', span);
        }
    }

    fn ends_with_word_char(&self) -> bool {
        self.text.chars().last().is_some_and(is_word_char)
    }
}

/// Normalize OCR text for matching.
///
/// - each character with its combining marks is NFKC-normalized, so
///   fullwidth and decomposed forms read like their plain equivalents
/// - letters and digits are lowercased and kept
/// - any run of other characters becomes one space, trimmed at both ends
/// - soft hyphens are dropped
/// - a hyphen followed by a line break inside a word is removed
///   (`"pea-\nnut"` becomes `"peanut"`)
#[must_use]
pub fn normalize(source: &str) -> NormalizedText {
    normalize_with(source, true).0
}

/// Every plausible reading of `source`.
///
/// A hyphen at a line break is either a wrapped word (`"pea-\nnut"`) or a
/// hyphenated compound that happened to break (`"almond-\nmilk"`), and OCR
/// cannot tell which. The first reading rejoins such breaks like
/// [`normalize`]. When the text has any, a second reading keeps them as
/// separators. Callers scan both and merge what they find.
#[must_use]
pub fn normalize_readings(source: &str) -> Vec<NormalizedText> {
    let (joined, had_wraps) = normalize_with(source, true);
    if had_wraps {
        let (split, _) = normalize_with(source, false);
        vec![joined, split]
    } else {
        vec![joined]
    }
}

/// Normalize a lexicon term; terms and scanned text must agree on form.
#[must_use]
pub fn normalize_term(term: &str) -> String {
    normalize(term).text
}

fn normalize_with(source: &str, rejoin_wraps: bool) -> (NormalizedText, bool) {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut out = NormalizedText {
        text: String::with_capacity(source.len()),
        source_spans: Vec::with_capacity(source.len()),
    };
    let mut had_wraps = false;

    let mut i = 0;
    while i < chars.len() {
        let (offset, c) = chars[i];

        if is_hyphen(c) {
            if out.ends_with_word_char() {
                if let Some(resume) = line_wrap_end(&chars, i) {
                    had_wraps = true;
                    if rejoin_wraps {
                        i = resume;
                        continue;
                    }
                }
            }
            if c == SOFT_HYPHEN {
                i += 1;
                continue;
            }
        }

        // base character plus trailing combining marks
        let mut j = i + 1;
        while j < chars.len() && is_combining_mark(chars[j].1) {
            j += 1;
        }
        let end = chars.get(j).map_or(source.len(), |&(next, _)| next);
        let span = (offset, end);

        for folded in source[offset..end].nfkc() {
            if is_word_char(folded) {
                for lower in folded.to_lowercase() {
                    out.push(lower, span);
                }
            } else {
                out.push_separator(span);
            }
        }

        i = j;
    }

    if out.text.ends_with(' ') {
        out.text.pop();
        out.source_spans.pop();
    }

    (out, had_wraps)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || is_combining_mark(c)
}

fn is_hyphen(c: char) -> bool {
    matches!(c, '-' | SOFT_HYPHEN | '\u{2010}' | '\u{2011}' | '\u{FF0D}')
}

/// If the hyphen at `hyphen_idx` ends a line and the next line continues the
/// word, return the index of the continuation character.
fn line_wrap_end(chars: &[(usize, char)], hyphen_idx: usize) -> Option<usize> {
    let mut j = hyphen_idx + 1;
    while j < chars.len() && matches!(chars[j].1, ' ' | '\t' | '\r') {
        j += 1;
    }
    if j >= chars.len() || chars[j].1 != '\n' {
        return None;
    }
    j += 1;
    while j < chars.len() && chars[j].1.is_whitespace() {
        j += 1;
    }
    if j < chars.len() && is_word_char(chars[j].1) {
        Some(j)
    } else {
        None
    }
}
