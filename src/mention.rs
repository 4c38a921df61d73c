//! Candidate mention spans and the extraction oracle seam.
//!
//! The engine does not implement entity detection from scratch; it
//! consumes candidate spans from a [`MentionSource`] oracle. The bundled
//! [`RegexExtractor`] is a pattern-based oracle in the spirit of a
//! minimal fallback backend: it finds gazetteer place names and
//! capitalized token runs. Any statistical model can be swapped in by
//! implementing the trait, and tests can pin fixed spans with
//! [`FixedMentions`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::locale::Locale;

/// Coarse mention kind reported by the extraction oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MentionKind {
    /// Span that looks like a reference to a person.
    PersonLike,
    /// Span that looks like a reference to a place.
    LocationLike,
}

/// A candidate mention: a half-open byte span in the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Surface text of the span.
    pub text: String,
    /// Coarse kind from the oracle.
    pub kind: MentionKind,
}

impl Mention {
    /// Create a mention over `text[start..end]`.
    pub fn new(text: impl Into<String>, kind: MentionKind, start: usize, end: usize) -> Self {
        Mention {
            start,
            end,
            text: text.into(),
            kind,
        }
    }

    /// Check whether this span overlaps another.
    #[must_use]
    pub fn overlaps(&self, other: &Mention) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }
}

/// External mention-extraction oracle.
///
/// One call per narrative; implementations must not keep state between
/// calls. The engine validates the returned spans, so implementations do
/// not need to guarantee ordering or non-overlap, but malformed spans
/// (out of bounds, not on char boundaries, overlapping) fail the whole
/// redaction call.
pub trait MentionSource {
    /// Extract candidate mentions from the text.
    fn mentions(&self, text: &str) -> Result<Vec<Mention>>;
}

/// Fixed-span oracle for tests.
#[derive(Debug, Clone, Default)]
pub struct FixedMentions {
    spans: Vec<Mention>,
}

impl FixedMentions {
    /// Create an oracle that always returns the given mentions.
    pub fn new(spans: Vec<Mention>) -> Self {
        FixedMentions { spans }
    }
}

impl MentionSource for FixedMentions {
    fn mentions(&self, _text: &str) -> Result<Vec<Mention>> {
        Ok(self.spans.clone())
    }
}

/// Validate oracle output and return it sorted by start offset.
///
/// # Errors
///
/// [`Error::Extractor`] when a span is out of bounds, not on UTF-8 char
/// boundaries, empty, disagrees with the underlying text, or overlaps
/// another span.
pub fn validate_mentions(text: &str, mut mentions: Vec<Mention>) -> Result<Vec<Mention>> {
    for m in &mentions {
        if m.start >= m.end || m.end > text.len() {
            return Err(Error::extractor(format!(
                "span {}..{} out of bounds for text of length {}",
                m.start,
                m.end,
                text.len()
            )));
        }
        if !text.is_char_boundary(m.start) || !text.is_char_boundary(m.end) {
            return Err(Error::extractor(format!(
                "span {}..{} not on char boundaries",
                m.start, m.end
            )));
        }
        if text[m.start..m.end] != m.text {
            return Err(Error::extractor(format!(
                "span {}..{} surface {:?} does not match text",
                m.start, m.end, m.text
            )));
        }
    }

    mentions.sort_by_key(|m| (m.start, m.end));
    for pair in mentions.windows(2) {
        if pair[0].overlaps(&pair[1]) {
            return Err(Error::extractor(format!(
                "overlapping spans {}..{} and {}..{}",
                pair[0].start, pair[0].end, pair[1].start, pair[1].end
            )));
        }
    }

    Ok(mentions)
}

/// Drop location-like mentions that are not in the locale's place table.
///
/// The engine redacts only known places, so location-like spans the
/// gazetteer does not recognize never reach the matcher.
pub fn filter_unknown_places(locale: &Locale, mentions: Vec<Mention>) -> Vec<Mention> {
    mentions
        .into_iter()
        .filter(|m| match m.kind {
            MentionKind::PersonLike => true,
            MentionKind::LocationLike => locale.lookup_place(&m.text).is_some(),
        })
        .collect()
}

/// Pattern-based mention oracle built for one locale.
///
/// Location-like candidates come from the locale's compiled gazetteer
/// pattern; person-like candidates are runs of up to six capitalized
/// tokens, optionally preceded by a rank abbreviation from the locale
/// (so "Sgt. John Jones" is one run, while "Smith. Sally" stays two —
/// only a rank prefix may carry a period). Overlaps are resolved
/// longest-match-first, with location candidates winning exact ties.
/// Spans inside placeholder-shaped `<...>` regions are never emitted,
/// so already-redacted text stays untouched.
pub struct RegexExtractor {
    place_pattern: Option<Regex>,
    person_pattern: Regex,
}

/// Runs of 1-6 capitalized tokens, no periods.
const NAME_RUN: &str = r"\p{Lu}[\p{L}'\-]*(?:[ \t]\p{Lu}[\p{L}'\-]*){0,5}";

/// Fallback person pattern for locales with no rank table.
static BARE_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b{NAME_RUN}\b"))
        .unwrap_or_else(|e| panic!("invalid person-run pattern: {e}"))
});

impl RegexExtractor {
    /// Build an extractor for the given locale.
    pub fn for_locale(locale: &Locale) -> Self {
        RegexExtractor {
            place_pattern: locale.place_pattern().cloned(),
            person_pattern: compile_person_pattern(locale),
        }
    }

    fn candidates(&self, text: &str) -> Vec<Mention> {
        let protected = protected_regions(text);
        let shielded = |start: usize, end: usize| {
            protected
                .iter()
                .any(|&(ps, pe)| !(end <= ps || start >= pe))
        };

        let mut found: Vec<Mention> = Vec::new();

        if let Some(pattern) = &self.place_pattern {
            for m in pattern.find_iter(text) {
                if !shielded(m.start(), m.end()) {
                    found.push(Mention::new(
                        m.as_str(),
                        MentionKind::LocationLike,
                        m.start(),
                        m.end(),
                    ));
                }
            }
        }

        for m in self.person_pattern.find_iter(text) {
            // Single characters ("S" inside an indicator like "(S1)") are
            // never useful person candidates.
            if m.as_str().chars().count() <= 1 {
                continue;
            }
            if !shielded(m.start(), m.end()) {
                found.push(Mention::new(
                    m.as_str(),
                    MentionKind::PersonLike,
                    m.start(),
                    m.end(),
                ));
            }
        }

        found
    }
}

impl MentionSource for RegexExtractor {
    fn mentions(&self, text: &str) -> Result<Vec<Mention>> {
        let mut found = self.candidates(text);

        // Longest match wins; a location beats a person run on an
        // identical span (the gazetteer is the stronger signal).
        found.sort_by_key(|m| {
            (
                m.start,
                std::cmp::Reverse(m.end),
                m.kind != MentionKind::LocationLike,
            )
        });

        let mut kept: Vec<Mention> = Vec::new();
        for m in found {
            match kept.last() {
                Some(prev) if prev.overlaps(&m) => {
                    // Equal spans: prefer the location candidate, which
                    // sorts first, so the person duplicate is dropped here.
                }
                _ => kept.push(m),
            }
        }

        Ok(kept)
    }
}

/// Build the person-run pattern, allowing an optional rank-abbreviation
/// prefix (longest alternatives first) with a tolerated trailing period.
fn compile_person_pattern(locale: &Locale) -> Regex {
    let mut abbrevs: Vec<String> = locale
        .ranks()
        .map(|(abbrev, _)| regex::escape(abbrev))
        .collect();
    if abbrevs.is_empty() {
        return BARE_RUN.clone();
    }
    abbrevs.sort_by_key(|a| std::cmp::Reverse(a.len()));
    let pattern = format!(r"\b(?:(?:{})\.?[ \t])?{NAME_RUN}\b", abbrevs.join("|"));
    // Built from escaped literals; fall back to the bare run if the
    // rank table is large enough to break compilation.
    Regex::new(&pattern).unwrap_or_else(|_| BARE_RUN.clone())
}

/// Byte ranges of placeholder-shaped `<...>` segments: no nesting, no
/// inner `<`, and non-whitespace immediately inside both brackets.
///
/// The rewriter only ever emits regions of that shape, so prose like
/// `age < 30 ... > 6 ft` is not mistaken for already-redacted text.
fn protected_regions(text: &str) -> Vec<(usize, usize)> {
    static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"<\S(?:[^<>]*\S)?>")
            .unwrap_or_else(|e| panic!("invalid placeholder pattern: {e}"))
    });
    PLACEHOLDER
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect()
}
