//! Known-name records and surface-form normalization.
//!
//! A [`NameRecord`] holds one caller-supplied civilian or officer name,
//! normalized for matching, plus the partial forms the matcher may try:
//! the bare surname and, for officers, the rank+surname decomposition.

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// Whether a record came from the civilian or the officer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Supplied on the civilian name list.
    Civilian,
    /// Supplied on the officer name list.
    Officer,
}

/// A known civilian or officer name, decomposed for matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRecord {
    /// The name exactly as supplied by the caller.
    pub raw: String,
    /// Which list the record came from.
    pub kind: RecordKind,
    /// Case-folded, punctuation-stripped form with any leading rank
    /// abbreviation canonicalized to the full rank word.
    pub normalized: String,
    /// Last token of the normalized form, if any.
    pub surname: Option<String>,
    /// Canonical rank word parsed from a leading abbreviation
    /// (officers only).
    pub rank: Option<String>,
    /// `"{rank} {surname}"` partial form (officers with both parts).
    pub rank_surname: Option<String>,
}

impl NameRecord {
    /// Build a record from a civilian name.
    pub fn civilian(raw: impl Into<String>, locale: &Locale) -> Self {
        Self::build(raw.into(), RecordKind::Civilian, locale)
    }

    /// Build a record from an officer name.
    pub fn officer(raw: impl Into<String>, locale: &Locale) -> Self {
        Self::build(raw.into(), RecordKind::Officer, locale)
    }

    fn build(raw: String, kind: RecordKind, locale: &Locale) -> Self {
        let normalized = normalize(&raw, locale);
        let rank = leading_rank(&raw, locale).map(str::to_string);

        // The surname is the last normalized token, excluding the rank
        // word itself when the whole name is just a rank ("Sgt.").
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        let surname = match (tokens.last(), &rank) {
            (Some(last), Some(rank_word)) if tokens.len() == 1 => {
                if *last == rank_word.to_lowercase() {
                    None
                } else {
                    Some((*last).to_string())
                }
            }
            (Some(last), _) => Some((*last).to_string()),
            (None, _) => None,
        };

        let rank_surname = match (kind, &rank, &surname) {
            (RecordKind::Officer, Some(rank_word), Some(sur)) => {
                Some(format!("{} {}", rank_word.to_lowercase(), sur))
            }
            _ => None,
        };

        NameRecord {
            raw,
            kind,
            normalized,
            surname,
            rank,
            rank_surname,
        }
    }
}

/// Normalize a surface form for matching.
///
/// Tokens are lowercased via [`str::to_lowercase`] (characters with no
/// lowercase mapping, such as `𝕊`, pass through unchanged) with
/// non-alphanumeric characters trimmed from both ends (inner hyphens
/// and apostrophes survive). A leading rank
/// abbreviation recognized by the locale is replaced by its canonical
/// rank word, so `"Sgt. John Jones"` and `"Sergeant John Jones"`
/// normalize identically.
pub fn normalize(surface: &str, locale: &Locale) -> String {
    let mut out: Vec<String> = Vec::new();
    for (i, token) in surface.split_whitespace().enumerate() {
        if i == 0 {
            if let Some(word) = locale.lookup_rank(token) {
                out.push(word.to_lowercase());
                continue;
            }
        }
        let trimmed = token.trim_matches(|c: char| !c.is_alphanumeric());
        if !trimmed.is_empty() {
            out.push(trimmed.to_lowercase());
        }
    }
    out.join(" ")
}

/// Canonical rank word for the leading token of a surface form, if the
/// locale recognizes it.
pub fn leading_rank<'a>(surface: &str, locale: &'a Locale) -> Option<&'a str> {
    let first = surface.split_whitespace().next()?;
    locale.lookup_rank(first)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::locale::{register_locale, LocaleData};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "[A-Za-z .,'\\-]{0,40}") {
            let locale = register_locale(
                &LocaleData::new("name-proptests").with_rank("Sgt", "Sergeant"),
            );
            let once = normalize(&s, &locale);
            let twice = normalize(&once, &locale);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalized_is_case_folded(s in "\\PC{0,40}") {
            let locale = register_locale(
                &LocaleData::new("name-proptests-2").with_rank("Sgt", "Sergeant"),
            );
            let normalized = normalize(&s, &locale);
            // Uppercase characters survive only when they have no
            // distinct lowercase mapping (e.g. U+1D54A "𝕊").
            prop_assert!(normalized
                .chars()
                .all(|c| !c.is_uppercase() || c.to_lowercase().eq(std::iter::once(c))));
        }
    }
}
