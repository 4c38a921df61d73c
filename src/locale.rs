//! Locale registry: per-jurisdiction rank and place lexicons.
//!
//! A [`Locale`] bundles two lookup tables:
//!
//! - `rank_table`: rank abbreviation → canonical rank word ("Sgt" → "Sergeant")
//! - `place_table`: place name → neutral category label ("Parkside" → "neighborhood")
//!
//! Locales are registered once from [`LocaleData`] and immutable afterwards,
//! so lookups are safe to share across concurrent redaction calls.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Serializable locale definition, as supplied by the data artifact.
///
/// Table keys are stored verbatim; normalization (trailing periods on rank
/// abbreviations, case on place names) happens at registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleData {
    /// Registry key, compared case-insensitively.
    pub key: String,
    /// Rank abbreviation (or full rank word) → canonical rank word.
    pub rank_table: HashMap<String, String>,
    /// Place name → neutral category label.
    pub place_table: HashMap<String, String>,
}

impl LocaleData {
    /// Create an empty locale definition with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        LocaleData {
            key: key.into(),
            ..LocaleData::default()
        }
    }

    /// Add a rank abbreviation mapping.
    #[must_use]
    pub fn with_rank(mut self, abbrev: impl Into<String>, word: impl Into<String>) -> Self {
        self.rank_table.insert(abbrev.into(), word.into());
        self
    }

    /// Add a place-name mapping.
    #[must_use]
    pub fn with_place(mut self, name: impl Into<String>, category: impl Into<String>) -> Self {
        self.place_table.insert(name.into(), category.into());
        self
    }
}

/// An immutable, loaded locale.
///
/// Built from [`LocaleData`] when registered; holds the lookup tables plus
/// a compiled place-name pattern used by the bundled extractor.
#[derive(Debug)]
pub struct Locale {
    key: String,
    /// Abbreviation (trailing period stripped) → canonical rank word.
    rank_table: HashMap<String, String>,
    /// Lowercased place name → category label.
    place_table: HashMap<String, String>,
    /// Case-insensitive, word-bounded alternation over all place names.
    /// None when the place table is empty.
    place_pattern: Option<Regex>,
}

impl Locale {
    fn from_data(data: &LocaleData) -> Self {
        let rank_table = data
            .rank_table
            .iter()
            .map(|(k, v)| (k.trim_end_matches('.').to_string(), v.clone()))
            .collect();

        let place_table: HashMap<String, String> = data
            .place_table
            .iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v.clone()))
            .collect();

        let place_pattern = compile_place_pattern(place_table.keys());

        Locale {
            key: data.key.clone(),
            rank_table,
            place_table,
            place_pattern,
        }
    }

    /// Registry key as originally supplied.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Look up the canonical rank word for an abbreviation token.
    ///
    /// Case-sensitive on the token, tolerant of one trailing period:
    /// `"Sgt."` and `"Sgt"` both resolve, `"sgt"` does not.
    pub fn lookup_rank(&self, abbrev: &str) -> Option<&str> {
        self.rank_table
            .get(abbrev.trim_end_matches('.'))
            .map(String::as_str)
    }

    /// Look up the neutral category for a place name.
    ///
    /// Case-insensitive; leading/trailing whitespace is ignored.
    pub fn lookup_place(&self, name: &str) -> Option<&str> {
        self.place_table
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Compiled place-name pattern for the bundled extractor, if any
    /// places are registered.
    pub(crate) fn place_pattern(&self) -> Option<&Regex> {
        self.place_pattern.as_ref()
    }

    /// Iterate rank table entries (abbreviation, canonical word).
    pub fn ranks(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rank_table
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Compile a single case-insensitive alternation over place names.
///
/// Longer names come first in the alternation so that multi-word places
/// win over their prefixes.
fn compile_place_pattern<'a>(names: impl Iterator<Item = &'a String>) -> Option<Regex> {
    let mut escaped: Vec<String> = names.map(|n| regex::escape(n)).collect();
    if escaped.is_empty() {
        return None;
    }
    escaped.sort_by_key(|e| std::cmp::Reverse(e.len()));
    let pattern = format!(r"(?i)\b(?:{})\b", escaped.join("|"));
    // The pattern is built from escaped literals, so compilation can only
    // fail on pathological sizes; treat that as no pattern.
    Regex::new(&pattern).ok()
}

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<Locale>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn registry_read() -> RwLockReadGuard<'static, HashMap<String, Arc<Locale>>> {
    match REGISTRY.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn registry_write() -> RwLockWriteGuard<'static, HashMap<String, Arc<Locale>>> {
    match REGISTRY.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Register locale data, replacing any previous registration for the key.
///
/// Keys are compared case-insensitively.
pub fn register_locale(data: &LocaleData) -> Arc<Locale> {
    let locale = Arc::new(Locale::from_data(data));
    registry_write().insert(data.key.trim().to_lowercase(), Arc::clone(&locale));
    locale
}

/// Fetch a previously registered locale.
///
/// # Errors
///
/// [`Error::UnknownLocale`] if the key has no registered data.
pub fn load_locale(key: &str) -> Result<Arc<Locale>> {
    registry_read()
        .get(&key.trim().to_lowercase())
        .cloned()
        .ok_or_else(|| Error::unknown_locale(key))
}

/// Register the two sample locales used for development and testing:
/// "Suffix County" and "Prefixton".
///
/// Both share the same rank table and gazetteer; the real localizations
/// are external data artifacts.
pub fn register_sample_locales() {
    for key in ["Suffix County", "Prefixton"] {
        let mut data = LocaleData::new(key);
        for (abbrev, word) in [
            ("Officer", "Officer"),
            ("Ofc", "Officer"),
            ("Off", "Officer"),
            ("Sergeant", "Sergeant"),
            ("Sgt", "Sergeant"),
            ("Detective", "Detective"),
            ("Det", "Detective"),
            ("Inspector", "Inspector"),
            ("Insp", "Inspector"),
            ("Sheriff", "Sheriff"),
            ("Commissioner", "Commissioner"),
            ("Comm", "Commissioner"),
            ("FTO", "FTO"),
            ("PSA", "PSA"),
        ] {
            data = data.with_rank(abbrev, word);
        }
        for neighborhood in [
            "Parkside",
            "Chinatown",
            "Eastlake",
            "Pinnacle Heights",
            "Little Russia",
            "Canal Street",
        ] {
            data = data.with_place(neighborhood, "neighborhood");
        }
        for district in ["Central", "Western", "Southern", "Lake", "Park", "University"] {
            data = data.with_place(district, "district");
        }
        register_locale(&data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_locale() -> Arc<Locale> {
        let data = LocaleData::new("Test County")
            .with_rank("Sgt", "Sergeant")
            .with_rank("Det.", "Detective")
            .with_place("Parkside", "neighborhood")
            .with_place(" Canal Street ", "neighborhood");
        register_locale(&data)
    }

    #[test]
    fn rank_lookup_is_case_sensitive_and_period_tolerant() {
        let locale = test_locale();
        assert_eq!(locale.lookup_rank("Sgt"), Some("Sergeant"));
        assert_eq!(locale.lookup_rank("Sgt."), Some("Sergeant"));
        assert_eq!(locale.lookup_rank("sgt"), None);
        // Registered with a trailing period, queried without.
        assert_eq!(locale.lookup_rank("Det"), Some("Detective"));
    }

    #[test]
    fn place_lookup_is_case_insensitive_and_trims() {
        let locale = test_locale();
        assert_eq!(locale.lookup_place("parkside"), Some("neighborhood"));
        assert_eq!(locale.lookup_place("PARKSIDE"), Some("neighborhood"));
        assert_eq!(locale.lookup_place("  Canal Street "), Some("neighborhood"));
        assert_eq!(locale.lookup_place("Atlantis"), None);
    }

    #[test]
    fn unknown_locale_errors() {
        let err = load_locale("nowhere-at-all").unwrap_err();
        assert!(matches!(err, Error::UnknownLocale(_)));
    }

    #[test]
    fn load_is_key_case_insensitive() {
        test_locale();
        assert!(load_locale("test county").is_ok());
        assert!(load_locale("TEST COUNTY").is_ok());
    }

    #[test]
    fn place_pattern_prefers_longer_names() {
        let data = LocaleData::new("Pattern County")
            .with_place("Pinnacle", "neighborhood")
            .with_place("Pinnacle Heights", "neighborhood");
        let locale = register_locale(&data);
        let pattern = locale.place_pattern().unwrap();
        let m = pattern.find("near Pinnacle Heights today").unwrap();
        assert_eq!(m.as_str(), "Pinnacle Heights");
    }

    #[test]
    fn sample_locales_register() {
        register_sample_locales();
        let suffix = load_locale("Suffix County").unwrap();
        assert_eq!(suffix.lookup_rank("Sgt."), Some("Sergeant"));
        assert_eq!(suffix.lookup_place("Parkside"), Some("neighborhood"));
        assert!(load_locale("Prefixton").is_ok());
    }

    #[test]
    fn locale_data_serde_roundtrip() {
        let data = LocaleData::new("Roundtrip")
            .with_rank("Sgt", "Sergeant")
            .with_place("Parkside", "neighborhood");
        let json = serde_json::to_string(&data).unwrap();
        let back: LocaleData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.key, "Roundtrip");
        assert_eq!(back.rank_table.get("Sgt").map(String::as_str), Some("Sergeant"));
        assert_eq!(
            back.place_table.get("Parkside").map(String::as_str),
            Some("neighborhood")
        );
    }
}
