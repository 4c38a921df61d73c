//! The redaction pipeline: extractor → matcher → assigner → rewriter.
//!
//! One [`RedactionEngine`] wraps one loaded locale plus options and an
//! oracle. Each `redact` call is synchronous, single-threaded, and keeps
//! all identity state call-local, so engines for different narratives can
//! run concurrently sharing the same locale tables.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, Warning};
use crate::identity::IdentityAssigner;
use crate::locale::Locale;
use crate::matcher::{Category, Matcher, ResolvedEntity};
use crate::mention::{filter_unknown_places, validate_mentions, MentionSource, RegexExtractor};
use crate::name::NameRecord;
use crate::rewrite::{placeholder, rewrite, Redaction};

/// Engine options.
#[derive(Debug, Clone)]
pub struct RedactOptions {
    /// Absorb a parenthetical indicator such as `(S1)` or `(R/W1)`
    /// immediately following a resolved civilian mention into the
    /// replaced span, so the bracket wraps "Sally Smith (S1)" as one
    /// unit. When disabled the parenthetical is passthrough text.
    pub absorb_indicator_suffix: bool,
}

impl Default for RedactOptions {
    fn default() -> Self {
        RedactOptions {
            absorb_indicator_suffix: true,
        }
    }
}

/// Result of one redaction call.
#[derive(Debug, Clone)]
pub struct Redacted {
    /// The rewritten narrative.
    pub text: String,
    /// Non-fatal conditions encountered (ambiguous surnames).
    pub warnings: Vec<Warning>,
    /// The replacements that were applied, in span order.
    pub redactions: Vec<Redaction>,
}

/// Entity resolution and redaction engine bound to one locale.
pub struct RedactionEngine {
    locale: Arc<Locale>,
    options: RedactOptions,
    source: Box<dyn MentionSource + Send + Sync>,
}

impl RedactionEngine {
    /// Create an engine using the bundled pattern-based oracle.
    pub fn new(locale: Arc<Locale>) -> Self {
        let source = Box::new(RegexExtractor::for_locale(&locale));
        RedactionEngine {
            locale,
            options: RedactOptions::default(),
            source,
        }
    }

    /// Replace the engine options.
    #[must_use]
    pub fn with_options(mut self, options: RedactOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the mention oracle (e.g. with a statistical model, or a
    /// fixed-span stub in tests).
    #[must_use]
    pub fn with_source(mut self, source: Box<dyn MentionSource + Send + Sync>) -> Self {
        self.source = source;
        self
    }

    /// The locale this engine operates against.
    pub fn locale(&self) -> &Arc<Locale> {
        &self.locale
    }

    /// Redact one narrative against the supplied name lists.
    ///
    /// Fatal errors return no partial output; ambiguous-surname
    /// conditions are reported as warnings on the result instead.
    pub fn redact(
        &self,
        narrative: &str,
        civilian_names: &[&str],
        officer_names: &[&str],
    ) -> Result<Redacted> {
        let mentions = self.source.mentions(narrative)?;
        let mentions = validate_mentions(narrative, mentions)?;
        let mentions = filter_unknown_places(&self.locale, mentions);
        log::debug!("{} candidate mentions after filtering", mentions.len());

        let records = build_records(&self.locale, civilian_names, officer_names);
        let matcher = Matcher::new(&self.locale, &records);
        let (mut resolved, warnings) = matcher.resolve(mentions);

        if self.options.absorb_indicator_suffix {
            absorb_indicator_suffixes(narrative, &mut resolved);
        }

        let mut assigner = IdentityAssigner::new();
        let mut redactions = Vec::new();
        for entity in &resolved {
            if entity.category == Category::Unmatched {
                continue;
            }
            let identity = assigner.assign(entity, &records)?;
            let replacement = placeholder(&identity, &entity.mention.text)?;
            redactions.push(Redaction {
                start: entity.mention.start,
                end: entity.mention.end,
                original: entity.mention.text.clone(),
                replacement,
                category: entity.category,
            });
        }

        let text = rewrite(narrative, &redactions)?;
        Ok(Redacted {
            text,
            warnings,
            redactions,
        })
    }
}

/// Names that mean "no usable name"; such entries are skipped.
const INELIGIBLE_NAMES: [&str; 5] = ["n/a", "na", "none", "missing", "unknown"];

fn eligible(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && !INELIGIBLE_NAMES.contains(&trimmed.to_lowercase().as_str())
}

fn build_records(locale: &Locale, civilians: &[&str], officers: &[&str]) -> Vec<NameRecord> {
    let mut records = Vec::with_capacity(civilians.len() + officers.len());
    for name in civilians.iter().filter(|n| eligible(n)) {
        records.push(NameRecord::civilian(*name, locale));
    }
    for name in officers.iter().filter(|n| eligible(n)) {
        records.push(NameRecord::officer(*name, locale));
    }
    records
}

/// A parenthetical indicator directly after a mention: optional single
/// space, then a short token of letters/digits/slashes in parentheses.
static INDICATOR_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ ?\([A-Za-z0-9][A-Za-z0-9/]{0,7}\)")
        .unwrap_or_else(|e| panic!("invalid indicator pattern: {e}"))
});

/// Extend resolved civilian spans over an adjacent parenthetical
/// indicator such as `(S1)`.
///
/// The extension is skipped when it would collide with the next
/// identity-bearing span.
fn absorb_indicator_suffixes(narrative: &str, resolved: &mut [ResolvedEntity]) {
    let matched_starts: Vec<usize> = resolved
        .iter()
        .filter(|e| e.category != Category::Unmatched)
        .map(|e| e.mention.start)
        .collect();

    for entity in resolved.iter_mut() {
        if entity.category != Category::Civilian {
            continue;
        }
        let end = entity.mention.end;
        let Some(m) = INDICATOR_SUFFIX.find(&narrative[end..]) else {
            continue;
        };
        let new_end = end + m.end();
        if matched_starts
            .iter()
            .any(|&start| start >= end && start < new_end)
        {
            continue;
        }
        entity.mention.end = new_end;
        entity.mention.text = narrative[entity.mention.start..new_end].to_string();
    }
}
