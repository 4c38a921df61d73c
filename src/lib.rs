//! # blind-redact
//!
//! Entity resolution and redaction for police narrative text.
//!
//! Given a narrative plus lists of known civilian and officer names, the
//! engine finds every surface occurrence of each known entity — full
//! names, bare surnames, rank+surname forms, and gazetteer place names —
//! assigns each distinct referent a stable per-narrative identity, and
//! rewrites the text with bracketed placeholders:
//!
//! - officers → `<Sergeant #1>`
//! - civilians → `<Sally Smith (S1)>` (bracket wraps the matched surface)
//! - known places → `<[neighborhood]>`
//!
//! ## Quick start
//!
//! ```rust
//! use blind_redact::{register_sample_locales, set_locale, redact};
//!
//! register_sample_locales();
//! set_locale("Suffix County").unwrap();
//!
//! let out = redact(
//!     "Sgt. John Jones arrested Sally Smith (S1) in Parkside.",
//!     &["Sally Smith"],
//!     &["Sgt. John Jones"],
//! ).unwrap();
//!
//! assert_eq!(
//!     out.text,
//!     "<Sergeant #1> arrested <Sally Smith (S1)> in <[neighborhood]>."
//! );
//! ```
//!
//! ## Pipeline
//!
//! Data flows strictly extractor → matcher → assigner → rewriter; no
//! stage mutates another's state, and all identity numbering is scoped
//! to one call. Locale tables are read-only after registration and may
//! be shared across concurrent calls.
//!
//! ## The oracle seam
//!
//! Mention detection is a capability the engine depends on but does not
//! own. Any backend can implement [`MentionSource`]; the bundled
//! [`RegexExtractor`] is a pattern-based fallback, and [`FixedMentions`]
//! pins spans in tests. Malformed oracle output (out-of-bounds or
//! overlapping spans) fails the whole call — a partially redacted
//! narrative is worse than an error.

#![warn(missing_docs)]

mod engine;
mod error;
mod identity;
mod locale;
mod matcher;
mod mention;
mod name;
mod rewrite;

pub use engine::{RedactOptions, Redacted, RedactionEngine};
pub use error::{Error, Result, Warning};
pub use identity::{Identity, IdentityAssigner};
pub use locale::{
    load_locale, register_locale, register_sample_locales, Locale, LocaleData,
};
pub use matcher::{Category, MatchAttempt, MatchRule, Matcher, ResolvedEntity};
pub use mention::{
    filter_unknown_places, validate_mentions, FixedMentions, Mention, MentionKind, MentionSource,
    RegexExtractor,
};
pub use name::{normalize, NameRecord, RecordKind};
pub use rewrite::{placeholder, rewrite, Redaction};

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use blind_redact::prelude::*;
    //!
    //! register_sample_locales();
    //! let locale = load_locale("Suffix County").unwrap();
    //! let engine = RedactionEngine::new(locale);
    //! let out = engine.redact("Nothing here.", &[], &[]).unwrap();
    //! assert_eq!(out.text, "Nothing here.");
    //! ```
    pub use crate::engine::{RedactOptions, Redacted, RedactionEngine};
    pub use crate::error::{Error, Result, Warning};
    pub use crate::locale::{load_locale, register_sample_locales, Locale, LocaleData};
    pub use crate::matcher::Category;
    pub use crate::mention::{Mention, MentionKind, MentionSource};
    pub use crate::rewrite::Redaction;
}

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

/// Process-wide current locale for the convenience API. Set once before
/// use; engine-scoped calls ([`RedactionEngine`]) bypass this entirely.
static CURRENT_LOCALE: Lazy<RwLock<Option<Arc<Locale>>>> = Lazy::new(|| RwLock::new(None));

/// Select the process-wide locale used by [`redact`].
///
/// # Errors
///
/// [`Error::UnknownLocale`] if the key has no registered data; the
/// previously configured locale (if any) is left in place.
pub fn set_locale(key: &str) -> Result<()> {
    let locale = load_locale(key)?;
    let mut current = match CURRENT_LOCALE.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *current = Some(locale);
    Ok(())
}

/// The currently configured process-wide locale, if any.
pub fn current_locale() -> Option<Arc<Locale>> {
    let current = match CURRENT_LOCALE.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    current.clone()
}

/// Redact one narrative using the process-wide locale.
///
/// Equivalent to building a [`RedactionEngine`] over
/// [`current_locale`] with default options.
///
/// # Errors
///
/// [`Error::NoLocaleConfigured`] if [`set_locale`] has not been called;
/// otherwise any fatal pipeline error.
pub fn redact(
    narrative: &str,
    civilian_names: &[&str],
    officer_names: &[&str],
) -> Result<Redacted> {
    let locale = current_locale().ok_or(Error::NoLocaleConfigured)?;
    RedactionEngine::new(locale).redact(narrative, civilian_names, officer_names)
}
