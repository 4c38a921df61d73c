//! Error and warning types for blind-redact.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for redaction operations.
///
/// All variants are fatal to the call that raised them: a partially
/// redacted narrative risks leaking identity, so the engine never returns
/// partial output. Recoverable conditions are [`Warning`]s instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The requested locale key has no registered data.
    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    /// `redact` was called before any locale was configured.
    #[error("No locale configured; call set_locale first")]
    NoLocaleConfigured,

    /// The mention extraction oracle failed or returned malformed spans.
    #[error("Extractor failure: {0}")]
    Extractor(String),

    /// An internal consistency check failed. Always indicates a bug.
    #[error("Internal consistency error: {0}")]
    Internal(String),

    /// IO error while loading locale data.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an unknown-locale error.
    pub fn unknown_locale(key: impl Into<String>) -> Self {
        Error::UnknownLocale(key.into())
    }

    /// Create an extractor failure.
    pub fn extractor(msg: impl Into<String>) -> Self {
        Error::Extractor(msg.into())
    }

    /// Create an internal consistency error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

/// Non-fatal conditions collected during a redaction call.
///
/// Warnings never abort the call; they are returned on
/// [`crate::Redacted::warnings`] for caller inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Warning {
    /// A bare surname matched more than one supplied name, so the mention
    /// was left untouched rather than guessed.
    AmbiguousSurname {
        /// The normalized surname that was ambiguous.
        surname: String,
        /// Start byte offset of the mention in the original text.
        start: usize,
        /// End byte offset (exclusive) of the mention.
        end: usize,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::AmbiguousSurname {
                surname,
                start,
                end,
            } => write!(
                f,
                "ambiguous surname {surname:?} at {start}..{end}; mention left unredacted"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let e = Error::unknown_locale("Atlantis");
        assert_eq!(e.to_string(), "Unknown locale: Atlantis");

        let e = Error::NoLocaleConfigured;
        assert!(e.to_string().contains("set_locale"));
    }

    #[test]
    fn warning_display_and_serde() {
        let w = Warning::AmbiguousSurname {
            surname: "smith".into(),
            start: 10,
            end: 15,
        };
        assert!(w.to_string().contains("smith"));

        let json = serde_json::to_string(&w).unwrap();
        let back: Warning = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }
}
