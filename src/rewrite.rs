//! Final text assembly.
//!
//! The rewriter walks the original text left to right, substituting the
//! placeholder for each identity-bearing span and copying everything
//! else verbatim. Placeholder conventions:
//!
//! - officers: `<{RankWord} #{index}>`
//! - civilians: `<{original surface}>` (the bracket wraps the exact
//!   matched surface, including any absorbed indicator suffix)
//! - locations: `<[{category}]>`

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::matcher::Category;

/// One applied replacement, reported on the output for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redaction {
    /// Start byte offset of the replaced span in the original text.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// The original surface text that was replaced.
    pub original: String,
    /// The placeholder emitted in its place.
    pub replacement: String,
    /// Referent category.
    pub category: Category,
}

/// Format the placeholder for a resolved span.
///
/// # Errors
///
/// [`Error::Internal`] if the identity is malformed for its category
/// (missing rank/index/label).
pub fn placeholder(identity: &Identity, surface: &str) -> Result<String> {
    match identity.category {
        Category::Officer => {
            let rank = identity
                .rank
                .as_deref()
                .ok_or_else(|| Error::internal("officer identity without rank"))?;
            let index = identity
                .index
                .ok_or_else(|| Error::internal("officer identity without index"))?;
            Ok(format!("<{rank} #{index}>"))
        }
        Category::Civilian => Ok(format!("<{surface}>")),
        Category::Location => {
            let label = identity
                .label
                .as_deref()
                .ok_or_else(|| Error::internal("location identity without label"))?;
            Ok(format!("<[{label}]>"))
        }
        Category::Unmatched => Err(Error::internal("placeholder requested for unmatched span")),
    }
}

/// Rewrite `text`, substituting each planned redaction.
///
/// Redactions must be sorted by start offset and pairwise disjoint;
/// violations indicate a pipeline bug and fail with
/// [`Error::Internal`]. The returned string satisfies the length
/// accounting invariant: output length = input length − Σ span lengths
/// + Σ placeholder lengths.
pub fn rewrite(text: &str, redactions: &[Redaction]) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;

    for r in redactions {
        if r.start < cursor {
            return Err(Error::internal(format!(
                "redaction spans overlap or are unsorted at {}..{}",
                r.start, r.end
            )));
        }
        if r.end > text.len() || !text.is_char_boundary(r.start) || !text.is_char_boundary(r.end) {
            return Err(Error::internal(format!(
                "redaction span {}..{} out of bounds",
                r.start, r.end
            )));
        }
        out.push_str(&text[cursor..r.start]);
        out.push_str(&r.replacement);
        cursor = r.end;
    }
    out.push_str(&text[cursor..]);

    Ok(out)
}
