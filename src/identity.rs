//! Per-call identity assignment.
//!
//! Each distinct referent gets one [`Identity`] per redaction call,
//! allocated lazily in span order: the first distinct civilian in the
//! text is index 1, the next new civilian index 2, and so on. Officers
//! are numbered per distinct rank word, so the first Sergeant is
//! "Sergeant #1" even when a Detective appears earlier. Locations
//! collapse to their category label and carry no index. All state is
//! call-local; nothing persists across narratives.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matcher::{Category, ResolvedEntity};
use crate::name::NameRecord;

/// Default rank word for officer records without a recognized rank.
const DEFAULT_RANK: &str = "Officer";

/// The stable per-call identity of one referent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Referent category.
    pub category: Category,
    /// 1-based ordinal, per category (officers: per rank word).
    /// None for locations.
    pub index: Option<u32>,
    /// Canonical rank word, for officers.
    pub rank: Option<String>,
    /// Neutral category label, for locations.
    pub label: Option<String>,
}

/// Allocates and reuses identities for one redaction call.
#[derive(Debug, Default)]
pub struct IdentityAssigner {
    by_record: HashMap<usize, Identity>,
    by_label: HashMap<String, Identity>,
    civilian_count: u32,
    officer_counts: HashMap<String, u32>,
}

impl IdentityAssigner {
    /// Create an empty assigner.
    pub fn new() -> Self {
        IdentityAssigner::default()
    }

    /// Return the identity for a resolved entity, allocating one if this
    /// referent has not been seen yet in this call.
    ///
    /// # Errors
    ///
    /// [`Error::Internal`] if the entity is unmatched, or matched but
    /// missing its record/label reference. Both indicate caller bugs.
    pub fn assign(&mut self, entity: &ResolvedEntity, records: &[NameRecord]) -> Result<Identity> {
        match entity.category {
            Category::Unmatched => Err(Error::internal(
                "identity requested for an unmatched entity",
            )),
            Category::Location => {
                let label = entity
                    .label
                    .as_deref()
                    .ok_or_else(|| Error::internal("location entity without category label"))?;
                Ok(self
                    .by_label
                    .entry(label.to_string())
                    .or_insert_with(|| Identity {
                        category: Category::Location,
                        index: None,
                        rank: None,
                        label: Some(label.to_string()),
                    })
                    .clone())
            }
            Category::Civilian | Category::Officer => {
                let record_idx = entity
                    .record
                    .ok_or_else(|| Error::internal("matched entity without record reference"))?;
                let record = records.get(record_idx).ok_or_else(|| {
                    Error::internal(format!("record index {record_idx} out of range"))
                })?;

                if let Some(existing) = self.by_record.get(&record_idx) {
                    return Ok(existing.clone());
                }

                let identity = match entity.category {
                    Category::Civilian => {
                        self.civilian_count += 1;
                        Identity {
                            category: Category::Civilian,
                            index: Some(self.civilian_count),
                            rank: None,
                            label: None,
                        }
                    }
                    _ => {
                        let rank = record.rank.clone().unwrap_or_else(|| DEFAULT_RANK.into());
                        let count = self.officer_counts.entry(rank.clone()).or_insert(0);
                        *count += 1;
                        Identity {
                            category: Category::Officer,
                            index: Some(*count),
                            rank: Some(rank),
                            label: None,
                        }
                    }
                };

                self.by_record.insert(record_idx, identity.clone());
                Ok(identity)
            }
        }
    }
}
