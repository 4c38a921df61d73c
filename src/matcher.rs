//! Entity matching: resolving mentions against supplied name records.
//!
//! The matching policy is a small ranked set of rules evaluated in fixed
//! priority order per mention; the first rule that succeeds wins and
//! later rules are not consulted:
//!
//! 1. exact normalized full-form match against any record;
//! 2. exact match against an officer record's rank+surname form;
//! 3. exact bare-surname match, only when exactly one record (across
//!    both lists) carries that surname — otherwise the mention stays
//!    unmatched and an ambiguity warning is collected.

use serde::{Deserialize, Serialize};

use crate::error::Warning;
use crate::locale::Locale;
use crate::mention::{Mention, MentionKind};
use crate::name::{normalize, NameRecord, RecordKind};

/// Category a resolved mention falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Matched a supplied civilian name.
    Civilian,
    /// Matched a supplied officer name.
    Officer,
    /// A known place from the locale gazetteer.
    Location,
    /// No known entity; left untouched by the rewriter.
    Unmatched,
}

/// Which matching rule produced a person match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchRule {
    /// Rule 1: full normalized form.
    FullName,
    /// Rule 2: rank + surname (officers only).
    RankSurname,
    /// Rule 3: unique bare surname.
    Surname,
}

/// Outcome of running the ranked rules against one mention surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchAttempt {
    /// No rule matched.
    NoMatch,
    /// A rule matched the record at the given index.
    Matched {
        /// Index into the record list.
        record: usize,
        /// The rule that fired.
        rule: MatchRule,
    },
    /// Rule 3 found several records sharing the surname; left unmatched.
    AmbiguousSurname {
        /// The contested surname.
        surname: String,
    },
}

/// A mention resolved against the known entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedEntity {
    /// The underlying mention span.
    pub mention: Mention,
    /// Assigned category.
    pub category: Category,
    /// Index of the matched [`NameRecord`], for civilians and officers.
    pub record: Option<usize>,
    /// Neutral category label, for locations.
    pub label: Option<String>,
    /// The rule that matched, for person categories.
    pub rule: Option<MatchRule>,
}

impl ResolvedEntity {
    fn unmatched(mention: Mention) -> Self {
        ResolvedEntity {
            mention,
            category: Category::Unmatched,
            record: None,
            label: None,
            rule: None,
        }
    }
}

/// Resolves mentions against a fixed set of name records.
pub struct Matcher<'a> {
    locale: &'a Locale,
    records: &'a [NameRecord],
}

impl<'a> Matcher<'a> {
    /// Create a matcher over the supplied records.
    pub fn new(locale: &'a Locale, records: &'a [NameRecord]) -> Self {
        Matcher { locale, records }
    }

    /// Run the ranked matching rules against a normalized surface form.
    pub fn attempt(&self, normalized: &str) -> MatchAttempt {
        // Rule 1: full normalized form.
        for (i, record) in self.records.iter().enumerate() {
            if !record.normalized.is_empty() && record.normalized == normalized {
                return MatchAttempt::Matched {
                    record: i,
                    rule: MatchRule::FullName,
                };
            }
        }

        // Rule 2: rank + surname, officer records only.
        for (i, record) in self.records.iter().enumerate() {
            if record.kind != RecordKind::Officer {
                continue;
            }
            if record.rank_surname.as_deref() == Some(normalized) {
                return MatchAttempt::Matched {
                    record: i,
                    rule: MatchRule::RankSurname,
                };
            }
        }

        // Rule 3: bare surname, unique across both lists.
        let holders: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.surname.as_deref() == Some(normalized))
            .map(|(i, _)| i)
            .collect();
        match holders.as_slice() {
            [] => MatchAttempt::NoMatch,
            [only] => MatchAttempt::Matched {
                record: *only,
                rule: MatchRule::Surname,
            },
            _ => MatchAttempt::AmbiguousSurname {
                surname: normalized.to_string(),
            },
        }
    }

    /// Resolve every mention, preserving order. Unmatched mentions are
    /// retained so the rewriter can account for them; ambiguity warnings
    /// are collected rather than aborting.
    pub fn resolve(&self, mentions: Vec<Mention>) -> (Vec<ResolvedEntity>, Vec<Warning>) {
        let mut resolved = Vec::with_capacity(mentions.len());
        let mut warnings = Vec::new();

        for mention in mentions {
            match mention.kind {
                MentionKind::LocationLike => {
                    // The extractor already filtered against the place
                    // table, so a miss here means the caller bypassed it;
                    // treat the mention as unmatched rather than guess.
                    match self.locale.lookup_place(&mention.text) {
                        Some(category) => {
                            let label = category.to_string();
                            resolved.push(ResolvedEntity {
                                mention,
                                category: Category::Location,
                                record: None,
                                label: Some(label),
                                rule: None,
                            });
                        }
                        None => resolved.push(ResolvedEntity::unmatched(mention)),
                    }
                }
                MentionKind::PersonLike => {
                    let normalized = normalize(&mention.text, self.locale);
                    match self.attempt(&normalized) {
                        MatchAttempt::Matched { record, rule } => {
                            let category = match self.records[record].kind {
                                RecordKind::Civilian => Category::Civilian,
                                RecordKind::Officer => Category::Officer,
                            };
                            resolved.push(ResolvedEntity {
                                mention,
                                category,
                                record: Some(record),
                                label: None,
                                rule: Some(rule),
                            });
                        }
                        MatchAttempt::AmbiguousSurname { surname } => {
                            log::warn!(
                                "ambiguous surname {:?} at {}..{}; leaving unredacted",
                                surname,
                                mention.start,
                                mention.end
                            );
                            warnings.push(Warning::AmbiguousSurname {
                                surname,
                                start: mention.start,
                                end: mention.end,
                            });
                            resolved.push(ResolvedEntity::unmatched(mention));
                        }
                        MatchAttempt::NoMatch => {
                            resolved.push(ResolvedEntity::unmatched(mention));
                        }
                    }
                }
            }
        }

        (resolved, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{register_locale, LocaleData};
    use std::sync::Arc;

    fn locale() -> Arc<Locale> {
        register_locale(
            &LocaleData::new("matcher-tests")
                .with_rank("Sgt", "Sergeant")
                .with_rank("Det", "Detective")
                .with_place("Parkside", "neighborhood"),
        )
    }

    fn records(locale: &Locale) -> Vec<NameRecord> {
        vec![
            NameRecord::civilian("Sally Smith", locale),
            NameRecord::officer("Sgt. John Jones", locale),
        ]
    }

    #[test]
    fn full_name_wins_over_later_rules() {
        let locale = locale();
        let records = records(&locale);
        let matcher = Matcher::new(&locale, &records);

        // "sergeant john jones" also satisfies rank+surname, but rule 1
        // must win for the full form.
        assert_eq!(
            matcher.attempt("sergeant john jones"),
            MatchAttempt::Matched {
                record: 1,
                rule: MatchRule::FullName
            }
        );
    }

    #[test]
    fn rank_surname_matches_officers_only() {
        let locale = locale();
        let records = records(&locale);
        let matcher = Matcher::new(&locale, &records);

        assert_eq!(
            matcher.attempt("sergeant jones"),
            MatchAttempt::Matched {
                record: 1,
                rule: MatchRule::RankSurname
            }
        );
    }

    #[test]
    fn unique_surname_matches() {
        let locale = locale();
        let records = records(&locale);
        let matcher = Matcher::new(&locale, &records);

        assert_eq!(
            matcher.attempt("smith"),
            MatchAttempt::Matched {
                record: 0,
                rule: MatchRule::Surname
            }
        );
    }

    #[test]
    fn shared_surname_is_ambiguous() {
        let locale = locale();
        let records = vec![
            NameRecord::civilian("Sally Smith", &locale),
            NameRecord::civilian("Tom Smith", &locale),
        ];
        let matcher = Matcher::new(&locale, &records);

        assert_eq!(
            matcher.attempt("smith"),
            MatchAttempt::AmbiguousSurname {
                surname: "smith".into()
            }
        );
    }

    #[test]
    fn surname_shared_across_lists_is_ambiguous() {
        let locale = locale();
        let records = vec![
            NameRecord::civilian("Sally Smith", &locale),
            NameRecord::officer("Det. Amy Smith", &locale),
        ];
        let matcher = Matcher::new(&locale, &records);

        assert_eq!(
            matcher.attempt("smith"),
            MatchAttempt::AmbiguousSurname {
                surname: "smith".into()
            }
        );
    }

    #[test]
    fn resolve_collects_ambiguity_warning() {
        let locale = locale();
        let records = vec![
            NameRecord::civilian("Sally Smith", &locale),
            NameRecord::civilian("Tom Smith", &locale),
        ];
        let matcher = Matcher::new(&locale, &records);

        let mentions = vec![Mention::new("Smith", MentionKind::PersonLike, 0, 5)];
        let (resolved, warnings) = matcher.resolve(mentions);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category, Category::Unmatched);
        assert_eq!(
            warnings,
            vec![Warning::AmbiguousSurname {
                surname: "smith".into(),
                start: 0,
                end: 5,
            }]
        );
    }

    #[test]
    fn location_mentions_carry_category_label() {
        let locale = locale();
        let records = records(&locale);
        let matcher = Matcher::new(&locale, &records);

        let mentions = vec![Mention::new("Parkside", MentionKind::LocationLike, 0, 8)];
        let (resolved, warnings) = matcher.resolve(mentions);

        assert!(warnings.is_empty());
        assert_eq!(resolved[0].category, Category::Location);
        assert_eq!(resolved[0].label.as_deref(), Some("neighborhood"));
    }

    #[test]
    fn unknown_person_stays_unmatched() {
        let locale = locale();
        let records = records(&locale);
        let matcher = Matcher::new(&locale, &records);

        let (resolved, warnings) =
            matcher.resolve(vec![Mention::new("Bob Brown", MentionKind::PersonLike, 0, 9)]);
        assert!(warnings.is_empty());
        assert_eq!(resolved[0].category, Category::Unmatched);
        assert!(resolved[0].record.is_none());
    }

    #[test]
    fn abbreviated_rank_surface_matches_record() {
        let locale = locale();
        let records = records(&locale);
        let matcher = Matcher::new(&locale, &records);

        // Surface "Sgt. Jones" normalizes to "sergeant jones".
        let normalized = crate::name::normalize("Sgt. Jones", &locale);
        assert_eq!(
            matcher.attempt(&normalized),
            MatchAttempt::Matched {
                record: 1,
                rule: MatchRule::RankSurname
            }
        );
    }
}
