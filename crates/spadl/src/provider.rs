//! Mapping of provider-specific event vocabularies onto SPADL.
//!
//! Converters never interpret provider terms themselves: every type, result
//! and body part string of a raw event is resolved through an
//! [`EventVocabulary`]. A term the vocabulary does not know is a schema
//! violation, never a silently dropped event.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::vocab::{ActionResult, ActionType, BodyPart};

/// Resolves provider terms to SPADL enumerations.
pub trait EventVocabulary: fmt::Debug + Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &'static str;

    fn clone_boxed(&self) -> BoxedEventVocabulary;

    fn action_type(&self, term: &str) -> Option<ActionType>;

    fn result(&self, term: &str) -> Option<ActionResult>;

    fn bodypart(&self, term: &str) -> Option<BodyPart>;
}

pub type BoxedEventVocabulary = Box<dyn EventVocabulary>;

impl Clone for BoxedEventVocabulary {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// The identity vocabulary: canonical SPADL names or their numeric codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpadlVocabulary;

fn parse_code<T>(term: &str, from_name: fn(&str) -> Option<T>, from_id: fn(u8) -> Option<T>) -> Option<T> {
    from_name(term).or_else(|| term.trim().parse::<u8>().ok().and_then(from_id))
}

impl EventVocabulary for SpadlVocabulary {
    fn name(&self) -> &'static str {
        "spadl"
    }

    fn clone_boxed(&self) -> BoxedEventVocabulary {
        Box::new(*self)
    }

    fn action_type(&self, term: &str) -> Option<ActionType> {
        parse_code(term, ActionType::from_name, ActionType::from_id)
    }

    fn result(&self, term: &str) -> Option<ActionResult> {
        parse_code(term, ActionResult::from_name, ActionResult::from_id)
    }

    fn bodypart(&self, term: &str) -> Option<BodyPart> {
        parse_code(term, BodyPart::from_name, BodyPart::from_id)
    }
}

/// A provider term mapped onto a name that is not part of SPADL.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{table} table maps '{term}' to unknown SPADL name '{target}'")]
pub struct VocabularyError {
    pub table: &'static str,
    pub term: String,
    pub target: String,
}

/// Provider-to-SPADL string tables, typically loaded from JSON.
///
/// ```json
/// {
///   "action_types": { "Pass": "pass", "Shot": "shot" },
///   "results": { "Goal": "success", "Saved": "fail" },
///   "bodyparts": { "Head": "head" },
///   "fallback_to_spadl": true
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyTables {
    pub action_types: BTreeMap<String, String>,
    pub results: BTreeMap<String, String>,
    pub bodyparts: BTreeMap<String, String>,
    /// Also accept canonical SPADL names and codes for unmapped terms.
    pub fallback_to_spadl: bool,
}

/// A vocabulary backed by validated lookup tables.
#[derive(Debug, Clone, Default)]
pub struct MappedVocabulary {
    action_types: BTreeMap<String, ActionType>,
    results: BTreeMap<String, ActionResult>,
    bodyparts: BTreeMap<String, BodyPart>,
    fallback_to_spadl: bool,
}

fn resolve_table<T>(
    table: &'static str,
    entries: &BTreeMap<String, String>,
    from_name: fn(&str) -> Option<T>,
) -> Result<BTreeMap<String, T>, VocabularyError> {
    entries
        .iter()
        .map(|(term, target)| {
            let value = from_name(target).ok_or_else(|| VocabularyError {
                table,
                term: term.clone(),
                target: target.clone(),
            })?;
            Ok((term.clone(), value))
        })
        .collect()
}

impl MappedVocabulary {
    /// Resolves every target name once, so lookups cannot fail later for a
    /// misspelled table entry.
    pub fn from_tables(tables: &VocabularyTables) -> Result<Self, VocabularyError> {
        Ok(Self {
            action_types: resolve_table("action_types", &tables.action_types, ActionType::from_name)?,
            results: resolve_table("results", &tables.results, ActionResult::from_name)?,
            bodyparts: resolve_table("bodyparts", &tables.bodyparts, BodyPart::from_name)?,
            fallback_to_spadl: tables.fallback_to_spadl,
        })
    }

    fn fallback<T>(&self, lookup: impl FnOnce(&SpadlVocabulary) -> Option<T>) -> Option<T> {
        self.fallback_to_spadl
            .then(|| lookup(&SpadlVocabulary))
            .flatten()
    }
}

impl EventVocabulary for MappedVocabulary {
    fn name(&self) -> &'static str {
        "mapped"
    }

    fn clone_boxed(&self) -> BoxedEventVocabulary {
        Box::new(self.clone())
    }

    fn action_type(&self, term: &str) -> Option<ActionType> {
        self.action_types
            .get(term)
            .copied()
            .or_else(|| self.fallback(|v| v.action_type(term)))
    }

    fn result(&self, term: &str) -> Option<ActionResult> {
        self.results
            .get(term)
            .copied()
            .or_else(|| self.fallback(|v| v.result(term)))
    }

    fn bodypart(&self, term: &str) -> Option<BodyPart> {
        self.bodyparts
            .get(term)
            .copied()
            .or_else(|| self.fallback(|v| v.bodypart(term)))
    }
}
