use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{EnvelopeType, StopReason, Timing};
use super::envelope::QuestionPayload;

/// Demographic / background context, filled from the request or from
/// answered context questions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pregnant: Option<bool>,
    /// `Some(vec![])` means "asked, none reported" and suppresses the
    /// chronic context question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chronic: Option<Vec<String>>,
}

impl Profile {
    /// Merge fields from another profile without overwriting known values.
    pub fn merge(&mut self, other: &Profile) {
        if self.age.is_none() {
            self.age = other.age;
        }
        if self.sex.is_none() {
            self.sex = other.sex.clone();
        }
        if self.pregnant.is_none() {
            self.pregnant = other.pregnant;
        }
        if self.chronic.is_none() {
            self.chronic = other.chronic.clone();
        }
    }

    pub fn is_female(&self) -> bool {
        matches!(
            self.sex.as_deref().map(|s| s.trim().to_lowercase()),
            Some(ref s) if ["kadın", "kadin", "female", "f", "k"].contains(&s.as_str())
        )
    }
}

/// Structured fields extracted from a free-text answer. Missing fields stay
/// unset; an empty struct is never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_0_10: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
}

impl ParsedAnswer {
    pub fn is_empty(&self) -> bool {
        self.duration_days.is_none() && self.severity_0_10.is_none() && self.timing.is_none()
    }
}

/// Accumulated Layer-B score for one specialty. Persisted on the session so
/// scoring can accumulate across turns without re-reading old messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RulesScore {
    pub score: i64,
    pub phrase_score: i64,
    pub keyword_score: i64,
    pub negative_penalties: i64,
    #[serde(default)]
    pub matched_phrases: Vec<String>,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    /// Canonicals already scored for this specialty (no double count).
    #[serde(default)]
    pub matched_canonicals: BTreeSet<String>,
}

/// One triage session. Owned by the store, mutated only by the turn handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub locale: String,
    pub turn_index: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub known_symptoms: BTreeSet<String>,
    #[serde(default)]
    pub denied_symptoms: BTreeSet<String>,
    /// Canonicals already queried, in emission order; no repeats.
    #[serde(default)]
    pub asked_canonicals: Vec<String>,
    /// canonical → raw (redacted) answer text.
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    /// canonical → structured fields; key is always present in `answers`.
    #[serde(default)]
    pub parsed_answers: BTreeMap<String, ParsedAnswer>,
    #[serde(default)]
    pub asked_context_ids: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_question: Option<QuestionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope_type: Option<EnvelopeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    /// Redacted free-text messages, in arrival order.
    #[serde(default)]
    pub raw_texts: Vec<String>,
    /// Accumulated Layer-B scores, keyed by specialty id.
    #[serde(default)]
    pub rules_scores: BTreeMap<String, RulesScore>,
    /// Scoring / merger / selector traces for auditability.
    #[serde(default)]
    pub debug: serde_json::Value,
}

impl Session {
    pub fn new(session_id: Uuid, locale: &str, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            locale: locale.to_string(),
            turn_index: 0,
            created_at: now,
            updated_at: now,
            profile: Profile::default(),
            known_symptoms: BTreeSet::new(),
            denied_symptoms: BTreeSet::new(),
            asked_canonicals: Vec::new(),
            answers: BTreeMap::new(),
            parsed_answers: BTreeMap::new(),
            asked_context_ids: BTreeSet::new(),
            last_context_id: None,
            last_question: None,
            envelope_type: None,
            stop_reason: None,
            raw_texts: Vec::new(),
            rules_scores: BTreeMap::new(),
            debug: serde_json::Value::Null,
        }
    }

    /// A session is terminal once a RESULT or EMERGENCY envelope was emitted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.envelope_type,
            Some(EnvelopeType::Result) | Some(EnvelopeType::Emergency)
        )
    }

    /// Record a canonical as asked, preserving first-ask order.
    pub fn mark_asked(&mut self, canonical: &str) {
        if !self.asked_canonicals.iter().any(|c| c == canonical) {
            self.asked_canonicals.push(canonical.to_string());
        }
    }

    pub fn was_asked(&self, canonical: &str) -> bool {
        self.asked_canonicals.iter().any(|c| c == canonical)
    }

    /// Full user text so far, newline-joined in arrival order.
    pub fn joined_text(&self) -> String {
        self.raw_texts.join("\n")
    }

    /// Confirm a symptom, resolving any earlier denial per the catalog's
    /// retraction policy. Keeps `known ∩ denied = ∅`.
    pub fn confirm_symptom(&mut self, canonical: &str, retract_on_conflict: bool) {
        if self.denied_symptoms.contains(canonical) {
            if !retract_on_conflict {
                return;
            }
            self.denied_symptoms.remove(canonical);
        }
        self.known_symptoms.insert(canonical.to_string());
    }

    /// Deny a symptom, resolving any earlier confirmation per the catalog's
    /// retraction policy. Keeps `known ∩ denied = ∅`.
    pub fn deny_symptom(&mut self, canonical: &str, retract_on_conflict: bool) {
        if self.known_symptoms.contains(canonical) {
            if !retract_on_conflict {
                return;
            }
            self.known_symptoms.remove(canonical);
        }
        self.denied_symptoms.insert(canonical.to_string());
    }
}
