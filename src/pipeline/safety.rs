use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalog::rules::RuleGroup;
use crate::catalog::{EmergencyRule, SameDayRule};
use crate::models::ParsedAnswer;
use crate::pipeline::normalize::normalize;

/// A fired emergency rule.
#[derive(Debug, Clone, Serialize)]
pub struct EmergencyMatch {
    pub rule_id: String,
    pub severity: u8,
    pub reason_tr: String,
    pub instructions_tr: Vec<String>,
}

/// A fired same-day rule; decorates the next envelope, never stops the loop.
#[derive(Debug, Clone, Serialize)]
pub struct SameDayMatch {
    pub rule_id: String,
    pub message_tr: String,
}

fn contains_any(text: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| {
        let p = normalize(p);
        !p.is_empty() && text.contains(p.as_str())
    })
}

fn contains_all(text: &str, phrases: &[String]) -> bool {
    !phrases.is_empty()
        && phrases.iter().all(|p| {
            let p = normalize(p);
            !p.is_empty() && text.contains(p.as_str())
        })
}

fn canon_any(canonicals: &BTreeSet<String>, wanted: &[String]) -> bool {
    wanted.iter().any(|c| canonicals.contains(&normalize(c)))
}

fn group_matches(text: &str, canonicals: &BTreeSet<String>, group: &RuleGroup) -> bool {
    (!group.keyword_any.is_empty() && contains_any(text, &group.keyword_any))
        || (!group.keyword_all.is_empty() && contains_all(text, &group.keyword_all))
        || (!group.canonical_any.is_empty() && canon_any(canonicals, &group.canonical_any))
}

fn max_reported_severity(parsed: &BTreeMap<String, ParsedAnswer>) -> Option<u8> {
    parsed.values().filter_map(|p| p.severity_0_10).max()
}

fn max_reported_duration(parsed: &BTreeMap<String, ParsedAnswer>) -> Option<u32> {
    parsed.values().filter_map(|p| p.duration_days).max()
}

/// Shared predicate evaluation for emergency and same-day rules.
#[allow(clippy::too_many_arguments)]
fn rule_hits(
    text: &str,
    canonicals: &BTreeSet<String>,
    parsed: &BTreeMap<String, ParsedAnswer>,
    keyword_any: &[String],
    keyword_all: &[String],
    canonical_any: &[String],
    require_any_group: &[RuleGroup],
    min_severity: Option<u8>,
    min_duration: Option<u32>,
) -> bool {
    let mut hit = false;
    if !keyword_all.is_empty() && contains_all(text, keyword_all) {
        hit = true;
    }
    if !hit && !keyword_any.is_empty() && contains_any(text, keyword_any) {
        hit = true;
    }
    if !hit && !canonical_any.is_empty() && canon_any(canonicals, canonical_any) {
        hit = true;
    }
    if !hit {
        return false;
    }

    if !require_any_group.is_empty()
        && !require_any_group
            .iter()
            .any(|g| group_matches(text, canonicals, g))
    {
        return false;
    }

    if let Some(min) = min_severity {
        match max_reported_severity(parsed) {
            Some(severity) if severity >= min => {}
            _ => return false,
        }
    }
    if let Some(min) = min_duration {
        match max_reported_duration(parsed) {
            Some(duration) if duration >= min => {}
            _ => return false,
        }
    }
    true
}

/// Evaluate emergency rules over the full user text and known symptoms.
/// The highest-severity match wins; ties break on rule id ascending.
pub fn check_emergency(
    text_norm: &str,
    known_symptoms: &BTreeSet<String>,
    parsed_answers: &BTreeMap<String, ParsedAnswer>,
    rules: &[EmergencyRule],
) -> Option<EmergencyMatch> {
    let mut best: Option<EmergencyMatch> = None;
    for rule in rules {
        if !rule_hits(
            text_norm,
            known_symptoms,
            parsed_answers,
            &rule.keyword_any,
            &rule.keyword_all,
            &rule.canonical_any,
            &rule.require_any_group,
            rule.min_severity_0_10,
            rule.min_duration_days,
        ) {
            continue;
        }

        let replace = match &best {
            None => true,
            Some(current) => {
                rule.severity > current.severity
                    || (rule.severity == current.severity && rule.id < current.rule_id)
            }
        };
        if replace {
            best = Some(EmergencyMatch {
                rule_id: rule.id.clone(),
                severity: rule.severity,
                reason_tr: rule.reason_tr.clone(),
                instructions_tr: rule.instructions_tr.clone(),
            });
        }
    }

    if let Some(m) = &best {
        tracing::warn!(rule_id = %m.rule_id, severity = m.severity, "emergency rule fired");
    }
    best
}

/// Evaluate same-day rules; first match wins (rules are ordered in the
/// catalog).
pub fn check_same_day(
    text_norm: &str,
    known_symptoms: &BTreeSet<String>,
    parsed_answers: &BTreeMap<String, ParsedAnswer>,
    rules: &[SameDayRule],
) -> Option<SameDayMatch> {
    for rule in rules {
        if rule_hits(
            text_norm,
            known_symptoms,
            parsed_answers,
            &rule.keyword_any,
            &rule.keyword_all,
            &rule.canonical_any,
            &rule.require_any_group,
            rule.min_severity_0_10,
            rule.min_duration_days,
        ) {
            tracing::info!(rule_id = %rule.id, "same-day rule fired");
            return Some(SameDayMatch {
                rule_id: rule.id.clone(),
                message_tr: rule.message_tr.clone(),
            });
        }
    }
    None
}
