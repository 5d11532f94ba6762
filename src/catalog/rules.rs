use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use super::CatalogError;

#[derive(Debug, Deserialize)]
struct EmergencyFile {
    rules: Vec<EmergencyRule>,
}

#[derive(Debug, Deserialize)]
struct SameDayFile {
    rules: Vec<SameDayRule>,
}

/// Additional gate for rules: at least one group must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleGroup {
    #[serde(default)]
    pub keyword_any: Vec<String>,
    #[serde(default)]
    pub keyword_all: Vec<String>,
    #[serde(default)]
    pub canonical_any: Vec<String>,
}

/// Hard-stop rule. Pure predicate over normalized text, the known-symptom
/// set, and parsed answer fields.
#[derive(Debug, Clone, Deserialize)]
pub struct EmergencyRule {
    pub id: String,
    pub severity: u8,
    pub reason_tr: String,
    pub instructions_tr: Vec<String>,
    #[serde(default)]
    pub keyword_any: Vec<String>,
    #[serde(default)]
    pub keyword_all: Vec<String>,
    #[serde(default)]
    pub canonical_any: Vec<String>,
    #[serde(default)]
    pub require_any_group: Vec<RuleGroup>,
    #[serde(default)]
    pub min_severity_0_10: Option<u8>,
    #[serde(default)]
    pub min_duration_days: Option<u32>,
}

/// Soft rule: decorates the next envelope with a same-day banner.
#[derive(Debug, Clone, Deserialize)]
pub struct SameDayRule {
    pub id: String,
    pub message_tr: String,
    #[serde(default)]
    pub keyword_any: Vec<String>,
    #[serde(default)]
    pub keyword_all: Vec<String>,
    #[serde(default)]
    pub canonical_any: Vec<String>,
    #[serde(default)]
    pub require_any_group: Vec<RuleGroup>,
    #[serde(default)]
    pub min_severity_0_10: Option<u8>,
    #[serde(default)]
    pub min_duration_days: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyFlags {
    /// Whether a denial retracts an earlier confirmation (and vice versa).
    pub retract_known_on_deny: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopRules {
    pub max_questions: u32,
    pub max_questions_emergency: u32,
    pub emergency_specialty_ids: Vec<String>,
    pub emergency_disease_keywords: Vec<String>,
    /// Floor for discriminative scores; below it the loop stops.
    pub min_expected_gain: f64,
    pub policy: PolicyFlags,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub top_k: usize,
    pub min_score_to_include: f64,
    pub default_symptom_weight: f64,
    pub severity_weight_multiplier: f64,
    #[serde(default = "default_true")]
    pub use_severity_if_available: bool,
}

fn default_true() -> bool {
    true
}

/// Locale-configured tables for the free-text parser.
#[derive(Debug, Deserialize)]
pub struct FreeTextConfig {
    pub duration_canonicals: BTreeSet<String>,
    pub severity_canonicals: BTreeSet<String>,
    pub timing_canonicals: BTreeSet<String>,
    /// lexical token → severity value (0–10)
    pub severity_lexical: BTreeMap<String, u8>,
    /// timing value → trigger keywords
    pub timing_keywords: BTreeMap<String, Vec<String>>,
}

/// Deterministic risk stratification thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskRules {
    #[serde(default)]
    pub high_canonicals_any: Vec<String>,
    #[serde(default)]
    pub medium_canonicals_any: Vec<String>,
    /// Confidence at or below which a risky canonical earns an extra bump.
    #[serde(default = "default_min_confidence_fallback")]
    pub min_confidence_fallback: f64,
}

fn default_min_confidence_fallback() -> f64 {
    0.25
}

#[derive(Debug)]
pub struct RuleCatalog {
    pub emergency: Vec<EmergencyRule>,
    pub sameday: Vec<SameDayRule>,
    pub stop: StopRules,
    pub generator: GeneratorConfig,
    pub risk: RiskRules,
}

impl RuleCatalog {
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let emergency: EmergencyFile = super::load_json(dir, "emergency_rules.json")?;
        let sameday: SameDayFile = super::load_json(dir, "sameday_rules.json")?;
        let stop: StopRules = super::load_json(dir, "stop_rules.json")?;
        let generator: GeneratorConfig = super::load_json(dir, "candidate_generator.json")?;
        let risk: RiskRules = super::load_json(dir, "risk_rules.json")?;

        if stop.max_questions_emergency > stop.max_questions {
            return Err(CatalogError::Invalid {
                file: "stop_rules.json".into(),
                reason: "emergency budget must not exceed the regular budget".into(),
            });
        }

        Ok(Self {
            emergency: emergency.rules,
            sameday: sameday.rules,
            stop,
            generator,
            risk,
        })
    }
}
