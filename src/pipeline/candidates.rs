use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::{DiseaseMatrix, GeneratorConfig};

/// One ranked disease candidate. Symptom lists stay in kaggle space.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Candidate {
    pub disease_label: String,
    pub score_0_1: f64,
    pub matched_symptoms: Vec<String>,
    pub missing_symptoms: Vec<String>,
}

fn weight(kaggle: &str, matrix: &DiseaseMatrix, cfg: &GeneratorConfig) -> f64 {
    match matrix.severity(kaggle) {
        Some(severity) if cfg.use_severity_if_available => {
            cfg.default_symptom_weight + f64::from(severity) * cfg.severity_weight_multiplier
        }
        _ => cfg.default_symptom_weight,
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Weighted Jaccard over the disease/symptom matrix.
///
/// Expands the user's canonicals into kaggle space, scores every disease by
/// `Σ w(s∈U∩S_D) / Σ w(s∈U∪S_D)`, keeps scores at or above the configured
/// floor and returns the top-k, score descending then label ascending.
pub fn generate(
    user_canonicals: &BTreeSet<String>,
    matrix: &DiseaseMatrix,
    cfg: &GeneratorConfig,
) -> Vec<Candidate> {
    if user_canonicals.is_empty() {
        return Vec::new();
    }
    let user_kaggle = matrix.to_kaggle_set(user_canonicals);
    if user_kaggle.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<Candidate> = Vec::new();
    for (disease, disease_set) in matrix.diseases() {
        let intersection: Vec<&String> = user_kaggle.intersection(disease_set).collect();
        if intersection.is_empty() {
            continue;
        }

        let numerator: f64 = intersection.iter().map(|s| weight(s, matrix, cfg)).sum();
        let denominator: f64 = user_kaggle
            .union(disease_set)
            .map(|s| weight(s, matrix, cfg))
            .sum();
        if denominator <= 0.0 {
            continue;
        }

        let score = round4(numerator / denominator);
        if score < cfg.min_score_to_include {
            continue;
        }

        results.push(Candidate {
            disease_label: disease.clone(),
            score_0_1: score,
            matched_symptoms: intersection.iter().map(|s| s.to_string()).collect(),
            missing_symptoms: disease_set.difference(&user_kaggle).cloned().collect(),
        });
    }

    results.sort_by(|a, b| {
        b.score_0_1
            .partial_cmp(&a.score_0_1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.disease_label.cmp(&b.disease_label))
    });
    results.truncate(cfg.top_k);
    results
}
