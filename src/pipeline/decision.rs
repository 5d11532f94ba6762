use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::DiseaseMatrix;
use crate::catalog::SpecialtyCatalog;
use crate::models::RulesScore;

use super::candidates::Candidate;

/// Prior points by Layer-A rank (rank 1 = most likely disease).
const PRIOR_POINTS: [f64; 5] = [4.0, 3.0, 2.0, 1.0, 1.0];

/// Confidence assumed for diseases missing from the specialty mapping.
const UNKNOWN_MAPPING_CONFIDENCE: f64 = 0.5;

/// Merged A+B score for one specialty; both components kept for
/// explainability.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FinalScore {
    pub final_score: f64,
    pub rules_score: f64,
    pub prior_score: f64,
    pub keyword_score: f64,
    pub name_tr: String,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Specialty priors from disease candidate ranks:
/// `prior[specialty] += rank_points × mapping_confidence`.
pub fn specialty_priors(candidates: &[Candidate], matrix: &DiseaseMatrix) -> BTreeMap<String, f64> {
    let mut priors: BTreeMap<String, f64> = BTreeMap::new();
    for (rank, candidate) in candidates.iter().enumerate() {
        let points = PRIOR_POINTS.get(rank).copied().unwrap_or(0.0);
        let (specialty_id, confidence) = match matrix.specialty_for(&candidate.disease_label) {
            Some(mapping) => (mapping.id.clone(), mapping.confidence),
            None => (
                matrix.fallback_specialty_id().to_string(),
                UNKNOWN_MAPPING_CONFIDENCE,
            ),
        };
        *priors.entry(specialty_id).or_insert(0.0) += points * confidence;
    }
    priors
}

/// Merge Layer A priors and Layer B rules scores into final scores.
pub fn merge(
    rules_scores: &BTreeMap<String, RulesScore>,
    candidates: &[Candidate],
    matrix: &DiseaseMatrix,
    specialties: &SpecialtyCatalog,
) -> BTreeMap<String, FinalScore> {
    let priors = specialty_priors(candidates, matrix);

    let mut final_scores: BTreeMap<String, FinalScore> = BTreeMap::new();
    let ids = rules_scores.keys().chain(priors.keys());
    for id in ids {
        if final_scores.contains_key(id) {
            continue;
        }
        let rules = rules_scores.get(id);
        let rules_score = rules.map(|r| r.score as f64).unwrap_or(0.0);
        let keyword_score = rules.map(|r| r.keyword_score as f64).unwrap_or(0.0);
        let prior_score = priors.get(id).copied().unwrap_or(0.0);
        let name_tr = specialties
            .name_of(id)
            .unwrap_or(id.as_str())
            .to_string();

        final_scores.insert(
            id.clone(),
            FinalScore {
                final_score: round2(rules_score + prior_score),
                rules_score: round2(rules_score),
                prior_score: round2(prior_score),
                keyword_score: round2(keyword_score),
                name_tr,
            },
        );
    }
    final_scores
}

/// Ranked specialties: final desc, keyword_score desc, id asc.
pub fn ranked(final_scores: &BTreeMap<String, FinalScore>) -> Vec<(&String, &FinalScore)> {
    let mut out: Vec<(&String, &FinalScore)> = final_scores.iter().collect();
    out.sort_by(|a, b| {
        b.1.final_score
            .partial_cmp(&a.1.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.1.keyword_score
                    .partial_cmp(&a.1.keyword_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.0.cmp(b.0))
    });
    out
}

/// The winning specialty id with its merged score, if anything scored.
pub fn top(final_scores: &BTreeMap<String, FinalScore>) -> Option<(&String, &FinalScore)> {
    ranked(final_scores).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::catalog_dir;

    fn catalog() -> Catalog {
        Catalog::load_dir(&catalog_dir()).unwrap()
    }

    fn candidate(label: &str, score: f64) -> Candidate {
        Candidate {
            disease_label: label.to_string(),
            score_0_1: score,
            matched_symptoms: vec![],
            missing_symptoms: vec![],
        }
    }

    #[test]
    fn rank_points_weight_priors() {
        let c = catalog();
        let candidates = vec![
            candidate("Migraine", 0.5),                     // rank 1 → 4 × 0.9
            candidate("Typhoid", 0.3),                      // rank 2 → 3 × 0.8
            candidate("Paralysis (brain hemorrhage)", 0.2), // rank 3 → 2 × 0.95
        ];
        let priors = specialty_priors(&candidates, &c.matrix);
        assert!((priors["neurology"] - (4.0 * 0.9 + 2.0 * 0.95)).abs() < 1e-9);
        assert!((priors["internal_gi"] - 3.0 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn unknown_disease_falls_back() {
        let c = catalog();
        let priors = specialty_priors(&[candidate("Mystery disease", 0.4)], &c.matrix);
        assert!((priors[c.matrix.fallback_specialty_id()] - 4.0 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn rules_alone_drive_when_no_candidates() {
        let c = catalog();
        let mut rules: BTreeMap<String, RulesScore> = BTreeMap::new();
        rules.insert(
            "neurology".into(),
            RulesScore {
                score: 5,
                phrase_score: 5,
                ..Default::default()
            },
        );
        let merged = merge(&rules, &[], &c.matrix, &c.specialties);
        let (top_id, top_score) = top(&merged).unwrap();
        assert_eq!(top_id, "neurology");
        assert_eq!(top_score.prior_score, 0.0);
        assert_eq!(top_score.final_score, 5.0);
    }

    #[test]
    fn priors_alone_drive_when_no_rules() {
        let c = catalog();
        let merged = merge(
            &BTreeMap::new(),
            &[candidate("Urinary tract infection", 0.3)],
            &c.matrix,
            &c.specialties,
        );
        let (top_id, top_score) = top(&merged).unwrap();
        assert_eq!(top_id, "urology_internal");
        assert_eq!(top_score.rules_score, 0.0);
        assert!(top_score.prior_score > 0.0);
    }

    #[test]
    fn tie_breaks_on_keyword_then_id() {
        let c = catalog();
        let mut rules: BTreeMap<String, RulesScore> = BTreeMap::new();
        rules.insert(
            "neurology".into(),
            RulesScore {
                score: 5,
                keyword_score: 0,
                ..Default::default()
            },
        );
        rules.insert(
            "cardiology".into(),
            RulesScore {
                score: 5,
                keyword_score: 3,
                ..Default::default()
            },
        );
        let merged = merge(&rules, &[], &c.matrix, &c.specialties);
        let ranked = ranked(&merged);
        assert_eq!(ranked[0].0, "cardiology"); // higher keyword_score
    }

    #[test]
    fn display_name_resolves_from_catalog() {
        let c = catalog();
        let merged = merge(
            &BTreeMap::new(),
            &[candidate("Migraine", 0.5)],
            &c.matrix,
            &c.specialties,
        );
        assert_eq!(merged["neurology"].name_tr, "Nöroloji");
    }
}
