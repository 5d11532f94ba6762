use serde::Serialize;

use crate::catalog::{MessageCatalog, StopRules};

use super::candidates::Candidate;

/// Confidence thresholds for the Yüksek / Orta / Düşük labels.
const HIGH_THRESHOLD: f64 = 0.70;
const MEDIUM_THRESHOLD: f64 = 0.45;

#[derive(Debug, Clone, Serialize)]
pub struct Confidence {
    pub value: f64,
    pub label_tr: String,
    pub explain_tr: String,
    pub top1: f64,
    pub gap: f64,
}

pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

fn round3(x: f64) -> f64 {
    (x * 1_000.0).round() / 1_000.0
}

/// Confidence from the Layer-A ranking:
/// `clamp01(top1 × 0.75 + (top1 − top2) × 0.6)`.
pub fn compute_confidence(
    candidates: &[Candidate],
    messages: &MessageCatalog,
    locale: &str,
) -> Confidence {
    let top1 = candidates.first().map(|c| c.score_0_1).unwrap_or(0.0);
    let top2 = candidates.get(1).map(|c| c.score_0_1).unwrap_or(0.0);
    let gap = (top1 - top2).max(0.0);
    let value = round3(clamp01(top1 * 0.75 + gap * 0.6));

    let (label_key, explain_key) = if value >= HIGH_THRESHOLD {
        ("confidence_label_high", "confidence_explain_high")
    } else if value >= MEDIUM_THRESHOLD {
        ("confidence_label_medium", "confidence_explain_medium")
    } else {
        ("confidence_label_low", "confidence_explain_low")
    };

    Confidence {
        value,
        label_tr: messages.text(locale, label_key),
        explain_tr: messages.text(locale, explain_key),
        top1,
        gap,
    }
}

/// Question budget for this session: the tighter emergency budget applies
/// when the top specialty is in the emergency set or the top disease label
/// contains an emergency keyword.
pub fn question_budget(
    stop: &StopRules,
    top_specialty_id: Option<&str>,
    top_disease_label: Option<&str>,
) -> u32 {
    let emergency_specialty = top_specialty_id
        .map(|id| stop.emergency_specialty_ids.iter().any(|s| s == id))
        .unwrap_or(false);
    let emergency_disease = top_disease_label
        .map(|label| {
            stop.emergency_disease_keywords
                .iter()
                .any(|kw| label.contains(kw.as_str()))
        })
        .unwrap_or(false);

    if emergency_specialty || emergency_disease {
        stop.max_questions_emergency
    } else {
        stop.max_questions
    }
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
    fn empty_candidates_give_zero_confidence() {
        let c = catalog();
        let conf = compute_confidence(&[], &c.messages, "tr-TR");
        assert_eq!(conf.value, 0.0);
        assert_eq!(conf.label_tr, "Düşük");
    }

    #[test]
    fn formula_combines_top1_and_gap() {
        let c = catalog();
        let conf = compute_confidence(
            &[candidate("A", 0.6), candidate("B", 0.2)],
            &c.messages,
            "tr-TR",
        );
        // 0.6 × 0.75 + 0.4 × 0.6 = 0.69
        assert!((conf.value - 0.69).abs() < 1e-9, "got {}", conf.value);
        assert_eq!(conf.label_tr, "Orta");
    }

    #[test]
    fn labels_transition_exactly_at_thresholds() {
        let c = catalog();
        // top1 s, top2 s → confidence = s × 0.75
        let at = |v: f64| {
            compute_confidence(&[candidate("A", v), candidate("B", v)], &c.messages, "tr-TR")
        };
        assert_eq!(at(0.70 / 0.75).label_tr, "Yüksek");
        assert_eq!(at(0.45 / 0.75).label_tr, "Orta");
        assert_eq!(at(0.444 / 0.75).label_tr, "Düşük");
    }

    #[test]
    fn confidence_is_clamped() {
        let c = catalog();
        let conf = compute_confidence(&[candidate("A", 1.0)], &c.messages, "tr-TR");
        assert!(conf.value <= 1.0);
        assert_eq!(conf.label_tr, "Yüksek");
    }

    #[test]
    fn emergency_specialty_tightens_budget() {
        let c = catalog();
        let stop = &c.rules.stop;
        assert_eq!(
            question_budget(stop, Some("cardiology"), Some("GERD")),
            stop.max_questions_emergency
        );
        assert_eq!(
            question_budget(stop, Some("neurology"), Some("Migraine")),
            stop.max_questions
        );
    }

    #[test]
    fn emergency_disease_keyword_tightens_budget() {
        let c = catalog();
        let stop = &c.rules.stop;
        assert_eq!(
            question_budget(stop, Some("internal_gi"), Some("Heart attack")),
            stop.max_questions_emergency
        );
        assert_eq!(
            question_budget(stop, None, None),
            stop.max_questions
        );
    }
}
