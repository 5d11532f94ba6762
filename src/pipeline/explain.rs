use serde::Serialize;

use crate::catalog::{Catalog, RiskRules};
use crate::models::{RiskLevel, Session, Urgency};

use super::candidates::Candidate;
use super::safety::SameDayMatch;
use super::stop::{clamp01, Confidence};

const MAX_WHY_LINES: usize = 6;

/// Deterministic risk stratification feeding the doctor-ready summary.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score_0_1: f64,
}

/// "Neden bu branş?" bullet lines, derived only from scoring traces.
pub fn why_specialty_lines(
    session: &Session,
    top_specialty_id: &str,
    specialty_name: &str,
    candidates: &[Candidate],
    catalog: &Catalog,
) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(rules) = session.rules_scores.get(top_specialty_id) {
        let phrase_points = catalog.specialties.scoring.phrase_match_points;
        let keyword_points = catalog.specialties.scoring.keyword_match_points;
        for phrase in &rules.matched_phrases {
            lines.push(format!(
                "Metinden eşleşen ifade: \u{201c}{phrase}\u{201d} (+{phrase_points})"
            ));
        }
        for keyword in &rules.matched_keywords {
            lines.push(format!(
                "Eşleşen belirti: \u{201c}{keyword}\u{201d} (+{keyword_points})"
            ));
        }
    }

    for candidate in candidates.iter().take(3) {
        if let Some(mapping) = catalog.matrix.specialty_for(&candidate.disease_label) {
            if mapping.id == top_specialty_id {
                lines.push(format!(
                    "Olası durum: {} (%{}) \u{2192} {}",
                    candidate.disease_label,
                    (candidate.score_0_1 * 100.0).round() as i64,
                    specialty_name
                ));
            }
        }
    }

    if lines.is_empty() {
        lines.push(format!(
            "Belirti ve cevaplara göre en uygun branş: {specialty_name}"
        ));
    }

    lines.truncate(MAX_WHY_LINES);
    lines
}

/// Risk level from confidence, duration, profile and rule hits.
pub fn compute_risk(
    session: &Session,
    confidence: &Confidence,
    same_day: Option<&SameDayMatch>,
    rules: &RiskRules,
) -> RiskAssessment {
    let mut score: f64 = 0.0;

    if confidence.value < 0.35 {
        score += 0.25;
    }
    if same_day.is_some() {
        score += 0.35;
    }

    let max_duration = session
        .parsed_answers
        .values()
        .filter_map(|p| p.duration_days)
        .max();
    match max_duration {
        Some(days) if days >= 14 => score += 0.30,
        Some(days) if days >= 7 => score += 0.20,
        Some(days) if days <= 2 => score -= 0.05,
        _ => {}
    }

    if let Some(age) = session.profile.age {
        if age <= 2 {
            score += 0.25;
        } else if age >= 65 {
            score += 0.20;
        }
    }
    if session.profile.pregnant == Some(true) {
        score += 0.20;
    }

    let high_hit = rules
        .high_canonicals_any
        .iter()
        .any(|c| session.known_symptoms.contains(c));
    let med_hit = rules
        .medium_canonicals_any
        .iter()
        .any(|c| session.known_symptoms.contains(c));
    if high_hit {
        score += 0.55;
    }
    if med_hit {
        score += 0.25;
    }
    if confidence.value <= rules.min_confidence_fallback && (high_hit || med_hit) {
        score += 0.20;
    }

    let score = clamp01(score);
    let level = if score >= 0.70 {
        RiskLevel::High
    } else if score >= 0.40 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    RiskAssessment {
        level,
        score_0_1: (score * 100.0).round() / 100.0,
    }
}

/// Doctor-ready summary: symptoms, durations, severity, timing, answer
/// highlights, risk level — in that order.
pub fn doctor_summary(session: &Session, risk: &RiskAssessment, catalog: &Catalog) -> Vec<String> {
    let locale = &session.locale;
    let mut lines = Vec::new();

    for canonical in &session.known_symptoms {
        lines.push(format!("{} mevcut.", capitalize_tr(canonical)));
    }
    for (canonical, parsed) in &session.parsed_answers {
        if let Some(days) = parsed.duration_days {
            lines.push(format!("{}: {days} gündür.", capitalize_tr(canonical)));
        }
    }
    for (canonical, parsed) in &session.parsed_answers {
        if let Some(severity) = parsed.severity_0_10 {
            lines.push(format!("{}: {severity}/10.", capitalize_tr(canonical)));
        }
    }
    for (canonical, parsed) in &session.parsed_answers {
        if let Some(timing) = parsed.timing {
            lines.push(format!(
                "{}: {}.",
                capitalize_tr(canonical),
                timing.as_str()
            ));
        }
    }
    for (canonical, value) in &session.answers {
        if session.known_symptoms.contains(canonical)
            || session.parsed_answers.contains_key(canonical)
        {
            continue;
        }
        let label = if is_yes(value) {
            "var"
        } else if is_no(value) {
            "yok"
        } else {
            continue;
        };
        lines.push(format!("{}: {label}.", capitalize_tr(canonical)));
    }

    let risk_label = catalog
        .messages
        .text(locale, &format!("risk_label_{}", risk.level.as_str().to_lowercase()));
    lines.push(format!("Risk düzeyi: {risk_label}."));
    lines
}

/// Safety notes from the catalog, with the neuro/cardio extra when relevant.
pub fn safety_notes(catalog: &Catalog, locale: &str, top_specialty_id: &str) -> Vec<String> {
    let mut notes = vec![
        catalog.messages.text(locale, "safety_note_1"),
        catalog.messages.text(locale, "safety_note_2"),
    ];
    if matches!(top_specialty_id, "neurology" | "cardiology") {
        notes.push(catalog.messages.text(locale, "safety_note_neuro_cardio"));
    }
    notes
}

/// RESULT urgency from specialty, stop context and confidence.
/// ER_NOW is reserved for the emergency envelope path.
pub fn result_urgency(
    top_specialty_id: &str,
    top_disease_label: Option<&str>,
    same_day: Option<&SameDayMatch>,
    confidence: &Confidence,
    catalog: &Catalog,
) -> Urgency {
    let stop = &catalog.rules.stop;
    let emergency_leaning = stop
        .emergency_specialty_ids
        .iter()
        .any(|id| id == top_specialty_id)
        || top_disease_label
            .map(|label| {
                stop.emergency_disease_keywords
                    .iter()
                    .any(|kw| label.contains(kw.as_str()))
            })
            .unwrap_or(false);

    if same_day.is_some() || emergency_leaning {
        Urgency::SameDay
    } else if confidence.value < 0.45 {
        Urgency::WithinThreeDays
    } else {
        Urgency::Routine
    }
}

pub fn is_yes(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "evet" | "var" | "oldu" | "oluyor" | "yes"
    )
}

pub fn is_no(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "hayır" | "hayir" | "yok" | "olmadı" | "olmuyor" | "no"
    )
}

fn capitalize_tr(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let upper = match first {
                'i' => "İ".to_string(),
                'ı' => "I".to_string(),
                c => c.to_uppercase().to_string(),
            };
            format!("{upper}{}", chars.as_str())
        }
        None => String::new(),
    }
}
