use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::questions::localized;
use crate::catalog::Catalog;
use crate::models::{AnswerType, QuestionPayload, Session};

use super::candidates::Candidate;

/// Bonus added when a bank entry's `priority_when_known` intersects the
/// known-symptom set.
const PRIORITY_BOOST: f64 = 0.35;

/// The next question to ask, by source.
#[derive(Debug, Clone)]
pub enum SelectedQuestion {
    Context {
        id: String,
        payload: QuestionPayload,
    },
    RedFlag {
        id: String,
        canonical: String,
        escalate_on_yes: bool,
        payload: QuestionPayload,
    },
    Bank {
        canonical: String,
        disc: f64,
        payload: QuestionPayload,
    },
}

impl SelectedQuestion {
    pub fn payload(&self) -> &QuestionPayload {
        match self {
            Self::Context { payload, .. } => payload,
            Self::RedFlag { payload, .. } => payload,
            Self::Bank { payload, .. } => payload,
        }
    }
}

/// One scored discriminative candidate, for selection and tracing.
#[derive(Debug, Clone, Serialize)]
pub struct DiscCandidate {
    pub canonical: String,
    pub kaggle: String,
    pub count: usize,
    pub disc: f64,
    pub boosted: bool,
    pub score: f64,
}

fn default_choices(answer_type: AnswerType, catalog: &Catalog, locale: &str) -> Option<Vec<String>> {
    match answer_type {
        AnswerType::YesNo => Some(vec![
            catalog.messages.text(locale, "choice_yes"),
            catalog.messages.text(locale, "choice_no"),
        ]),
        _ => None,
    }
}

/// Source order per turn: context → red-flag → discriminative.
pub fn select_next(
    session: &Session,
    candidates: &[Candidate],
    catalog: &Catalog,
) -> Option<SelectedQuestion> {
    if let Some(q) = next_context_question(session, catalog) {
        return Some(q);
    }
    if let Some(q) = next_red_flag_question(session, catalog) {
        return Some(q);
    }
    next_discriminative_question(session, candidates, catalog)
}

fn profile_field_present(session: &Session, field: &str) -> bool {
    match field {
        "age" => session.profile.age.is_some(),
        "sex" => session.profile.sex.is_some(),
        "pregnant" => session.profile.pregnant.is_some(),
        "chronic" => session.profile.chronic.is_some(),
        _ => false,
    }
}

/// Walk the ordered context list (age → sex → pregnancy → chronic) and emit
/// the first question whose profile field is still missing.
fn next_context_question(session: &Session, catalog: &Catalog) -> Option<SelectedQuestion> {
    let locale = &session.locale;
    for q in &catalog.questions.context {
        if session.asked_context_ids.contains(&q.id) {
            continue;
        }
        if profile_field_present(session, &q.profile_field) {
            continue;
        }
        match q.when_ask.as_str() {
            "always" => {}
            "when_female_and_relevant" => {
                if !session.profile.is_female() {
                    continue;
                }
                let relevant = q
                    .when_symptoms_any
                    .as_ref()
                    .map(|set| set.iter().any(|c| session.known_symptoms.contains(c)))
                    .unwrap_or(true);
                if !relevant {
                    continue;
                }
            }
            _ => continue,
        }

        let choices = q
            .choices
            .as_ref()
            .and_then(|by_locale| {
                by_locale
                    .get(locale)
                    .or_else(|| by_locale.get(crate::config::DEFAULT_LOCALE))
            })
            .cloned()
            .or_else(|| default_choices(q.answer_type, catalog, locale));

        return Some(SelectedQuestion::Context {
            id: q.id.clone(),
            payload: QuestionPayload {
                question_id: format!("ctx_{}", q.id),
                canonical: q.id.clone(),
                question_tr: localized(&q.question, locale).to_string(),
                answer_type: q.answer_type,
                choices_tr: choices,
                why_asking_tr: None,
            },
        });
    }
    None
}

/// First red-flag question whose preconditions intersect the known symptoms
/// and whose id and target canonical were not handled before.
fn next_red_flag_question(session: &Session, catalog: &Catalog) -> Option<SelectedQuestion> {
    let locale = &session.locale;
    for q in &catalog.questions.red_flags {
        if session.was_asked(&q.id) || session.was_asked(&q.canonical) {
            continue;
        }
        if session.known_symptoms.contains(&q.canonical)
            || session.denied_symptoms.contains(&q.canonical)
        {
            continue;
        }
        if !q
            .preconditions
            .iter()
            .any(|c| session.known_symptoms.contains(c))
        {
            continue;
        }

        return Some(SelectedQuestion::RedFlag {
            id: q.id.clone(),
            canonical: q.canonical.clone(),
            escalate_on_yes: q.if_yes_escalate,
            payload: QuestionPayload {
                question_id: q.id.clone(),
                canonical: q.canonical.clone(),
                question_tr: localized(&q.question, locale).to_string(),
                answer_type: q.answer_type,
                choices_tr: default_choices(q.answer_type, catalog, locale),
                why_asking_tr: Some(localized(&q.reason, locale).to_string()),
            },
        });
    }
    None
}

/// Score every candidate symptom for discriminative power.
///
/// For each kaggle symptom present in `c` of the `C` candidates,
/// `disc = 1 − |c/C − 0.5|`; bank entries whose `priority_when_known`
/// intersects the known set earn +0.35. Grouped by canonical (max score),
/// ordered score desc then canonical asc.
pub fn rank_discriminative(
    session: &Session,
    candidates: &[Candidate],
    catalog: &Catalog,
) -> Vec<DiscCandidate> {
    let total = candidates.len();
    if total < 2 {
        return Vec::new();
    }

    let bank = catalog.questions.bank_for(&session.locale);

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for candidate in candidates {
        let all = candidate
            .matched_symptoms
            .iter()
            .chain(candidate.missing_symptoms.iter());
        for kaggle in all {
            *counts.entry(kaggle.as_str()).or_insert(0) += 1;
        }
    }

    let mut best: BTreeMap<String, DiscCandidate> = BTreeMap::new();
    for (kaggle, count) in counts {
        for canonical in catalog.matrix.canonicals_for(kaggle) {
            if session.known_symptoms.contains(canonical)
                || session.denied_symptoms.contains(canonical)
                || session.was_asked(canonical)
            {
                continue;
            }
            let Some(entry) = bank.get(canonical) else {
                continue;
            };
            let skip = catalog
                .questions
                .skip_if_denied(canonical)
                .iter()
                .any(|denied| session.denied_symptoms.contains(denied));
            if skip {
                continue;
            }

            let disc = 1.0 - ((count as f64 / total as f64) - 0.5).abs();
            let boosted = entry
                .priority_when_known
                .as_ref()
                .map(|set| set.iter().any(|c| session.known_symptoms.contains(c)))
                .unwrap_or(false);
            let score = if boosted { disc + PRIORITY_BOOST } else { disc };

            let candidate = DiscCandidate {
                canonical: canonical.clone(),
                kaggle: kaggle.to_string(),
                count,
                disc,
                boosted,
                score,
            };
            match best.get(canonical) {
                Some(existing) if existing.score >= score => {}
                _ => {
                    best.insert(canonical.clone(), candidate);
                }
            }
        }
    }

    let mut ranked: Vec<DiscCandidate> = best.into_values().collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.canonical.cmp(&b.canonical))
    });
    ranked
}

fn next_discriminative_question(
    session: &Session,
    candidates: &[Candidate],
    catalog: &Catalog,
) -> Option<SelectedQuestion> {
    let ranked = rank_discriminative(session, candidates, catalog);
    let top = ranked.into_iter().next()?;

    let bank = catalog.questions.bank_for(&session.locale);
    let entry = bank.get(&top.canonical)?;
    let why = catalog
        .messages
        .text(&session.locale, "why_discriminative")
        .replace("{canonical}", &top.canonical);

    Some(SelectedQuestion::Bank {
        canonical: top.canonical.clone(),
        disc: top.score,
        payload: QuestionPayload {
            question_id: format!("q_{}", top.canonical.replace(' ', "_")),
            canonical: top.canonical,
            question_tr: entry.question.clone(),
            answer_type: entry.answer_type,
            choices_tr: entry
                .choices
                .clone()
                .or_else(|| default_choices(entry.answer_type, catalog, &session.locale)),
            why_asking_tr: Some(why),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::catalog_dir;
    use crate::pipeline::candidates::generate;
    use chrono::Utc;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn catalog() -> Catalog {
        Catalog::load_dir(&catalog_dir()).unwrap()
    }

    fn session_with(known: &[&str], denied: &[&str]) -> Session {
        let mut s = Session::new(Uuid::new_v4(), "tr-TR", Utc::now());
        s.known_symptoms = known.iter().map(|c| c.to_string()).collect();
        s.denied_symptoms = denied.iter().map(|c| c.to_string()).collect();
        // Profile complete: context questions are exercised separately.
        s.profile.age = Some(35);
        s.profile.sex = Some("Erkek".into());
        s.profile.pregnant = Some(false);
        s.profile.chronic = Some(vec![]);
        s
    }

    fn candidates_for(s: &Session, c: &Catalog) -> Vec<Candidate> {
        generate(&s.known_symptoms, &c.matrix, &c.rules.generator)
    }

    #[test]
    fn context_questions_come_first_for_empty_profile() {
        let c = catalog();
        let mut s = session_with(&["baş ağrısı"], &[]);
        s.profile = Default::default();
        let candidates = candidates_for(&s, &c);
        match select_next(&s, &candidates, &c) {
            Some(SelectedQuestion::Context { id, payload }) => {
                assert_eq!(id, "age");
                assert_eq!(payload.question_id, "ctx_age");
            }
            other => panic!("expected context question, got {other:?}"),
        }
    }

    #[test]
    fn pregnancy_only_for_female_with_relevant_symptom() {
        let c = catalog();
        let mut s = session_with(&["bulantı"], &[]);
        s.profile.pregnant = None;
        s.profile.sex = Some("Kadın".into());
        let candidates = candidates_for(&s, &c);
        match select_next(&s, &candidates, &c) {
            Some(SelectedQuestion::Context { id, .. }) => assert_eq!(id, "pregnancy"),
            other => panic!("expected pregnancy question, got {other:?}"),
        }

        // Male profile: pregnancy is skipped entirely.
        s.profile.sex = Some("Erkek".into());
        match select_next(&s, &candidates, &c) {
            Some(SelectedQuestion::Context { id, .. }) => panic!("unexpected context {id}"),
            _ => {}
        }
    }

    #[test]
    fn red_flag_fires_on_burning_urination() {
        let c = catalog();
        let s = session_with(&["idrarda yanma"], &[]);
        let candidates = candidates_for(&s, &c);
        match select_next(&s, &candidates, &c) {
            Some(SelectedQuestion::RedFlag { id, canonical, .. }) => {
                assert_eq!(id, "rf_uti_fever");
                assert_eq!(canonical, "ateş");
            }
            other => panic!("expected red flag, got {other:?}"),
        }
    }

    #[test]
    fn red_flag_not_repeated_after_asked() {
        let c = catalog();
        let mut s = session_with(&["idrarda yanma"], &[]);
        s.mark_asked("rf_uti_fever");
        s.mark_asked("ateş");
        s.deny_symptom("ateş", true);
        let candidates = candidates_for(&s, &c);
        // Only one UTI candidate → no discriminative question either.
        assert!(select_next(&s, &candidates, &c).is_none());
    }

    #[test]
    fn fewer_than_two_candidates_yield_no_discriminative_question() {
        let c = catalog();
        let s = session_with(&["idrarda yanma"], &[]);
        let candidates = candidates_for(&s, &c);
        assert_eq!(candidates.len(), 1);
        assert!(rank_discriminative(&s, &candidates, &c).is_empty());
    }

    #[test]
    fn skip_rules_suppress_cough_details_when_cough_denied() {
        let c = catalog();
        let mut s = session_with(&["ateş", "nefes darlığı"], &["öksürük"]);
        s.mark_asked("öksürük");
        let candidates = candidates_for(&s, &c);
        assert!(candidates.len() >= 2);
        let ranked = rank_discriminative(&s, &candidates, &c);
        for blocked in ["öksürük", "balgam", "öksürük süresi", "öksürük gece artışı", "balgam rengi"] {
            assert!(
                ranked.iter().all(|d| d.canonical != blocked),
                "{blocked} must not be offered"
            );
        }
    }

    #[test]
    fn chest_pain_priority_boost_applies() {
        let c = catalog();
        let s = session_with(&["göğüs ağrısı"], &[]);
        let candidates = candidates_for(&s, &c);
        let ranked = rank_discriminative(&s, &candidates, &c);
        for canonical in [
            "göğüste baskı",
            "nefes darlığı",
            "göğüs ağrısı süresi",
            "göğüs ağrısı sabit mi",
        ] {
            let entry = ranked
                .iter()
                .find(|d| d.canonical == canonical)
                .unwrap_or_else(|| panic!("{canonical} missing from rankings"));
            assert!(entry.boosted, "{canonical} should carry the priority boost");
            assert!((entry.score - entry.disc - PRIORITY_BOOST).abs() < 1e-9);
        }
    }

    #[test]
    fn known_denied_and_asked_are_excluded() {
        let c = catalog();
        let mut s = session_with(&["baş ağrısı", "bulantı"], &["kusma"]);
        s.mark_asked("ateş");
        let candidates = candidates_for(&s, &c);
        let ranked = rank_discriminative(&s, &candidates, &c);
        for excluded in ["baş ağrısı", "bulantı", "kusma", "ateş"] {
            assert!(ranked.iter().all(|d| d.canonical != excluded));
        }
    }

    #[test]
    fn ranking_is_deterministic() {
        let c = catalog();
        let s = session_with(&["baş ağrısı", "bulantı"], &[]);
        let candidates = candidates_for(&s, &c);
        let a: Vec<String> = rank_discriminative(&s, &candidates, &c)
            .into_iter()
            .map(|d| d.canonical)
            .collect();
        let b: Vec<String> = rank_discriminative(&s, &candidates, &c)
            .into_iter()
            .map(|d| d.canonical)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn bank_question_carries_default_yes_no_choices() {
        let c = catalog();
        let s = session_with(&["öksürük", "ateş"], &[]);
        let candidates = candidates_for(&s, &c);
        match select_next(&s, &candidates, &c) {
            Some(SelectedQuestion::Bank { canonical, payload, .. }) => {
                // phlegm splits the cough/fever candidates and its bank
                // entry is boosted by the known cough; alphabetical
                // tie-break puts it ahead of breathlessness
                assert_eq!(canonical, "balgam");
                assert_eq!(payload.answer_type, AnswerType::YesNo);
                let choices = payload.choices_tr.unwrap();
                assert_eq!(choices, vec!["Evet".to_string(), "Hayır".to_string()]);
            }
            other => panic!("expected bank question, got {other:?}"),
        }
    }

    #[test]
    fn question_canonicals_disjoint_from_known_and_denied() {
        let c = catalog();
        let mut s = session_with(&["öksürük", "ateş"], &["balgam"]);
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for _ in 0..10 {
            let candidates = candidates_for(&s, &c);
            let Some(q) = select_next(&s, &candidates, &c) else {
                break;
            };
            let canonical = q.payload().canonical.clone();
            assert!(!seen.contains(&canonical), "{canonical} asked twice");
            assert!(!s.known_symptoms.contains(&canonical));
            assert!(!s.denied_symptoms.contains(&canonical));
            seen.insert(canonical.clone());
            if let SelectedQuestion::RedFlag { id, .. } = &q {
                s.mark_asked(id);
            }
            if let SelectedQuestion::Context { id, .. } = &q {
                s.asked_context_ids.insert(id.clone());
            } else {
                s.mark_asked(&canonical);
            }
        }
        assert!(!seen.is_empty());
    }
}
