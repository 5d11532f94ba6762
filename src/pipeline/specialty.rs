use std::collections::BTreeMap;

use crate::catalog::SpecialtyCatalog;
use crate::models::RulesScore;

use super::interpret::Interpretation;

/// Layer B: deterministic keyword/phrase scoring over one text.
///
/// Scores accumulate into `scores` (persisted on the session), with
/// `matched_canonicals` guaranteeing that no canonical is awarded twice for
/// the same specialty across the whole session.
pub fn score_text(
    normalized: &str,
    interp: &Interpretation,
    catalog: &SpecialtyCatalog,
    scores: &mut BTreeMap<String, RulesScore>,
) {
    let phrase_points = catalog.scoring.phrase_match_points;
    let keyword_points = catalog.scoring.keyword_match_points;
    let negative_penalty = catalog.scoring.negative_keyword_penalty;

    for spec in &catalog.specialties {
        let entry = scores.entry(spec.id.clone()).or_default();

        // Phrase hits take priority over keyword hits for the same canonical.
        for canonical in interp.phrase_canonicals() {
            if entry.matched_canonicals.contains(canonical) {
                continue;
            }
            let rep_phrase = interp.phrase_for(canonical);
            let hits = spec.keywords.contains(canonical)
                || rep_phrase.is_some_and(|p| spec.keywords.contains(p));
            if hits {
                entry.score += phrase_points;
                entry.phrase_score += phrase_points;
                entry.matched_canonicals.insert(canonical.to_string());
                if let Some(phrase) = rep_phrase {
                    if !entry.matched_phrases.iter().any(|p| p == phrase) {
                        entry.matched_phrases.push(phrase.to_string());
                    }
                }
            }
        }

        for canonical in &interp.matched_keyword_canonicals {
            if spec.keywords.contains(canonical.as_str())
                && !entry.matched_canonicals.contains(canonical.as_str())
            {
                entry.score += keyword_points;
                entry.keyword_score += keyword_points;
                entry.matched_canonicals.insert(canonical.clone());
                if !entry.matched_keywords.iter().any(|k| k == canonical) {
                    entry.matched_keywords.push(canonical.clone());
                }
            }
        }

        for negative in &spec.negative_keywords {
            if !negative.is_empty() && normalized.contains(negative.as_str()) {
                entry.score += negative_penalty;
                entry.negative_penalties += negative_penalty;
            }
        }
    }
}

/// Specialties ranked score desc, keyword_score desc, id asc.
pub fn ranked<'a>(scores: &'a BTreeMap<String, RulesScore>) -> Vec<(&'a String, &'a RulesScore)> {
    let mut out: Vec<(&String, &RulesScore)> = scores.iter().collect();
    out.sort_by(|a, b| {
        b.1.score
            .cmp(&a.1.score)
            .then_with(|| b.1.keyword_score.cmp(&a.1.keyword_score))
            .then_with(|| a.0.cmp(b.0))
    });
    out
}

/// Whether the two best specialties are tied on both tie-break keys.
pub fn top_is_tied(scores: &BTreeMap<String, RulesScore>) -> bool {
    let ranked = ranked(scores);
    match ranked.as_slice() {
        [first, second, ..] => {
            first.1.score == second.1.score && first.1.keyword_score == second.1.keyword_score
        }
        _ => false,
    }
}
