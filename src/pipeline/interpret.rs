use std::collections::BTreeSet;

use crate::catalog::SynonymIndex;

/// Result of running the symptom interpreter over one normalized text.
#[derive(Debug, Clone, Default)]
pub struct Interpretation {
    /// `(matched variant, canonical)` in phrase-pass order. A canonical may
    /// appear more than once when several of its variants match.
    pub matched_phrases: Vec<(String, String)>,
    /// Canonicals matched literally in the keyword pass, alphabetical.
    pub matched_keyword_canonicals: Vec<String>,
    /// Every canonical detected, phrase or keyword.
    pub canonicals: BTreeSet<String>,
}

impl Interpretation {
    /// Canonicals locked by the phrase pass, first-match order, no repeats.
    pub fn phrase_canonicals(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.matched_phrases
            .iter()
            .filter(|(_, c)| seen.insert(c.as_str()))
            .map(|(_, c)| c.as_str())
            .collect()
    }

    /// First matched variant for a canonical, if any.
    pub fn phrase_for(&self, canonical: &str) -> Option<&str> {
        self.matched_phrases
            .iter()
            .find(|(_, c)| c == canonical)
            .map(|(p, _)| p.as_str())
    }
}

/// Phrase-then-keyword matching over a normalized text.
///
/// Pass 1 walks the variant index (longest variant first) and locks each
/// matching variant's canonical. Pass 2 walks the canonicals alphabetically
/// and records literal hits that were not locked by a phrase. A canonical is
/// counted at most once.
pub fn interpret(normalized: &str, index: &SynonymIndex) -> Interpretation {
    let mut out = Interpretation::default();
    let mut locked: BTreeSet<&str> = BTreeSet::new();

    for (variant, canonical) in index.variants() {
        if normalized.contains(variant.as_str()) {
            out.matched_phrases.push((variant.clone(), canonical.clone()));
            locked.insert(canonical.as_str());
        }
    }

    for canonical in index.canonicals() {
        if !locked.contains(canonical.as_str()) && normalized.contains(canonical.as_str()) {
            out.matched_keyword_canonicals.push(canonical.clone());
            locked.insert(canonical.as_str());
        }
    }

    out.canonicals = locked.into_iter().map(|c| c.to_string()).collect();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::catalog_dir;
    use crate::pipeline::normalize::normalize;

    fn index() -> SynonymIndex {
        Catalog::load_dir(&catalog_dir()).unwrap().synonyms
    }

    #[test]
    fn phrase_locks_canonical() {
        let idx = index();
        let interp = interpret(&normalize("Başım ağrıyor ve bulantı var"), &idx);
        assert!(interp.canonicals.contains("baş ağrısı"));
        assert!(interp.canonicals.contains("bulantı"));
        assert_eq!(interp.phrase_for("baş ağrısı"), Some("başım ağrıyor"));
        // "bulantı" arrives via the keyword pass, not a variant
        assert!(interp
            .matched_keyword_canonicals
            .contains(&"bulantı".to_string()));
    }

    #[test]
    fn no_double_count_for_same_canonical() {
        let idx = index();
        // Both the variant and the canonical literal are present.
        let interp = interpret(&normalize("başım ağrıyor, baş ağrısı çok kötü"), &idx);
        let phrase_locked: Vec<&str> = interp.phrase_canonicals();
        assert!(phrase_locked.contains(&"baş ağrısı"));
        assert!(
            !interp
                .matched_keyword_canonicals
                .contains(&"baş ağrısı".to_string()),
            "phrase-locked canonical must not re-match as keyword"
        );
    }

    #[test]
    fn chest_pressure_scenario_extracts_all_four() {
        let idx = index();
        let interp = interpret(
            &normalize("göğüs ağrısı, baskı hissi ve terliyorum, nefes darlığı"),
            &idx,
        );
        for canonical in ["göğüs ağrısı", "göğüste baskı", "terleme", "nefes darlığı"] {
            assert!(interp.canonicals.contains(canonical), "missing {canonical}");
        }
    }

    #[test]
    fn urination_phrase_matches_variant() {
        let idx = index();
        let interp = interpret(&normalize("idrarımı yaparken yanıyor"), &idx);
        assert!(interp.canonicals.contains("idrarda yanma"));
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let idx = index();
        let text = normalize("öksürük, balgam ve ateşim var, nefes darlığı");
        let a = interpret(&text, &idx);
        let b = interpret(&text, &idx);
        assert_eq!(a.canonicals, b.canonicals);
        assert_eq!(a.matched_phrases, b.matched_phrases);
        assert_eq!(a.matched_keyword_canonicals, b.matched_keyword_canonicals);
    }

    #[test]
    fn empty_text_yields_empty_interpretation() {
        let idx = index();
        let interp = interpret("", &idx);
        assert!(interp.canonicals.is_empty());
        assert!(interp.matched_phrases.is_empty());
    }
}
