use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::CatalogError;
use crate::config::DEFAULT_LOCALE;
use crate::models::AnswerType;

#[derive(Debug, Deserialize)]
struct BankFile {
    questions: Vec<BankEntry>,
}

/// One entry of a per-locale question bank.
#[derive(Debug, Clone, Deserialize)]
pub struct BankEntry {
    pub canonical: String,
    pub question: String,
    pub answer_type: AnswerType,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
    #[serde(default)]
    pub priority_when_known: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SkipRuleFile {
    skip_rules: Vec<SkipRule>,
}

#[derive(Debug, Deserialize)]
struct SkipRule {
    canonical_symptom: String,
    #[serde(default)]
    skip_if_denied: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ContextFile {
    questions: Vec<ContextQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextQuestion {
    pub id: String,
    pub order: u32,
    pub profile_field: String,
    pub when_ask: String,
    #[serde(default)]
    pub when_symptoms_any: Option<Vec<String>>,
    pub answer_type: AnswerType,
    /// locale → question text
    pub question: BTreeMap<String, String>,
    #[serde(default)]
    pub choices: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize)]
struct RedFlagFile {
    questions: Vec<RedFlagQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedFlagQuestion {
    pub id: String,
    pub canonical: String,
    /// Known symptoms that make this question relevant (any-of).
    pub preconditions: Vec<String>,
    pub answer_type: AnswerType,
    #[serde(default)]
    pub if_yes_escalate: bool,
    /// locale → question text
    pub question: BTreeMap<String, String>,
    /// locale → reason shown as "why asking"
    pub reason: BTreeMap<String, String>,
}

/// Question banks plus the selector's side tables.
#[derive(Debug)]
pub struct QuestionCatalog {
    /// locale → canonical → bank entry
    banks: BTreeMap<String, BTreeMap<String, BankEntry>>,
    /// canonical → canonicals whose denial suppresses the question
    skip_rules: BTreeMap<String, Vec<String>>,
    /// ascending by `order`
    pub context: Vec<ContextQuestion>,
    pub red_flags: Vec<RedFlagQuestion>,
}

impl QuestionCatalog {
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let mut banks: BTreeMap<String, BTreeMap<String, BankEntry>> = BTreeMap::new();

        let mut bank_files: Vec<String> = std::fs::read_dir(dir)
            .map_err(|source| CatalogError::Io {
                file: dir.display().to_string(),
                source,
            })?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with("question_bank.") && name.ends_with(".json"))
            .collect();
        bank_files.sort();

        if bank_files.is_empty() {
            return Err(CatalogError::Invalid {
                file: "question_bank.*.json".into(),
                reason: "no question bank files found".into(),
            });
        }

        for file in bank_files {
            let locale = file
                .trim_start_matches("question_bank.")
                .trim_end_matches(".json")
                .to_string();
            let bank: BankFile = super::load_json(dir, &file)?;
            let by_canonical: BTreeMap<String, BankEntry> = bank
                .questions
                .into_iter()
                .map(|q| (q.canonical.clone(), q))
                .collect();
            banks.insert(locale, by_canonical);
        }

        if !banks.contains_key(DEFAULT_LOCALE) {
            return Err(CatalogError::Invalid {
                file: format!("question_bank.{DEFAULT_LOCALE}.json"),
                reason: "default locale bank is required".into(),
            });
        }

        let skip_file: SkipRuleFile = super::load_json(dir, "question_skip_rules.json")?;
        let skip_rules = skip_file
            .skip_rules
            .into_iter()
            .map(|r| (r.canonical_symptom, r.skip_if_denied))
            .collect();

        let context_file: ContextFile = super::load_json(dir, "context_questions.json")?;
        let mut context = context_file.questions;
        context.sort_by_key(|q| q.order);

        let red_flag_file: RedFlagFile = super::load_json(dir, "red_flag_questions.json")?;

        Ok(Self {
            banks,
            skip_rules,
            context,
            red_flags: red_flag_file.questions,
        })
    }

    /// Resolve the bank for a locale: exact match, then same language
    /// prefix, then the default locale.
    pub fn bank_for(&self, locale: &str) -> &BTreeMap<String, BankEntry> {
        if let Some(bank) = self.banks.get(locale) {
            return bank;
        }
        let lang = locale.split(['-', '_']).next().unwrap_or(locale);
        if let Some((_, bank)) = self
            .banks
            .iter()
            .find(|(key, _)| key.split(['-', '_']).next() == Some(lang))
        {
            return bank;
        }
        &self.banks[DEFAULT_LOCALE]
    }

    pub fn bank_size(&self) -> usize {
        self.banks.get(DEFAULT_LOCALE).map(|b| b.len()).unwrap_or(0)
    }

    pub fn skip_if_denied(&self, canonical: &str) -> &[String] {
        self.skip_rules
            .get(canonical)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn red_flag_by_id(&self, id: &str) -> Option<&RedFlagQuestion> {
        self.red_flags.iter().find(|q| q.id == id)
    }

    pub fn context_by_id(&self, id: &str) -> Option<&ContextQuestion> {
        self.context.iter().find(|q| q.id == id)
    }
}

/// Pick a localized text from a `locale → text` map with default fallback.
pub fn localized<'a>(map: &'a BTreeMap<String, String>, locale: &str) -> &'a str {
    if let Some(text) = map.get(locale) {
        return text;
    }
    let lang = locale.split(['-', '_']).next().unwrap_or(locale);
    if let Some((_, text)) = map
        .iter()
        .find(|(key, _)| key.split(['-', '_']).next() == Some(lang))
    {
        return text;
    }
    map.get(DEFAULT_LOCALE)
        .map(|s| s.as_str())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::catalog_dir;

    fn catalog() -> QuestionCatalog {
        QuestionCatalog::load(&catalog_dir()).unwrap()
    }

    #[test]
    fn default_bank_has_core_questions() {
        let c = catalog();
        let bank = c.bank_for("tr-TR");
        for canonical in ["ateş", "öksürük", "bulanık görme", "göğüste baskı"] {
            assert!(bank.contains_key(canonical), "missing {canonical}");
        }
    }

    #[test]
    fn unknown_locale_falls_back_to_default() {
        let c = catalog();
        let bank = c.bank_for("de-DE");
        assert_eq!(bank.len(), c.bank_for("tr-TR").len());
    }

    #[test]
    fn language_prefix_resolves_english_bank() {
        let c = catalog();
        let bank = c.bank_for("en-GB");
        let q = bank.get("ateş").unwrap();
        assert!(q.question.contains("fever"), "got: {}", q.question);
    }

    #[test]
    fn skip_rules_cover_cough_details() {
        let c = catalog();
        for canonical in ["balgam", "öksürük süresi", "öksürük gece artışı", "balgam rengi"] {
            assert!(
                c.skip_if_denied(canonical).contains(&"öksürük".to_string()),
                "{canonical} should be skippable on denied öksürük"
            );
        }
    }

    #[test]
    fn context_questions_ordered() {
        let c = catalog();
        let ids: Vec<&str> = c.context.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["age", "sex", "pregnancy", "chronic"]);
    }

    #[test]
    fn priority_entries_reference_chest_pain() {
        let c = catalog();
        let bank = c.bank_for("tr-TR");
        for canonical in [
            "göğüste baskı",
            "nefes darlığı",
            "göğüs ağrısı süresi",
            "göğüs ağrısı sabit mi",
        ] {
            let entry = bank.get(canonical).unwrap();
            assert!(
                entry
                    .priority_when_known
                    .as_ref()
                    .unwrap()
                    .contains(&"göğüs ağrısı".to_string()),
                "{canonical} should be prioritized on known göğüs ağrısı"
            );
        }
    }

    #[test]
    fn localized_falls_back_to_default_locale() {
        let mut map = BTreeMap::new();
        map.insert("tr-TR".to_string(), "merhaba".to_string());
        map.insert("en-US".to_string(), "hello".to_string());
        assert_eq!(localized(&map, "en-US"), "hello");
        assert_eq!(localized(&map, "en"), "hello");
        assert_eq!(localized(&map, "fr-FR"), "merhaba");
    }
}
