use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use super::CatalogError;
use crate::pipeline::normalize::normalize;

#[derive(Debug, Deserialize)]
struct SpecialtyFile {
    specialties: Vec<SpecialtyEntryRaw>,
    scoring: ScoringConfig,
}

#[derive(Debug, Deserialize)]
struct SpecialtyEntryRaw {
    id: String,
    name_tr: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    negative_keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub keyword_match_points: i64,
    pub phrase_match_points: i64,
    pub negative_keyword_penalty: i64,
    #[serde(default)]
    #[allow(dead_code)]
    pub tie_breakers: Vec<String>,
}

#[derive(Debug)]
pub struct SpecialtyEntry {
    pub id: String,
    pub name_tr: String,
    /// Normalized keyword set for membership tests.
    pub keywords: BTreeSet<String>,
    /// Normalized negative keywords, checked against raw text.
    pub negative_keywords: Vec<String>,
}

#[derive(Debug)]
pub struct SpecialtyCatalog {
    /// Ascending by id; iteration order is the deterministic scoring order.
    pub specialties: Vec<SpecialtyEntry>,
    pub scoring: ScoringConfig,
}

impl SpecialtyCatalog {
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let file: SpecialtyFile = super::load_json(dir, "specialty_keywords.json")?;
        let mut specialties: Vec<SpecialtyEntry> = file
            .specialties
            .into_iter()
            .map(|raw| SpecialtyEntry {
                id: raw.id,
                name_tr: raw.name_tr,
                keywords: raw.keywords.iter().map(|k| normalize(k)).collect(),
                negative_keywords: raw
                    .negative_keywords
                    .iter()
                    .map(|k| normalize(k))
                    .collect(),
            })
            .collect();
        specialties.sort_by(|a, b| a.id.cmp(&b.id));

        let ids: BTreeSet<&str> = specialties.iter().map(|s| s.id.as_str()).collect();
        if ids.len() != specialties.len() {
            return Err(CatalogError::Invalid {
                file: "specialty_keywords.json".into(),
                reason: "duplicate specialty id".into(),
            });
        }

        Ok(Self {
            specialties,
            scoring: file.scoring,
        })
    }

    pub fn name_of(&self, specialty_id: &str) -> Option<&str> {
        self.specialties
            .iter()
            .find(|s| s.id == specialty_id)
            .map(|s| s.name_tr.as_str())
    }
}
