use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use super::CatalogError;
use crate::pipeline::normalize::normalize;

#[derive(Debug, Deserialize)]
struct SynonymFile {
    synonyms: Vec<SynonymEntry>,
}

#[derive(Debug, Deserialize)]
struct SynonymEntry {
    canonical: String,
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: String,
    #[serde(default)]
    variants: Vec<String>,
}

/// Variant → canonical index for the symptom interpreter.
///
/// Variants are normalized at load and sorted by length descending, then
/// variant ascending, so the phrase pass is longest-match-first and fully
/// deterministic.
#[derive(Debug)]
pub struct SynonymIndex {
    variants: Vec<(String, String)>,
    canonicals: Vec<String>,
}

impl SynonymIndex {
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let file: SynonymFile = super::load_json(dir, "synonyms.json")?;
        Ok(Self::from_entries(file.synonyms))
    }

    fn from_entries(entries: Vec<SynonymEntry>) -> Self {
        let mut variants: Vec<(String, String)> = Vec::new();
        let mut canonicals: BTreeSet<String> = BTreeSet::new();
        let mut seen: BTreeSet<(String, String)> = BTreeSet::new();

        for entry in entries {
            let canonical = normalize(&entry.canonical);
            if canonical.is_empty() {
                continue;
            }
            canonicals.insert(canonical.clone());
            for variant in entry.variants {
                let variant = normalize(&variant);
                if variant.is_empty() {
                    continue;
                }
                let key = (variant.clone(), canonical.clone());
                if seen.insert(key) {
                    variants.push((variant, canonical.clone()));
                }
            }
        }

        variants.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self {
            variants,
            canonicals: canonicals.into_iter().collect(),
        }
    }

    /// `(variant, canonical)` pairs, longest variant first.
    pub fn variants(&self) -> &[(String, String)] {
        &self.variants
    }

    /// All canonicals, ascending.
    pub fn canonicals(&self) -> &[String] {
        &self.canonicals
    }

    pub fn is_canonical(&self, name: &str) -> bool {
        self.canonicals.binary_search_by(|c| c.as_str().cmp(name)).is_ok()
    }
}
