use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use super::CatalogError;

#[derive(Debug, Deserialize)]
struct DiseaseSpecialtyFile {
    fallback_specialty_id: String,
    map: BTreeMap<String, DiseaseSpecialty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiseaseSpecialty {
    pub id: String,
    pub confidence: f64,
}

/// The disease/symptom matrix and its vocabulary mappings.
///
/// Diseases and severities live in "kaggle space" (the external snake_case
/// vocabulary); the `kaggle_to_canonical` file maps each canonical to the
/// kaggle symptoms it covers. The reverse map is one-to-many: detail
/// canonicals (e.g. a duration question) map back to their parent symptom.
#[derive(Debug)]
pub struct DiseaseMatrix {
    disease_symptoms: BTreeMap<String, BTreeSet<String>>,
    symptom_severity: BTreeMap<String, u8>,
    canonical_to_kaggle: BTreeMap<String, Vec<String>>,
    kaggle_to_canonicals: BTreeMap<String, Vec<String>>,
    disease_to_specialty: BTreeMap<String, DiseaseSpecialty>,
    fallback_specialty_id: String,
}

impl DiseaseMatrix {
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let disease_symptoms: BTreeMap<String, BTreeSet<String>> =
            super::load_json(dir, "disease_symptoms.json")?;
        let symptom_severity: BTreeMap<String, u8> =
            super::load_json(dir, "symptom_severity.json")?;
        let canonical_to_kaggle: BTreeMap<String, Vec<String>> =
            super::load_json(dir, "kaggle_to_canonical.json")?;
        let specialty_file: DiseaseSpecialtyFile =
            super::load_json(dir, "disease_to_specialty.json")?;

        for (kaggle, severity) in &symptom_severity {
            if !(1..=7).contains(severity) {
                return Err(CatalogError::Invalid {
                    file: "symptom_severity.json".into(),
                    reason: format!("severity for {kaggle} out of 1..=7: {severity}"),
                });
            }
        }

        let mut kaggle_to_canonicals: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (canonical, kaggles) in &canonical_to_kaggle {
            for kaggle in kaggles {
                kaggle_to_canonicals
                    .entry(kaggle.clone())
                    .or_default()
                    .push(canonical.clone());
            }
        }
        for canonicals in kaggle_to_canonicals.values_mut() {
            canonicals.sort();
            canonicals.dedup();
        }

        Ok(Self {
            disease_symptoms,
            symptom_severity,
            canonical_to_kaggle,
            kaggle_to_canonicals,
            disease_to_specialty: specialty_file.map,
            fallback_specialty_id: specialty_file.fallback_specialty_id,
        })
    }

    pub fn disease_count(&self) -> usize {
        self.disease_symptoms.len()
    }

    /// Diseases with their symptom sets, ascending by label.
    pub fn diseases(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.disease_symptoms.iter()
    }

    pub fn severity(&self, kaggle: &str) -> Option<u8> {
        self.symptom_severity.get(kaggle).copied()
    }

    /// Expand canonicals into the kaggle symptom space.
    pub fn to_kaggle_set(&self, canonicals: &BTreeSet<String>) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for canonical in canonicals {
            if let Some(kaggles) = self.canonical_to_kaggle.get(canonical) {
                out.extend(kaggles.iter().cloned());
            }
        }
        out
    }

    /// All canonicals that cover a kaggle symptom, ascending. Empty when the
    /// symptom has no canonical counterpart.
    pub fn canonicals_for(&self, kaggle: &str) -> &[String] {
        self.kaggle_to_canonicals
            .get(kaggle)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn specialty_for(&self, disease_label: &str) -> Option<&DiseaseSpecialty> {
        self.disease_to_specialty.get(disease_label)
    }

    pub fn fallback_specialty_id(&self) -> &str {
        &self.fallback_specialty_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::catalog_dir;

    fn matrix() -> DiseaseMatrix {
        DiseaseMatrix::load(&catalog_dir()).unwrap()
    }

    #[test]
    fn every_disease_symptom_has_a_severity() {
        let m = matrix();
        for (disease, symptoms) in m.diseases() {
            for s in symptoms {
                assert!(
                    m.severity(s).is_some(),
                    "{disease}: no severity for {s}"
                );
            }
        }
    }

    #[test]
    fn reverse_mapping_covers_detail_canonicals() {
        let m = matrix();
        let canonicals = m.canonicals_for("cough");
        assert!(canonicals.contains(&"öksürük".to_string()));
        assert!(canonicals.contains(&"öksürük süresi".to_string()));
    }

    #[test]
    fn kaggle_expansion_is_union() {
        let m = matrix();
        let set: BTreeSet<String> = ["ateş".to_string()].into_iter().collect();
        let kaggle = m.to_kaggle_set(&set);
        assert!(kaggle.contains("high_fever"));
    }

    #[test]
    fn every_disease_maps_to_a_specialty() {
        let m = matrix();
        for (disease, _) in m.diseases() {
            assert!(
                m.specialty_for(disease).is_some(),
                "no specialty mapping for {disease}"
            );
        }
    }

    #[test]
    fn mapping_confidence_in_unit_interval() {
        let m = matrix();
        for (disease, _) in m.diseases() {
            let mapping = m.specialty_for(disease).unwrap();
            assert!(
                (0.0..=1.0).contains(&mapping.confidence),
                "{disease}: confidence {}",
                mapping.confidence
            );
        }
    }
}
