//! Startup-loaded reference data. Everything here is immutable at runtime
//! and shared across sessions.

pub mod matrix;
pub mod messages;
pub mod questions;
pub mod rules;
pub mod specialties;
pub mod synonyms;

use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use matrix::DiseaseMatrix;
pub use messages::MessageCatalog;
pub use questions::{BankEntry, ContextQuestion, QuestionCatalog, RedFlagQuestion};
pub use rules::{
    EmergencyRule, FreeTextConfig, GeneratorConfig, RiskRules, RuleCatalog, SameDayRule, StopRules,
};
pub use specialties::{ScoringConfig, SpecialtyCatalog, SpecialtyEntry};
pub use synonyms::SynonymIndex;

use crate::facility::FacilityCatalog;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file {file} could not be read: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog file {file} is malformed: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Catalog file {file} is invalid: {reason}")]
    Invalid { file: String, reason: String },
}

fn load_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T, CatalogError> {
    let path = dir.join(file);
    let raw = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
        file: file.to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
        file: file.to_string(),
        source,
    })
}

/// All reference data needed by the pipeline, loaded once at startup.
#[derive(Debug)]
pub struct Catalog {
    pub synonyms: SynonymIndex,
    pub matrix: DiseaseMatrix,
    pub specialties: SpecialtyCatalog,
    pub questions: QuestionCatalog,
    pub rules: RuleCatalog,
    pub parser: FreeTextConfig,
    pub messages: MessageCatalog,
    pub facilities: FacilityCatalog,
}

impl Catalog {
    /// Load every catalog file from `dir`. Fails fast on any missing or
    /// malformed file; there is no partial catalog.
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        let synonyms = SynonymIndex::load(dir)?;
        let matrix = DiseaseMatrix::load(dir)?;
        let specialties = SpecialtyCatalog::load(dir)?;
        let questions = QuestionCatalog::load(dir)?;
        let rules = RuleCatalog::load(dir)?;
        let parser = load_json(dir, "free_text_parse.json")?;
        let messages = MessageCatalog::load(dir)?;
        let facilities = load_json(dir, "facilities.json")?;

        tracing::info!(
            synonyms = synonyms.canonicals().len(),
            diseases = matrix.disease_count(),
            specialties = specialties.specialties.len(),
            questions = questions.bank_size(),
            "catalog loaded"
        );

        Ok(Self {
            synonyms,
            matrix,
            specialties,
            questions,
            rules,
            parser,
            messages,
            facilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_catalog_loads() {
        let catalog = Catalog::load_dir(&crate::config::catalog_dir()).unwrap();
        assert!(catalog.matrix.disease_count() > 10);
        assert!(catalog.specialties.specialties.len() >= 5);
        assert!(catalog.questions.bank_size() > 30);
    }

    #[test]
    fn missing_directory_reports_io_error() {
        let err = Catalog::load_dir(Path::new("/nonexistent/catalog")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
