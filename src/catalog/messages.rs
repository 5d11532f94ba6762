use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::CatalogError;

/// Locale-keyed static text. The selector and engine never hard-code
/// user-facing strings; everything comes through here.
#[derive(Debug, Deserialize)]
pub struct MessageCatalog {
    default_locale: String,
    locales: BTreeMap<String, BTreeMap<String, String>>,
}

impl MessageCatalog {
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let catalog: MessageCatalog = super::load_json(dir, "messages.json")?;
        if !catalog.locales.contains_key(&catalog.default_locale) {
            return Err(CatalogError::Invalid {
                file: "messages.json".into(),
                reason: format!("default locale {} missing", catalog.default_locale),
            });
        }
        Ok(catalog)
    }

    /// Whether the requested locale (or its language) is served directly.
    pub fn supports(&self, locale: &str) -> bool {
        self.resolve(locale).is_some()
    }

    fn resolve(&self, locale: &str) -> Option<&BTreeMap<String, String>> {
        if let Some(map) = self.locales.get(locale) {
            return Some(map);
        }
        let lang = locale.split(['-', '_']).next().unwrap_or(locale);
        self.locales
            .iter()
            .find(|(key, _)| key.split(['-', '_']).next() == Some(lang))
            .map(|(_, map)| map)
    }

    /// Localized text for `key`: requested locale, then language prefix,
    /// then the default locale, then the key itself.
    pub fn text(&self, locale: &str, key: &str) -> String {
        if let Some(map) = self.resolve(locale) {
            if let Some(text) = map.get(key) {
                return text.clone();
            }
        }
        self.locales[&self.default_locale]
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
