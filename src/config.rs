use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Triyaj";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub const DEFAULT_LOG_FILTER: &str = "triyaj=info";

/// Default locale used when a request's locale is unknown or a localized
/// text is missing.
pub const DEFAULT_LOCALE: &str = "tr-TR";

/// Resolve the catalog directory.
///
/// `TRIYAJ_CATALOG_DIR` wins when set; otherwise the `data/` directory
/// shipped with the crate is used.
pub fn catalog_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TRIYAJ_CATALOG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_dir_defaults_to_crate_data() {
        // Guard against a leaked env var from another test run.
        std::env::remove_var("TRIYAJ_CATALOG_DIR");
        let dir = catalog_dir();
        assert!(dir.ends_with("data"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_locale_is_turkish() {
        assert_eq!(DEFAULT_LOCALE, "tr-TR");
    }
}
