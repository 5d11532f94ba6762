use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::FreeTextConfig;
use crate::models::{ParsedAnswer, Timing};

// Turkish: gün, gündür, hafta, haftadır, ay, aydır (with optional diacritics).
// English: day(s), week(s), month(s).
static DAY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+)\s*g[uü]nd[uü]r",
        r"(\d+)\s*g[uü]n\s*oldu",
        r"(\d+)\s*g[uü]nl[uü]k",
        r"(\d+)\s*g[uü]n\b",
        r"(\d+)\s*days?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid duration pattern"))
    .collect()
});

static WEEK_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+)\s*haftad[iı]r",
        r"(\d+)\s*hafta\s*oldu",
        r"(\d+)\s*hafta\b",
        r"(\d+)\s*weeks?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid duration pattern"))
    .collect()
});

static MONTH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+)\s*ayd[iı]r",
        r"(\d+)\s*ay\s*oldu",
        r"(\d+)\s*ay\b",
        r"(\d+)\s*months?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid duration pattern"))
    .collect()
});

static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})$").expect("invalid number pattern"));

static SEVERITY_OUT_OF_TEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\s*(?:/\s*10|üzerinden|out of 10)").expect("invalid severity pattern")
});

fn capture_u32(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse a duration in days from Turkish or English text.
/// "3 gündür" → 3, "1 haftadır" → 7, "2 aydır" → 60, bare "5" → 5.
pub fn duration_days(text: &str) -> Option<u32> {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return None;
    }

    for re in DAY_PATTERNS.iter() {
        if let Some(days) = capture_u32(re, &t) {
            if (1..365).contains(&days) {
                return Some(days);
            }
        }
    }
    for re in WEEK_PATTERNS.iter() {
        if let Some(weeks) = capture_u32(re, &t) {
            if (1..52).contains(&weeks) {
                return Some(weeks * 7);
            }
        }
    }
    for re in MONTH_PATTERNS.iter() {
        if let Some(months) = capture_u32(re, &t) {
            if (1..=24).contains(&months) {
                return Some(months * 30);
            }
        }
    }
    if let Some(days) = capture_u32(&BARE_NUMBER, &t) {
        if (1..365).contains(&days) {
            return Some(days);
        }
    }
    None
}

/// Parse a 0–10 severity: bare integer, `n/10` forms, or the catalog's
/// lexical table ("hafif" → 2, "orta" → 6, "şiddetli" → 8).
pub fn severity_0_10(text: &str, cfg: &FreeTextConfig) -> Option<u8> {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return None;
    }

    if let Some(n) = capture_u32(&BARE_NUMBER, &t) {
        if n <= 10 {
            return Some(n as u8);
        }
    }
    if let Some(n) = capture_u32(&SEVERITY_OUT_OF_TEN, &t) {
        if n <= 10 {
            return Some(n as u8);
        }
    }

    // Longest token first, so "çok şiddetli" wins over "şiddetli".
    let mut tokens: Vec<(&String, &u8)> = cfg.severity_lexical.iter().collect();
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
    for (token, value) in tokens {
        if t.contains(token.as_str()) {
            return Some(*value);
        }
    }
    None
}

/// Classify timing into {sabah, akşam, gece, gündüz} by catalog keywords.
pub fn timing(text: &str, cfg: &FreeTextConfig) -> Option<Timing> {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return None;
    }
    for (value, keywords) in &cfg.timing_keywords {
        if keywords.iter().any(|kw| t.contains(kw.as_str())) {
            return value.parse().ok();
        }
    }
    None
}

/// Dispatch: run only the sub-parsers applicable to the canonical.
/// Unparsable input yields an empty struct, never an error.
pub fn parse_free_text(canonical: &str, raw: &str, cfg: &FreeTextConfig) -> ParsedAnswer {
    let mut out = ParsedAnswer::default();
    if canonical.is_empty() || raw.trim().is_empty() {
        return out;
    }

    if cfg.duration_canonicals.contains(canonical) {
        out.duration_days = duration_days(raw);
    }
    if cfg.severity_canonicals.contains(canonical) {
        out.severity_0_10 = severity_0_10(raw, cfg);
    }
    if cfg.timing_canonicals.contains(canonical) {
        out.timing = timing(raw, cfg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::catalog_dir;

    fn cfg() -> FreeTextConfig {
        Catalog::load_dir(&catalog_dir()).unwrap().parser
    }

    #[test]
    fn turkish_durations() {
        assert_eq!(duration_days("3 gündür"), Some(3));
        assert_eq!(duration_days("2 gün oldu"), Some(2));
        assert_eq!(duration_days("1 haftadır"), Some(7));
        assert_eq!(duration_days("2 aydır"), Some(60));
        assert_eq!(duration_days("5"), Some(5));
    }

    #[test]
    fn english_durations() {
        assert_eq!(duration_days("for 4 days"), Some(4));
        assert_eq!(duration_days("2 weeks"), Some(14));
        assert_eq!(duration_days("1 month"), Some(30));
    }

    #[test]
    fn nonsense_duration_is_none() {
        assert_eq!(duration_days("bilmiyorum"), None);
        assert_eq!(duration_days(""), None);
        assert_eq!(duration_days("0 gün"), None);
        assert_eq!(duration_days("400"), None);
    }

    #[test]
    fn numeric_severity() {
        let cfg = cfg();
        assert_eq!(severity_0_10("7", &cfg), Some(7));
        assert_eq!(severity_0_10("8/10", &cfg), Some(8));
        assert_eq!(severity_0_10("11", &cfg), None);
    }

    #[test]
    fn lexical_severity() {
        let cfg = cfg();
        assert_eq!(severity_0_10("hafif bir ağrı", &cfg), Some(2));
        assert_eq!(severity_0_10("orta şiddette", &cfg), Some(6));
        assert_eq!(severity_0_10("şiddetli", &cfg), Some(8));
        assert_eq!(severity_0_10("çok şiddetli, dayanılmaz", &cfg), Some(9));
    }

    #[test]
    fn timing_keywords() {
        let cfg = cfg();
        assert_eq!(timing("sabah kalkınca", &cfg), Some(Timing::Morning));
        assert_eq!(timing("geceleri artıyor", &cfg), Some(Timing::Night));
        assert_eq!(timing("gün boyu sürüyor", &cfg), Some(Timing::Day));
        assert_eq!(timing("fark etmedim", &cfg), None);
    }

    #[test]
    fn dispatch_runs_only_applicable_parsers() {
        let cfg = cfg();
        let parsed = parse_free_text("öksürük süresi", "3 gündür, geceleri", &cfg);
        assert_eq!(parsed.duration_days, Some(3));
        assert_eq!(parsed.timing, Some(Timing::Night));
        assert_eq!(parsed.severity_0_10, None);

        let parsed = parse_free_text("ağrı şiddeti", "7/10", &cfg);
        assert_eq!(parsed.severity_0_10, Some(7));
        assert_eq!(parsed.duration_days, None);
    }

    #[test]
    fn unknown_canonical_yields_empty() {
        let cfg = cfg();
        assert!(parse_free_text("döküntü", "3 gündür", &cfg).is_empty());
        assert!(parse_free_text("öksürük süresi", "", &cfg).is_empty());
    }
}
