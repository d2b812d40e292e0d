//! Identifier and text normalization applied while loading.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Parse a numeric code leniently (`"5001"`, `"5001.0"`, `" 05001 "`) and
/// zero-pad it to `width`. Non-numeric or fractional input yields `None`.
pub fn normalize_numeric_code(raw: Option<&str>, width: usize) -> Option<String> {
    let value = parse_integer(raw)?;
    if value < 0 {
        return None;
    }
    Some(format!("{:0width$}", value, width = width))
}

/// Parse an integer that may have been exported as a float (`"3.0"`).
pub fn parse_integer(raw: Option<&str>) -> Option<i64> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    let v = text.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 {
        Some(v as i64)
    } else {
        None
    }
}

/// Trim free text; blank becomes `None`.
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    let text = raw?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Trimmed, upper-cased text; blank becomes `None`.
pub fn upper_text(raw: Option<&str>) -> Option<String> {
    clean_text(raw).map(|t| t.to_uppercase())
}

/// Fold a place name to a matching key: NFKD-decomposed with combining
/// marks dropped, upper-case, alphanumerics only. `"Bogotá, D.C."` -> `"BOGOTADC"`.
pub fn fold_place_name(name: &str) -> String {
    name.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}
