use once_cell::sync::Lazy;
use regex::Regex;

/// A footnote code immediately followed by a dash, e.g. `(8)-`: the value is suppressed.
static SUPPRESSED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(\d+\)-$").expect("suppression pattern should compile"));

pub fn is_suppressed(raw: &str) -> bool {
    SUPPRESSED.is_match(raw)
}

/// Normalize one wage-table cell.
///
/// - missing, empty or suppressed → `None`
/// - anything up to and including the first `)` is a footnote marker and is dropped
/// - `$` and thousands separators are stripped
///
/// Anything else is returned verbatim; numeric casting decides whether it survives.
pub fn normalize_cell(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw.is_empty() || is_suppressed(raw) {
        return None;
    }
    let rest = match raw.split_once(')') {
        Some((_, after)) => after.trim(),
        None => raw,
    };
    Some(rest.replace(['$', ','], ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppressed_values_become_null() {
        assert_eq!(normalize_cell(Some("(8)-")), None);
        assert_eq!(normalize_cell(Some("(12)-")), None);
        assert_eq!(normalize_cell(Some("")), None);
        assert_eq!(normalize_cell(None), None);
    }

    #[test]
    fn suppression_must_match_whole_cell() {
        assert!(!is_suppressed("(8)-5"));
        assert!(!is_suppressed("x(8)-"));
        // not suppressed, so the footnote strip applies
        assert_eq!(normalize_cell(Some("(8)-5")).as_deref(), Some("-5"));
    }

    #[test]
    fn leading_footnote_is_stripped() {
        assert_eq!(normalize_cell(Some("(1)45.20")).as_deref(), Some("45.20"));
        assert_eq!(normalize_cell(Some("(5) 1,200")).as_deref(), Some("1200"));
        assert_eq!(normalize_cell(Some("a)b)c")).as_deref(), Some("b)c"));
    }

    #[test]
    fn currency_and_separators_are_stripped() {
        assert_eq!(normalize_cell(Some("$250,300")).as_deref(), Some("250300"));
        assert_eq!(normalize_cell(Some("1,200")).as_deref(), Some("1200"));
        assert_eq!(normalize_cell(Some("n/a")).as_deref(), Some("n/a"));
    }
}
