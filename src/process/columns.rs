//! Header normalization for the two source tables.

/// Wage-table header → snake_case column name.
///
/// Headers that do not mention the occupation lose their parenthesized footnote suffix;
/// the occupation header keeps it so the composite split can find `occupation_soc_code`.
pub fn normalize_wage_header(raw: &str) -> String {
    let base = if raw.to_lowercase().contains("occupation") {
        raw
    } else {
        raw.split('(').next().unwrap_or_default().trim()
    };
    base.replace(' ', "_")
        .replace([',', '(', ')'], "")
        .replace("standard_error", "std_error")
        .to_lowercase()
        .trim()
        .to_string()
}

/// Spreadsheet header → snake_case column name (`O*NET-SOC Code` → `onet_soc_code`).
pub fn normalize_skills_header(raw: &str) -> String {
    raw.trim()
        .replace([' ', '-'], "_")
        .replace('*', "")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wage_headers() {
        assert_eq!(
            normalize_wage_header("Occupation (SOC code)"),
            "occupation_soc_code"
        );
        assert_eq!(normalize_wage_header("Employment(1)"), "employment");
        assert_eq!(
            normalize_wage_header("Employment percent relative standard error(3)"),
            "employment_percent_relative_std_error"
        );
        assert_eq!(
            normalize_wage_header("Employment per 1,000 jobs"),
            "employment_per_1000_jobs"
        );
        assert_eq!(
            normalize_wage_header("Annual 10th percentile wage(2)"),
            "annual_10th_percentile_wage"
        );
        assert_eq!(normalize_wage_header("Location Quotient"), "location_quotient");
    }

    #[test]
    fn suffix_is_removed_before_lowercasing() {
        // "(SOC)" would otherwise survive as "soc" once parentheses are stripped
        assert_eq!(normalize_wage_header("Hourly mean wage (SOC)"), "hourly_mean_wage");
        assert_eq!(
            normalize_wage_header("OCCUPATION TITLE (SOC)"),
            "occupation_title_soc"
        );
    }

    #[test]
    fn skills_headers() {
        assert_eq!(normalize_skills_header("O*NET-SOC Code"), "onet_soc_code");
        assert_eq!(normalize_skills_header(" Element ID "), "element_id");
        assert_eq!(normalize_skills_header("Lower CI Bound"), "lower_ci_bound");
        assert_eq!(normalize_skills_header("N"), "n");
        assert_eq!(normalize_skills_header("Date"), "date");
    }
}
