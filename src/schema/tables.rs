// src/schema/tables.rs

use super::types::{Column, TableDef};

pub const OEWS_BY_STATE: &str = "oews_by_state";
pub const ONET_SKILLS: &str = "onet_skills";

/// Destination for the cleaned wage table.
pub fn oews_by_state() -> TableDef {
    TableDef {
        name: OEWS_BY_STATE.to_string(),
        columns: vec![
            Column::new("soc_code", "TEXT"),
            Column::new("occupation", "TEXT"),
            Column::new("employment", "BIGINT"),
            Column::new("employment_percent_relative_std_error", "NUMERIC(6,2)"),
            Column::new("hourly_mean_wage", "NUMERIC(10,2)"),
            Column::new("annual_mean_wage", "BIGINT"),
            Column::new("wage_percent_relative_std_error", "NUMERIC(6,2)"),
            Column::new("hourly_10th_percentile_wage", "NUMERIC(10,2)"),
            Column::new("hourly_25th_percentile_wage", "NUMERIC(10,2)"),
            Column::new("hourly_median_wage", "NUMERIC(10,2)"),
            Column::new("hourly_75th_percentile_wage", "NUMERIC(10,2)"),
            Column::new("hourly_90th_percentile_wage", "NUMERIC(10,2)"),
            Column::new("annual_10th_percentile_wage", "BIGINT"),
            Column::new("annual_25th_percentile_wage", "BIGINT"),
            Column::new("annual_median_wage", "BIGINT"),
            Column::new("annual_75th_percentile_wage", "BIGINT"),
            Column::new("annual_90th_percentile_wage", "BIGINT"),
            Column::new("employment_per_1000_jobs", "NUMERIC(10,3)"),
            Column::new("location_quotient", "NUMERIC(10,3)"),
        ],
    }
}

/// Destination for the normalized O*NET skill ratings.
pub fn onet_skills() -> TableDef {
    TableDef {
        name: ONET_SKILLS.to_string(),
        columns: vec![
            Column::not_null("onet_soc_code", "TEXT"),
            Column::new("title", "TEXT"),
            Column::not_null("element_id", "TEXT"),
            Column::new("element_name", "TEXT"),
            Column::not_null("scale_id", "TEXT"),
            Column::new("scale_name", "TEXT"),
            Column::new("data_value", "NUMERIC(18,6)"),
            Column::new("n", "BIGINT"),
            Column::new("standard_error", "NUMERIC(18,6)"),
            Column::new("lower_ci_bound", "NUMERIC(18,6)"),
            Column::new("upper_ci_bound", "NUMERIC(18,6)"),
            Column::new("recommend_suppress", "TEXT"),
            Column::new("not_relevant", "TEXT"),
            Column::not_null("date", "DATE"),
            Column::new("domain_source", "TEXT"),
        ],
    }
}
