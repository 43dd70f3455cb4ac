use chrono::{Datelike, NaiveDate};

/// Parse `"MM/YYYY"` (month may be a single digit) into the first day of that month.
pub fn parse_month_year(s: &str) -> Option<NaiveDate> {
    let (month, year) = s.trim().split_once('/')?;
    if year.len() != 4 {
        return None;
    }
    let month: u32 = month.trim().parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Days since the Unix epoch, as stored in Arrow `Date32`.
pub fn to_date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

pub fn from_date32(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

/// `NaiveDate::from_ymd(1970, 1, 1).num_days_from_ce()`
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_year() {
        assert_eq!(
            parse_month_year("05/2024"),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(
            parse_month_year(" 8/2023 "),
            NaiveDate::from_ymd_opt(2023, 8, 1)
        );
        assert_eq!(parse_month_year("N/A"), None);
        assert_eq!(parse_month_year("13/2024"), None);
        assert_eq!(parse_month_year("05/24"), None);
        assert_eq!(parse_month_year(""), None);
    }

    #[test]
    fn date32_epoch() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(to_date32(epoch), 0);
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(from_date32(to_date32(d)), Some(d));
    }

    #[test]
    fn extreme_date32_is_none() {
        assert_eq!(from_date32(i32::MAX), None);
        assert_eq!(from_date32(i32::MIN), None);
    }
}
