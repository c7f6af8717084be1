use crate::schema::ReportPeriod;
use chrono::{Days, Months, NaiveDate};

/// Reports are due within 90 days of period end; the window leaves room
/// for late filers.
const FILING_WINDOW_MONTHS: u32 = 6;

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

/// Closing date of a reporting period of a December fiscal year.
pub fn period_end_date(year: i32, period: ReportPeriod) -> Option<NaiveDate> {
    last_day_of_month(year, period.closing_month())
}

/// Receipt-date range to search for the report covering `period`.
pub fn filing_search_window(year: i32, period: ReportPeriod) -> Option<(NaiveDate, NaiveDate)> {
    let end_of_period = period_end_date(year, period)?;
    let start = end_of_period.checked_add_days(Days::new(1))?;
    let end = end_of_period.checked_add_months(Months::new(FILING_WINDOW_MONTHS))?;
    Some((start, end))
}

/// `YYYYMMDD`, the date format the regulator API takes.
pub fn format_api_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// The `(YYYY.MM)` tag report names carry, e.g. `분기보고서 (2023.03)`.
pub fn report_period_marker(year: i32, period: ReportPeriod) -> String {
    format!("({}.{:02})", year, period.closing_month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(last_day_of_month(2023, 12), NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(last_day_of_month(2023, 13), None);
    }

    #[test]
    fn test_period_end_dates() {
        assert_eq!(
            period_end_date(2023, ReportPeriod::Q2),
            NaiveDate::from_ymd_opt(2023, 6, 30)
        );
        assert_eq!(
            period_end_date(2023, ReportPeriod::Q4),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
    }

    #[test]
    fn test_filing_search_window() {
        let (start, end) = filing_search_window(2023, ReportPeriod::Q4).unwrap();
        assert_eq!(format_api_date(start), "20240101");
        assert_eq!(format_api_date(end), "20240630");

        let (start, end) = filing_search_window(2023, ReportPeriod::Q1).unwrap();
        assert_eq!(format_api_date(start), "20230401");
        assert_eq!(format_api_date(end), "20230930");
    }

    #[test]
    fn test_report_period_marker() {
        assert_eq!(report_period_marker(2023, ReportPeriod::Q1), "(2023.03)");
        assert_eq!(report_period_marker(2022, ReportPeriod::Q4), "(2022.12)");
    }
}
