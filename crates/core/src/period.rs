use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar year a transaction or invoice falls in, used to constrain GST
/// register lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear(pub i32);

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FY{}", self.0)
    }
}

impl FiscalYear {
    pub fn new(year: i32) -> Self {
        FiscalYear(year)
    }

    pub fn year(self) -> i32 {
        self.0
    }

    pub fn from_date(date: NaiveDate) -> Self {
        FiscalYear(date.year())
    }
}

/// Inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// The window reaching `days` either side of `center`, inclusive.
    /// Saturates at the calendar's ends rather than overflowing.
    pub fn window(center: NaiveDate, days: u32) -> Self {
        let span = Duration::days(days as i64);
        DateRange {
            start: center.checked_sub_signed(span).unwrap_or(NaiveDate::MIN),
            end: center.checked_add_signed(span).unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fiscal_year_display() {
        assert_eq!(FiscalYear::new(2023).to_string(), "FY2023");
    }

    #[test]
    fn fiscal_year_from_date_uses_calendar_year() {
        assert_eq!(FiscalYear::from_date(date(2023, 3, 31)), FiscalYear::new(2023));
        assert_eq!(FiscalYear::from_date(date(2023, 4, 1)), FiscalYear::new(2023));
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let range = DateRange::window(date(2024, 1, 10), 5);
        assert_eq!(range.start, date(2024, 1, 5));
        assert_eq!(range.end, date(2024, 1, 15));
        assert!(range.contains(date(2024, 1, 5)));
        assert!(range.contains(date(2024, 1, 15)));
        assert!(!range.contains(date(2024, 1, 4)));
        assert!(!range.contains(date(2024, 1, 16)));
    }

    #[test]
    fn zero_day_window_only_contains_center() {
        let range = DateRange::window(date(2024, 6, 1), 0);
        assert!(range.contains(date(2024, 6, 1)));
        assert!(!range.contains(date(2024, 6, 2)));
        assert!(!range.contains(date(2024, 5, 31)));
    }

    #[test]
    fn oversized_window_saturates_instead_of_panicking() {
        let range = DateRange::window(date(2024, 1, 1), u32::MAX);
        assert_eq!(range.start, NaiveDate::MIN);
        assert_eq!(range.end, NaiveDate::MAX);
        assert!(range.contains(date(1, 1, 1)));
    }

    #[test]
    fn window_crosses_month_and_year_boundaries() {
        let range = DateRange::window(date(2024, 1, 2), 5);
        assert!(range.contains(date(2023, 12, 28)));
        assert!(!range.contains(date(2023, 12, 27)));
    }

    #[test]
    fn date_range_display() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31));
        assert_eq!(range.to_string(), "2024-01-01 to 2024-12-31");
    }
}
