use chrono::{Datelike, Duration, Local, Month, NaiveDate};
use std::fmt;

/// Calendar date format used on the wire and in storage
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date string
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let date_str = date_str.trim();
    // chrono accepts unpadded fields, the wire format does not
    if date_str.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(date_str, DATE_FORMAT).ok()
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today's date on the server's local calendar
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Number of days in the given month, computed as the day before the first of next month
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first_of_next - Duration::days(1)).day())
}

/// A validated calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a month, returning None when the month is outside 1..=12 or the year is unrepresentable
    pub fn new(year: i32, month: u32) -> Option<Self> {
        // Both ends of the month must exist for the grid arithmetic
        NaiveDate::from_ymd_opt(year, month, 1)?;
        days_in_month(year, month)?;
        Some(Self { year, month })
    }

    /// The month containing a date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month).unwrap_or(28)
    }

    pub fn last_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, self.days_in_month()).unwrap_or(NaiveDate::MAX)
    }

    /// The date of a given day number within this month
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// The following month, or self at the end of the representable range
    pub fn next(&self) -> Self {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        Self::new(year, month).unwrap_or(*self)
    }

    /// The preceding month, or self at the start of the representable range
    pub fn prev(&self) -> Self {
        let (year, month) = if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        };
        Self::new(year, month).unwrap_or(*self)
    }

    /// Localized month header, e.g. "June 2024" or "2024年 6月"
    pub fn label(&self) -> String {
        let month_name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or_default();

        t!(
            "month_label",
            year = self.year,
            month = self.month,
            month_name = month_name
        )
        .to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        // Valid cases
        assert_eq!(parse_date("2024-06-10"), Some(date(2024, 6, 10)));
        assert_eq!(parse_date(" 2024-02-29 "), Some(date(2024, 2, 29)));

        // Invalid cases
        assert_eq!(parse_date("2023-02-29"), None); // Not a leap year
        assert_eq!(parse_date("2024-6-10"), None); // Unpadded month
        assert_eq!(parse_date("2024/06/10"), None); // Wrong separator
        assert_eq!(parse_date("2024-06-10T00:00:00"), None); // Has a time part
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("tomorrow"), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date(2024, 7, 1)), "2024-07-01");
        assert_eq!(format_date(date(999, 1, 2)), "0999-01-02");
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 1), Some(31));
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 4), Some(30));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
        assert_eq!(days_in_month(2024, 0), None);
    }

    #[test]
    fn test_year_month_bounds() {
        assert!(YearMonth::new(2024, 0).is_none());
        assert!(YearMonth::new(2024, 13).is_none());

        let june = YearMonth::new(2024, 6).unwrap();
        assert_eq!(june.first_day(), date(2024, 6, 1));
        assert_eq!(june.last_day(), date(2024, 6, 30));
        assert_eq!(june.days_in_month(), 30);
        assert_eq!(june.day(31), None);
        assert_eq!(june.to_string(), "2024-06");
    }

    #[test]
    fn test_year_month_navigation() {
        let december = YearMonth::new(2024, 12).unwrap();
        assert_eq!(december.next(), YearMonth::new(2025, 1).unwrap());
        assert_eq!(december.next().prev(), december);

        let january = YearMonth::new(2024, 1).unwrap();
        assert_eq!(january.prev(), YearMonth::new(2023, 12).unwrap());

        assert_eq!(
            YearMonth::containing(date(2024, 2, 29)),
            YearMonth::new(2024, 2).unwrap()
        );
    }

    #[test]
    fn test_label_default_locale() {
        let june = YearMonth::new(2024, 6).unwrap();
        assert_eq!(june.label(), "June 2024");
    }
}
