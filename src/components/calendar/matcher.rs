use super::models::Event;
use chrono::NaiveDate;

/// True iff the event's inclusive date range contains the day
pub fn matches(day: NaiveDate, event: &Event) -> bool {
    event.start_date <= day && day <= event.end_date
}

/// True iff the event intersects the inclusive range `[first, last]`
pub fn overlaps(first: NaiveDate, last: NaiveDate, event: &Event) -> bool {
    event.start_date <= last && first <= event.end_date
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::calendar::models::EventFields;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(start: NaiveDate, end: NaiveDate) -> Event {
        Event::from_fields(1, EventFields::new("Conference", start, end, ""))
    }

    #[test]
    fn test_matches_inclusive_range() {
        let trip = event(date(2024, 6, 10), date(2024, 6, 12));

        assert!(!matches(date(2024, 6, 9), &trip));
        assert!(matches(date(2024, 6, 10), &trip));
        assert!(matches(date(2024, 6, 11), &trip));
        assert!(matches(date(2024, 6, 12), &trip));
        assert!(!matches(date(2024, 6, 13), &trip));
    }

    #[test]
    fn test_single_day_event_matches_once() {
        let dentist = event(date(2024, 7, 1), date(2024, 7, 1));
        let june = (1..=30).map(|d| date(2024, 6, d));
        let july = (1..=31).map(|d| date(2024, 7, d));

        let hits = june.chain(july).filter(|d| matches(*d, &dentist)).count();
        assert_eq!(hits, 1);
        assert!(matches(date(2024, 7, 1), &dentist));
    }

    #[test]
    fn test_matches_across_month_and_year() {
        let holiday = event(date(2024, 12, 30), date(2025, 1, 2));

        assert!(matches(date(2024, 12, 31), &holiday));
        assert!(matches(date(2025, 1, 1), &holiday));
        assert!(!matches(date(2025, 1, 3), &holiday));
    }

    #[test]
    fn test_overlaps() {
        let first = date(2024, 6, 1);
        let last = date(2024, 6, 30);

        assert!(overlaps(first, last, &event(date(2024, 5, 30), date(2024, 6, 1))));
        assert!(overlaps(first, last, &event(date(2024, 6, 30), date(2024, 7, 2))));
        assert!(overlaps(first, last, &event(date(2024, 5, 1), date(2024, 8, 1))));
        assert!(!overlaps(first, last, &event(date(2024, 5, 1), date(2024, 5, 31))));
        assert!(!overlaps(first, last, &event(date(2024, 7, 1), date(2024, 7, 1))));
    }
}
