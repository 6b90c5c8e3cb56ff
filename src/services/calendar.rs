use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Working-day arithmetic. Weekends are always excluded; an optional
/// holiday list excludes further dates. Pure, no side effects.
#[derive(Debug, Clone, Default)]
pub struct BusinessCalendar {
    holidays: Vec<NaiveDate>,
}

impl BusinessCalendar {
    pub fn new(holidays: Vec<NaiveDate>) -> Self {
        Self { holidays }
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    /// Count business days from `start` to `end` inclusive.
    ///
    /// A half-day request always counts 0.5 regardless of the range, and a
    /// reversed range counts 0 — rejecting that range is the validator's
    /// job, not this function's.
    pub fn business_days(&self, start: NaiveDate, end: NaiveDate, half_day: bool) -> f64 {
        if half_day {
            return 0.5;
        }
        if end < start {
            return 0.0;
        }

        let mut count = 0.0;
        let mut day = start;
        while day <= end {
            if self.is_business_day(day) {
                count += 1.0;
            }
            // Day increments within NaiveDate range cannot overflow here.
            day = match day.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn counts_weekdays_only() {
        let cal = BusinessCalendar::default();
        // Mon 2026-03-02 .. Fri 2026-03-06
        assert_eq!(cal.business_days(d(2026, 3, 2), d(2026, 3, 6), false), 5.0);
    }

    #[test]
    fn skips_weekends_inside_the_range() {
        let cal = BusinessCalendar::default();
        // Mon 2026-03-02 .. Mon 2026-03-09 spans one weekend
        assert_eq!(cal.business_days(d(2026, 3, 2), d(2026, 3, 9), false), 6.0);
    }

    #[test]
    fn weekend_only_range_counts_zero() {
        let cal = BusinessCalendar::default();
        // Sat .. Sun
        assert_eq!(cal.business_days(d(2026, 3, 7), d(2026, 3, 8), false), 0.0);
    }

    #[test]
    fn single_day_counts_one() {
        let cal = BusinessCalendar::default();
        assert_eq!(cal.business_days(d(2026, 3, 4), d(2026, 3, 4), false), 1.0);
    }

    #[test]
    fn half_day_is_half_regardless_of_range() {
        let cal = BusinessCalendar::default();
        assert_eq!(cal.business_days(d(2026, 3, 2), d(2026, 3, 6), true), 0.5);
    }

    #[test]
    fn reversed_range_counts_zero() {
        let cal = BusinessCalendar::default();
        assert_eq!(cal.business_days(d(2026, 3, 6), d(2026, 3, 2), false), 0.0);
    }

    #[test]
    fn holidays_are_excluded() {
        let cal = BusinessCalendar::new(vec![d(2026, 3, 4)]);
        assert_eq!(cal.business_days(d(2026, 3, 2), d(2026, 3, 6), false), 4.0);
    }
}
