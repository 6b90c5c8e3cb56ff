//! Year-scoped, human-readable request numbers: `LV-<year>-<seq>`,
//! zero-padded to three digits.

use chrono::{DateTime, Utc};

pub const REQUEST_PREFIX: &str = "LV";

pub fn year_prefix(year: i32) -> String {
    format!("{}-{}-", REQUEST_PREFIX, year)
}

pub fn format_request_number(year: i32, seq: u32) -> String {
    format!("{}-{}-{:03}", REQUEST_PREFIX, year, seq)
}

/// Next number after the highest existing one for the year. Returns None
/// when an existing number is present but its sequence cannot be parsed;
/// the caller falls back to a timestamp-derived number.
pub fn next_request_number(year: i32, max_existing: Option<&str>) -> Option<String> {
    let seq = match max_existing {
        None => 1,
        Some(number) => {
            let tail = number.rsplit('-').next()?;
            tail.parse::<u32>().ok()? + 1
        }
    };
    Some(format_request_number(year, seq))
}

/// Non-sequential but unique-with-overwhelming-probability fallback, used
/// when the max lookup itself fails so creation is never blocked on
/// numbering trouble.
pub fn fallback_request_number(year: i32, now: DateTime<Utc>) -> String {
    format!("{}-{}-{}", REQUEST_PREFIX, year, now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_number_of_a_year() {
        assert_eq!(
            next_request_number(2026, None).unwrap(),
            "LV-2026-001"
        );
    }

    #[test]
    fn increments_the_existing_max() {
        assert_eq!(
            next_request_number(2026, Some("LV-2026-041")).unwrap(),
            "LV-2026-042"
        );
    }

    #[test]
    fn zero_pads_to_three_digits() {
        assert_eq!(format_request_number(2026, 7), "LV-2026-007");
        assert_eq!(format_request_number(2026, 1234), "LV-2026-1234");
    }

    #[test]
    fn unparseable_existing_number_yields_none() {
        assert_eq!(next_request_number(2026, Some("LV-2026-zzz")), None);
    }

    #[test]
    fn fifty_sequential_numbers_are_distinct_and_increasing() {
        let mut last: Option<String> = None;
        let mut seen = std::collections::HashSet::new();

        for _ in 0..50 {
            let next = next_request_number(2026, last.as_deref()).unwrap();
            assert!(seen.insert(next.clone()), "duplicate number {}", next);
            if let Some(prev) = &last {
                assert!(next > *prev, "{} not above {}", next, prev);
            }
            last = Some(next);
        }

        assert_eq!(last.as_deref(), Some("LV-2026-050"));
    }

    #[test]
    fn fallback_embeds_the_year() {
        let now = Utc::now();
        let number = fallback_request_number(2026, now);
        assert!(number.starts_with("LV-2026-"));
        assert_eq!(
            number,
            format!("LV-2026-{}", now.timestamp_millis())
        );
    }
}
