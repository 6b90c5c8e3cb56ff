//! Entitlement accrual math: tenure-tiered annual grants, pro-rata
//! first-year scaling and carry-over capping. Pure and deterministic.

use chrono::{Datelike, NaiveDate};

/// Annual grant per completed-years-of-service tier: the grant of the
/// first tier whose bound exceeds the tenure. Company policy, not law;
/// swap the table to change it.
pub const DEFAULT_TENURE_TIERS: &[(u32, f64)] = &[
    (1, 6.0),
    (2, 8.0),
    (3, 10.0),
    (5, 12.0),
    (10, 15.0),
];

/// Grant once every tier bound is passed.
pub const DEFAULT_TENURE_CAP_DAYS: f64 = 20.0;

pub fn entitlement_for_tenure(tiers: &[(u32, f64)], cap: f64, tenure_years: u32) -> f64 {
    for &(bound, days) in tiers {
        if tenure_years < bound {
            return days;
        }
    }
    cap
}

pub fn default_entitlement(tenure_years: u32) -> f64 {
    entitlement_for_tenure(DEFAULT_TENURE_TIERS, DEFAULT_TENURE_CAP_DAYS, tenure_years)
}

/// Completed years of service, anniversary-based: a year counts only once
/// the full calendar anniversary has been reached or passed.
pub fn tenure_years(hire_date: NaiveDate, as_of: NaiveDate) -> u32 {
    if as_of < hire_date {
        return 0;
    }

    let mut years = as_of.year() - hire_date.year();
    let anniversary_reached = (as_of.month(), as_of.day()) >= (hire_date.month(), hire_date.day());
    if !anniversary_reached {
        years -= 1;
    }
    u32::try_from(years.max(0)).unwrap_or(0)
}

/// Scale an annual grant by the months actually employed in `year`,
/// floored to a whole number. Applies only to the hire year; any other
/// year gets the full grant.
pub fn pro_rata(hire_date: NaiveDate, annual_entitlement: f64, year: i32) -> f64 {
    if hire_date.year() != year {
        return annual_entitlement;
    }

    let months_employed = f64::from(12 - hire_date.month() + 1);
    (annual_entitlement * months_employed / 12.0).floor()
}

/// Carry-over into the next year: what is left, bounded by the leave
/// type's cap, never negative.
pub fn capped_carry_over(remaining: f64, max_carry_over_days: f64) -> f64 {
    remaining.min(max_carry_over_days).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn tier_table_boundaries() {
        assert_eq!(default_entitlement(0), 6.0);
        assert_eq!(default_entitlement(1), 8.0);
        assert_eq!(default_entitlement(2), 10.0);
        assert_eq!(default_entitlement(3), 12.0);
        assert_eq!(default_entitlement(4), 12.0);
        assert_eq!(default_entitlement(5), 15.0);
        assert_eq!(default_entitlement(9), 15.0);
        assert_eq!(default_entitlement(10), 20.0);
        assert_eq!(default_entitlement(25), 20.0);
    }

    #[test]
    fn tenure_counts_full_anniversaries_only() {
        let hire = d(2020, 3, 15);
        assert_eq!(tenure_years(hire, d(2020, 3, 15)), 0);
        assert_eq!(tenure_years(hire, d(2021, 3, 14)), 0);
        assert_eq!(tenure_years(hire, d(2021, 3, 15)), 1);
        assert_eq!(tenure_years(hire, d(2026, 1, 1)), 5);
    }

    #[test]
    fn tenure_before_hire_is_zero() {
        assert_eq!(tenure_years(d(2026, 1, 1), d(2020, 1, 1)), 0);
    }

    #[test]
    fn pro_rata_scales_the_hire_year() {
        // Hired in July: 6 of 12 months
        assert_eq!(pro_rata(d(2026, 7, 1), 12.0, 2026), 6.0);
        // Hired in October: 3 of 12 months, floored
        assert_eq!(pro_rata(d(2026, 10, 20), 10.0, 2026), 2.0);
    }

    #[test]
    fn pro_rata_leaves_other_years_alone() {
        assert_eq!(pro_rata(d(2020, 7, 1), 12.0, 2026), 12.0);
    }

    #[test]
    fn pro_rata_january_hire_keeps_the_full_grant() {
        assert_eq!(pro_rata(d(2026, 1, 1), 12.0, 2026), 12.0);
    }

    #[test]
    fn carry_over_is_capped() {
        assert_eq!(capped_carry_over(8.0, 5.0), 5.0);
        assert_eq!(capped_carry_over(3.0, 5.0), 3.0);
        assert_eq!(capped_carry_over(0.0, 5.0), 0.0);
    }
}
