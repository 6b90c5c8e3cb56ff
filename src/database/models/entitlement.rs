use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

/// One ledger row per (employee, leave type, year).
///
/// Invariant held after every mutation:
/// `remaining = total_entitlement - used - pending`, with all three
/// counters non-negative.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveEntitlement {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub year: i32,
    pub accrued: f64,
    pub carried_over: f64,
    pub total_entitlement: f64,
    pub used: f64,
    pub pending: f64,
    pub remaining: f64,
    pub based_on_tenure: bool,
    pub tenure_years: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveEntitlement {
    pub fn new(
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
        accrued: f64,
        carried_over: f64,
        based_on_tenure: bool,
        tenure_years: Option<i32>,
        now: DateTime<Utc>,
    ) -> Self {
        let total = accrued + carried_over;
        Self {
            id: Uuid::new_v4(),
            employee_id,
            leave_type_id,
            year,
            accrued,
            carried_over,
            total_entitlement: total,
            used: 0.0,
            pending: 0.0,
            remaining: total,
            based_on_tenure,
            tenure_years,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move `days` from `remaining` into `pending` at request creation.
    ///
    /// Re-asserts the balance even though the validator checks it first: a
    /// concurrent reservation may have consumed the balance between the
    /// validator's read and this row being locked.
    pub fn reserve(&mut self, days: f64) -> Result<(), AppError> {
        if self.remaining < days {
            return Err(AppError::InsufficientBalance {
                requested: days,
                remaining: self.remaining,
            });
        }
        self.pending += days;
        self.recompute_remaining();
        Ok(())
    }

    /// Move `days` from `pending` into `used` when the final approval
    /// level completes.
    pub fn commit_used(&mut self, days: f64) {
        self.take_pending(days);
        self.used += days;
        self.recompute_remaining();
    }

    /// Return `days` from `pending` to `remaining` on rejection or on
    /// cancellation of a still-pending request.
    pub fn release(&mut self, days: f64) {
        self.take_pending(days);
        self.recompute_remaining();
    }

    /// Return `days` from `used` to `remaining` on cancellation of an
    /// already-approved request.
    pub fn return_from_used(&mut self, days: f64) {
        if self.used < days {
            log::warn!(
                "Ledger inconsistency: returning {} day(s) with only {} used \
                 (employee {}, leave type {}, year {})",
                days,
                self.used,
                self.employee_id,
                self.leave_type_id,
                self.year
            );
        }
        self.used = (self.used - days).max(0.0);
        self.recompute_remaining();
    }

    fn take_pending(&mut self, days: f64) {
        if self.pending < days {
            log::warn!(
                "Ledger inconsistency: draining {} day(s) with only {} pending \
                 (employee {}, leave type {}, year {})",
                days,
                self.pending,
                self.employee_id,
                self.leave_type_id,
                self.year
            );
        }
        self.pending = (self.pending - days).max(0.0);
    }

    fn recompute_remaining(&mut self) {
        self.remaining = (self.total_entitlement - self.used - self.pending).max(0.0);
    }

    /// Apply a carry-over amount received from the previous year's row.
    pub fn apply_carry_over(&mut self, days: f64) {
        self.carried_over = days;
        self.total_entitlement = self.accrued + self.carried_over;
        self.recompute_remaining();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ledger(total: f64) -> LeaveEntitlement {
        LeaveEntitlement::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            2026,
            total,
            0.0,
            false,
            None,
            Utc::now(),
        )
    }

    fn assert_invariant(e: &LeaveEntitlement) {
        assert_eq!(e.remaining, e.total_entitlement - e.used - e.pending);
        assert!(e.used >= 0.0);
        assert!(e.pending >= 0.0);
        assert!(e.remaining >= 0.0);
    }

    #[test]
    fn reserve_moves_days_into_pending() {
        let mut e = ledger(10.0);
        e.reserve(3.0).unwrap();

        assert_eq!(e.pending, 3.0);
        assert_eq!(e.remaining, 7.0);
        assert_eq!(e.used, 0.0);
        assert_invariant(&e);
    }

    #[test]
    fn reserve_fails_when_balance_is_short() {
        let mut e = ledger(1.0);
        let err = e.reserve(2.0).unwrap_err();

        match err {
            AppError::InsufficientBalance {
                requested,
                remaining,
            } => {
                assert_eq!(requested, 2.0);
                assert_eq!(remaining, 1.0);
            }
            other => panic!("expected InsufficientBalance, got {:?}", other),
        }
        // No mutation happened
        assert_eq!(e.pending, 0.0);
        assert_eq!(e.remaining, 1.0);
    }

    #[test]
    fn sequential_reserves_cannot_overdraw() {
        let mut e = ledger(5.0);
        assert!(e.reserve(3.0).is_ok());
        assert!(e.reserve(3.0).is_err());

        assert_eq!(e.pending, 3.0);
        assert_invariant(&e);
    }

    #[test]
    fn commit_moves_pending_into_used() {
        let mut e = ledger(10.0);
        e.reserve(3.0).unwrap();
        e.commit_used(3.0);

        assert_eq!(e.used, 3.0);
        assert_eq!(e.pending, 0.0);
        assert_eq!(e.remaining, 7.0);
        assert_invariant(&e);
    }

    #[test]
    fn release_restores_remaining() {
        let mut e = ledger(10.0);
        e.reserve(2.0).unwrap();
        e.release(2.0);

        assert_eq!(e.pending, 0.0);
        assert_eq!(e.remaining, 10.0);
        assert_invariant(&e);
    }

    #[test]
    fn cancellation_after_approval_is_a_net_zero() {
        let mut e = ledger(10.0);
        e.reserve(3.0).unwrap();
        e.commit_used(3.0);
        e.return_from_used(3.0);

        assert_eq!(e.used, 0.0);
        assert_eq!(e.pending, 0.0);
        assert_eq!(e.remaining, 10.0);
        assert_invariant(&e);
    }

    #[test]
    fn half_day_amounts_stay_exact() {
        let mut e = ledger(2.0);
        e.reserve(0.5).unwrap();
        e.commit_used(0.5);

        assert_eq!(e.used, 0.5);
        assert_eq!(e.remaining, 1.5);
        assert_invariant(&e);
    }

    #[test]
    fn overdrawn_release_clamps_to_zero() {
        let mut e = ledger(10.0);
        e.reserve(1.0).unwrap();
        e.release(5.0);

        assert_eq!(e.pending, 0.0);
        assert_eq!(e.remaining, 10.0);
        assert_invariant(&e);
    }

    #[test]
    fn overdrawn_return_clamps_to_zero() {
        let mut e = ledger(10.0);
        e.return_from_used(4.0);

        assert_eq!(e.used, 0.0);
        assert_eq!(e.remaining, 10.0);
        assert_invariant(&e);
    }

    #[test]
    fn carry_over_extends_total() {
        let mut e = ledger(10.0);
        e.reserve(4.0).unwrap();
        e.apply_carry_over(5.0);

        assert_eq!(e.total_entitlement, 15.0);
        assert_eq!(e.remaining, 11.0);
        assert_invariant(&e);
    }
}
