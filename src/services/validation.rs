//! Ordered rule pipeline for proposed leave requests. Fail-fast: the
//! first violated rule is returned, not an aggregate.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::models::{LeaveEntitlement, LeaveRequest, LeaveStatus, LeaveType};
use crate::error::AppError;

pub const MIN_REASON_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    Reason,
    LeaveType,
    DateRange,
    ConsecutiveDays,
    Certificate,
    Balance,
    Overlap,
}

impl ValidationRule {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValidationRule::Reason => "reason",
            ValidationRule::LeaveType => "leave_type",
            ValidationRule::DateRange => "date_range",
            ValidationRule::ConsecutiveDays => "consecutive_days",
            ValidationRule::Certificate => "certificate",
            ValidationRule::Balance => "balance",
            ValidationRule::Overlap => "overlap",
        }
    }
}

impl std::fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ValidationContext<'a> {
    pub leave_type: &'a LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: f64,
    pub reason: &'a str,
    pub has_certificate: bool,
    /// Current-year ledger row; None for unpaid types or when no row exists.
    pub entitlement: Option<&'a LeaveEntitlement>,
    /// The employee's existing pending/approved requests.
    pub existing: &'a [LeaveRequest],
    /// Set when validating an edit, so the request does not overlap itself.
    pub exclude_request: Option<Uuid>,
}

fn fail(rule: ValidationRule, message: String) -> AppError {
    AppError::Validation { rule, message }
}

pub fn validate(ctx: &ValidationContext<'_>) -> Result<(), AppError> {
    if ctx.reason.trim().chars().count() < MIN_REASON_CHARS {
        return Err(fail(
            ValidationRule::Reason,
            format!("Reason must be at least {} characters", MIN_REASON_CHARS),
        ));
    }

    if !ctx.leave_type.is_active {
        return Err(fail(
            ValidationRule::LeaveType,
            format!("Leave type {} is not active", ctx.leave_type.code),
        ));
    }

    if ctx.end_date < ctx.start_date {
        return Err(fail(
            ValidationRule::DateRange,
            "End date must not be before start date".to_string(),
        ));
    }

    if let Some(cap) = ctx.leave_type.max_consecutive_days {
        if cap > 0.0 && ctx.total_days > cap {
            return Err(fail(
                ValidationRule::ConsecutiveDays,
                format!(
                    "{} allows at most {} consecutive day(s), {} requested",
                    ctx.leave_type.code, cap, ctx.total_days
                ),
            ));
        }
    }

    if ctx.leave_type.requires_certificate {
        if let Some(threshold) = ctx.leave_type.certificate_required_after_days {
            if ctx.total_days > threshold && !ctx.has_certificate {
                return Err(fail(
                    ValidationRule::Certificate,
                    format!(
                        "A certificate is required for more than {} day(s) of {}",
                        threshold, ctx.leave_type.code
                    ),
                ));
            }
        }
    }

    // Unpaid leave types are exempt from balance checks entirely.
    if ctx.leave_type.is_paid {
        match ctx.entitlement {
            None => {
                return Err(fail(
                    ValidationRule::Balance,
                    format!(
                        "No leave entitlement recorded for {} this year",
                        ctx.leave_type.code
                    ),
                ));
            }
            Some(entitlement) if entitlement.remaining < ctx.total_days => {
                return Err(fail(
                    ValidationRule::Balance,
                    format!(
                        "Insufficient balance: {} day(s) requested, {} remaining",
                        ctx.total_days, entitlement.remaining
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    let overlapping = ctx.existing.iter().find(|existing| {
        matches!(
            existing.status,
            LeaveStatus::Pending | LeaveStatus::Approved
        ) && ctx.exclude_request != Some(existing.id)
            && ctx.start_date <= existing.end_date
            && ctx.end_date >= existing.start_date
    });
    if let Some(existing) = overlapping {
        return Err(fail(
            ValidationRule::Overlap,
            format!(
                "Dates overlap existing request {} ({} to {})",
                existing.request_number, existing.start_date, existing.end_date
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{AccrualType, LeaveEntitlement};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use sqlx::types::Json;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    fn leave_type() -> LeaveType {
        LeaveType {
            id: Uuid::new_v4(),
            code: "ANNUAL".to_string(),
            name: "Annual Leave".to_string(),
            is_active: true,
            is_paid: true,
            max_consecutive_days: None,
            requires_certificate: false,
            certificate_required_after_days: None,
            default_entitlement: 10.0,
            accrual_type: AccrualType::Fixed,
            carry_over_allowed: true,
            max_carry_over_days: 5.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entitlement(remaining: f64) -> LeaveEntitlement {
        LeaveEntitlement::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            2026,
            remaining,
            0.0,
            false,
            None,
            Utc::now(),
        )
    }

    fn existing_request(start: NaiveDate, end: NaiveDate, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: Uuid::new_v4(),
            request_number: "LV-2026-001".to_string(),
            employee_id: Uuid::new_v4(),
            employee_name: "Jordan Reyes".to_string(),
            employee_code: "E-100".to_string(),
            department: "Engineering".to_string(),
            position: "Engineer".to_string(),
            leave_type_id: Uuid::new_v4(),
            leave_type_code: "ANNUAL".to_string(),
            leave_type_name: "Annual Leave".to_string(),
            start_date: start,
            end_date: end,
            half_day: false,
            half_day_period: None,
            total_days: 1.0,
            reason: "Family travel arrangements".to_string(),
            handover_to: None,
            handover_notes: None,
            contact_during_leave: None,
            has_certificate: false,
            certificate_url: None,
            status,
            submitted_at: Some(Utc::now()),
            approval_chain: Json(vec![]),
            current_approval_level: 1,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ctx<'a>(
        leave_type: &'a LeaveType,
        entitlement: Option<&'a LeaveEntitlement>,
        existing: &'a [LeaveRequest],
    ) -> ValidationContext<'a> {
        ValidationContext {
            leave_type,
            start_date: d(1),
            end_date: d(3),
            total_days: 3.0,
            reason: "Planned family vacation",
            has_certificate: false,
            entitlement,
            existing,
            exclude_request: None,
        }
    }

    fn rule_of(err: AppError) -> ValidationRule {
        match err {
            AppError::Validation { rule, .. } => rule,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn valid_request_passes() {
        let lt = leave_type();
        let ent = entitlement(10.0);
        assert!(validate(&ctx(&lt, Some(&ent), &[])).is_ok());
    }

    #[test]
    fn short_reason_is_rejected_first() {
        let mut lt = leave_type();
        lt.is_active = false; // later rule would also fail
        let ent = entitlement(10.0);
        let mut c = ctx(&lt, Some(&ent), &[]);
        c.reason = "short";

        assert_eq!(rule_of(validate(&c).unwrap_err()), ValidationRule::Reason);
    }

    #[test]
    fn inactive_leave_type_is_rejected() {
        let mut lt = leave_type();
        lt.is_active = false;
        let ent = entitlement(10.0);

        assert_eq!(
            rule_of(validate(&ctx(&lt, Some(&ent), &[])).unwrap_err()),
            ValidationRule::LeaveType
        );
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let lt = leave_type();
        let ent = entitlement(10.0);
        let mut c = ctx(&lt, Some(&ent), &[]);
        c.start_date = d(5);
        c.end_date = d(1);

        assert_eq!(rule_of(validate(&c).unwrap_err()), ValidationRule::DateRange);
    }

    #[test]
    fn consecutive_day_cap_applies() {
        let mut lt = leave_type();
        lt.max_consecutive_days = Some(2.0);
        let ent = entitlement(10.0);

        assert_eq!(
            rule_of(validate(&ctx(&lt, Some(&ent), &[])).unwrap_err()),
            ValidationRule::ConsecutiveDays
        );
    }

    #[test]
    fn certificate_gate_blocks_without_and_passes_with() {
        let mut lt = leave_type();
        lt.requires_certificate = true;
        lt.certificate_required_after_days = Some(2.0);
        let ent = entitlement(10.0);

        let c = ctx(&lt, Some(&ent), &[]);
        assert_eq!(rule_of(validate(&c).unwrap_err()), ValidationRule::Certificate);

        let mut with_cert = ctx(&lt, Some(&ent), &[]);
        with_cert.has_certificate = true;
        assert!(validate(&with_cert).is_ok());
    }

    #[test]
    fn insufficient_balance_is_rejected() {
        let lt = leave_type();
        let ent = entitlement(1.0);

        assert_eq!(
            rule_of(validate(&ctx(&lt, Some(&ent), &[])).unwrap_err()),
            ValidationRule::Balance
        );
    }

    #[test]
    fn missing_ledger_row_fails_the_balance_rule() {
        let lt = leave_type();

        assert_eq!(
            rule_of(validate(&ctx(&lt, None, &[])).unwrap_err()),
            ValidationRule::Balance
        );
    }

    #[test]
    fn unpaid_types_skip_the_balance_rule() {
        let mut lt = leave_type();
        lt.is_paid = false;

        assert!(validate(&ctx(&lt, None, &[])).is_ok());
    }

    #[test]
    fn overlapping_request_is_rejected() {
        let lt = leave_type();
        let ent = entitlement(10.0);
        let existing = vec![existing_request(d(10), d(15), LeaveStatus::Pending)];

        let mut c = ctx(&lt, Some(&ent), &existing);
        c.start_date = d(12);
        c.end_date = d(13);
        assert_eq!(rule_of(validate(&c).unwrap_err()), ValidationRule::Overlap);
    }

    #[test]
    fn adjacent_request_is_allowed() {
        let lt = leave_type();
        let ent = entitlement(10.0);
        let existing = vec![existing_request(d(10), d(15), LeaveStatus::Pending)];

        let mut c = ctx(&lt, Some(&ent), &existing);
        c.start_date = d(16);
        c.end_date = d(20);
        assert!(validate(&c).is_ok());
    }

    #[test]
    fn edit_does_not_overlap_itself() {
        let lt = leave_type();
        let ent = entitlement(10.0);
        let own = existing_request(d(1), d(3), LeaveStatus::Pending);
        let own_id = own.id;
        let existing = vec![own];

        let mut c = ctx(&lt, Some(&ent), &existing);
        c.exclude_request = Some(own_id);
        assert!(validate(&c).is_ok());
    }

    #[test]
    fn terminal_requests_do_not_block_new_dates() {
        let lt = leave_type();
        let ent = entitlement(10.0);
        let existing = vec![
            existing_request(d(1), d(3), LeaveStatus::Rejected),
            existing_request(d(1), d(3), LeaveStatus::Cancelled),
        ];

        assert!(validate(&ctx(&lt, Some(&ent), &existing)).is_ok());
    }
}
