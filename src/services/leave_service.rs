use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{
    ApprovalStep, CreatedLeaveRequest, Employee, LeaveEntitlement, LeaveRequest,
    LeaveRequestInput, LeaveRequestUpdate, LeaveStatus, LeaveType,
};
use crate::database::repositories::{
    EmployeeRepository, EntitlementRepository, LeaveRequestRepository, LeaveTypeRepository,
};
use crate::error::AppError;
use crate::services::calendar::BusinessCalendar;
use crate::services::validation::{self, ValidationContext, ValidationRule};
use crate::services::workflow::{self, ApprovalOutcome, CancelOutcome};
use crate::services::{accrual, numbering};

/// Leave-year boundary. Calendar years for now; fiscal-year tenants would
/// parameterize this.
fn leave_year(date: NaiveDate) -> i32 {
    date.year()
}

/// Orchestrates the leave-request lifecycle: validation, the approval
/// state machine, the entitlement ledger and request numbering, each
/// lifecycle operation one transaction.
#[derive(Clone)]
pub struct LeaveService {
    pool: PgPool,
    employees: EmployeeRepository,
    leave_types: LeaveTypeRepository,
    requests: LeaveRequestRepository,
    entitlements: EntitlementRepository,
    calendar: BusinessCalendar,
}

impl LeaveService {
    pub fn new(
        pool: PgPool,
        employees: EmployeeRepository,
        leave_types: LeaveTypeRepository,
        requests: LeaveRequestRepository,
        entitlements: EntitlementRepository,
        calendar: BusinessCalendar,
    ) -> Self {
        Self {
            pool,
            employees,
            leave_types,
            requests,
            entitlements,
            calendar,
        }
    }

    /// Validate and persist a new request. Non-draft requests land in
    /// `pending` with an approval chain and a ledger reservation; drafts
    /// skip both until submit. Nothing is written when validation fails.
    pub async fn create_request(
        &self,
        input: LeaveRequestInput,
    ) -> Result<CreatedLeaveRequest, AppError> {
        let employee = self
            .employees
            .get_by_id(input.employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {}", input.employee_id)))?;
        let leave_type = self.lookup_leave_type(input.leave_type_id).await?;

        let total_days =
            self.calendar
                .business_days(input.start_date, input.end_date, input.half_day);
        let year = leave_year(input.start_date);

        let entitlement = if leave_type.is_paid {
            self.entitlements
                .get(input.employee_id, input.leave_type_id, year)
                .await?
        } else {
            None
        };
        let existing = self
            .requests
            .find_active_for_employee(input.employee_id)
            .await?;

        validation::validate(&ValidationContext {
            leave_type: &leave_type,
            start_date: input.start_date,
            end_date: input.end_date,
            total_days,
            reason: &input.reason,
            has_certificate: input.has_certificate,
            entitlement: entitlement.as_ref(),
            existing: &existing,
            exclude_request: None,
        })?;

        let now = Utc::now();
        let chain = if input.save_as_draft {
            Vec::new()
        } else {
            self.resolve_approval_chain(&employee).await?
        };

        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let request_number = self.allocate_request_number(&mut tx, year, now).await;

        let request = LeaveRequest {
            id: Uuid::new_v4(),
            request_number: request_number.clone(),
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            employee_code: employee.code.clone(),
            department: employee.department.clone(),
            position: employee.position.clone(),
            leave_type_id: leave_type.id,
            leave_type_code: leave_type.code.clone(),
            leave_type_name: leave_type.name.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            half_day: input.half_day,
            half_day_period: input.half_day_period,
            total_days,
            reason: input.reason,
            handover_to: input.handover_to,
            handover_notes: input.handover_notes,
            contact_during_leave: input.contact_during_leave,
            has_certificate: input.has_certificate,
            certificate_url: input.certificate_url,
            status: if input.save_as_draft {
                LeaveStatus::Draft
            } else {
                LeaveStatus::Pending
            },
            submitted_at: (!input.save_as_draft).then_some(now),
            approval_chain: Json(chain),
            current_approval_level: 1,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        self.requests.insert(&mut tx, &request).await?;

        if !input.save_as_draft && leave_type.is_paid {
            self.reserve_in_tx(&mut tx, employee.id, leave_type.id, year, total_days)
                .await?;
        }

        tx.commit().await.map_err(AppError::from)?;

        Ok(CreatedLeaveRequest {
            id: request.id,
            request_number,
        })
    }

    /// Replace the editable fields of a draft. `total_days` is always
    /// recomputed from the new dates, never taken from the caller.
    pub async fn update_request(
        &self,
        id: Uuid,
        patch: LeaveRequestUpdate,
    ) -> Result<LeaveRequest, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let mut request = self
            .requests
            .get_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {}", id)))?;

        if request.status != LeaveStatus::Draft {
            return Err(AppError::InvalidTransition(format!(
                "Request {} is {}, only drafts can be edited",
                request.request_number, request.status
            )));
        }

        request.start_date = patch.start_date;
        request.end_date = patch.end_date;
        request.half_day = patch.half_day;
        request.half_day_period = patch.half_day_period;
        request.total_days =
            self.calendar
                .business_days(patch.start_date, patch.end_date, patch.half_day);
        request.reason = patch.reason;
        request.handover_to = patch.handover_to;
        request.handover_notes = patch.handover_notes;
        request.contact_during_leave = patch.contact_during_leave;
        request.has_certificate = patch.has_certificate;
        request.certificate_url = patch.certificate_url;
        request.updated_at = Utc::now();

        self.requests.persist(&mut tx, &request).await?;
        tx.commit().await.map_err(AppError::from)?;

        Ok(request)
    }

    /// Submit a draft: re-validate, refresh the employee snapshot, build
    /// the approval chain and reserve the balance.
    pub async fn submit_request(&self, id: Uuid) -> Result<(), AppError> {
        let current = self
            .requests
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {}", id)))?;

        let employee = self
            .employees
            .get_by_id(current.employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {}", current.employee_id)))?;
        let leave_type = self.lookup_leave_type(current.leave_type_id).await?;

        let total_days =
            self.calendar
                .business_days(current.start_date, current.end_date, current.half_day);
        let year = leave_year(current.start_date);

        let entitlement = if leave_type.is_paid {
            self.entitlements
                .get(current.employee_id, current.leave_type_id, year)
                .await?
        } else {
            None
        };
        let existing = self
            .requests
            .find_active_for_employee(current.employee_id)
            .await?;

        validation::validate(&ValidationContext {
            leave_type: &leave_type,
            start_date: current.start_date,
            end_date: current.end_date,
            total_days,
            reason: &current.reason,
            has_certificate: current.has_certificate,
            entitlement: entitlement.as_ref(),
            existing: &existing,
            exclude_request: Some(id),
        })?;

        let chain = self.resolve_approval_chain(&employee).await?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let mut request = self
            .requests
            .get_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {}", id)))?;

        // Snapshot display fields at submission time.
        request.employee_name = employee.name.clone();
        request.employee_code = employee.code.clone();
        request.department = employee.department.clone();
        request.position = employee.position.clone();
        request.total_days = total_days;

        workflow::submit(&mut request, chain, now)?;
        self.requests.persist(&mut tx, &request).await?;

        if leave_type.is_paid {
            self.reserve_in_tx(&mut tx, request.employee_id, request.leave_type_id, year, total_days)
                .await?;
        }

        tx.commit().await.map_err(AppError::from)?;
        Ok(())
    }

    /// Approve the current chain step. On the final level the request is
    /// closed and the reserved days are committed to `used`.
    pub async fn approve_request(
        &self,
        id: Uuid,
        approver_id: Uuid,
        comments: Option<String>,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let mut request = self
            .requests
            .get_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {}", id)))?;

        let outcome = workflow::approve_step(&mut request, approver_id, comments, now)?;
        self.requests.persist(&mut tx, &request).await?;

        if outcome == ApprovalOutcome::FinalApproved && self.is_paid(&request).await? {
            let year = leave_year(request.start_date);
            let mut entitlement = self
                .entitlement_for_update(&mut tx, &request, year)
                .await?;
            entitlement.commit_used(request.total_days);
            entitlement.updated_at = now;
            self.entitlements.update_counters(&mut tx, &entitlement).await?;
        }

        tx.commit().await.map_err(AppError::from)?;
        Ok(())
    }

    /// Reject at the current chain step and release the reservation.
    pub async fn reject_request(
        &self,
        id: Uuid,
        approver_id: Uuid,
        reason: String,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let mut request = self
            .requests
            .get_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {}", id)))?;

        workflow::reject(&mut request, approver_id, reason, now)?;
        self.requests.persist(&mut tx, &request).await?;

        if self.is_paid(&request).await? {
            let year = leave_year(request.start_date);
            let mut entitlement = self
                .entitlement_for_update(&mut tx, &request, year)
                .await?;
            entitlement.release(request.total_days);
            entitlement.updated_at = now;
            self.entitlements.update_counters(&mut tx, &entitlement).await?;
        }

        tx.commit().await.map_err(AppError::from)?;
        Ok(())
    }

    /// Cancel a pending or approved request on behalf of its owner.
    pub async fn cancel_request(
        &self,
        id: Uuid,
        employee_id: Uuid,
        reason: String,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let mut request = self
            .requests
            .get_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {}", id)))?;

        let outcome = workflow::cancel(&mut request, employee_id, reason, now)?;
        self.requests.persist(&mut tx, &request).await?;

        if self.is_paid(&request).await? {
            let year = leave_year(request.start_date);
            let mut entitlement = self
                .entitlement_for_update(&mut tx, &request, year)
                .await?;
            match outcome {
                CancelOutcome::ReleasePending => entitlement.release(request.total_days),
                CancelOutcome::ReturnUsed => entitlement.return_from_used(request.total_days),
            }
            entitlement.updated_at = now;
            self.entitlements.update_counters(&mut tx, &entitlement).await?;
        }

        tx.commit().await.map_err(AppError::from)?;
        Ok(())
    }

    /// Delete a draft. Nothing was reserved, so the ledger is untouched.
    pub async fn delete_request(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let request = self
            .requests
            .get_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {}", id)))?;

        if request.status != LeaveStatus::Draft {
            return Err(AppError::InvalidTransition(format!(
                "Request {} is {}, only drafts can be deleted",
                request.request_number, request.status
            )));
        }

        self.requests.delete(&mut tx, id).await?;
        tx.commit().await.map_err(AppError::from)?;
        Ok(())
    }

    pub async fn get_request(&self, id: Uuid) -> Result<LeaveRequest, AppError> {
        self.requests
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave request {}", id)))
    }

    pub async fn list_requests(
        &self,
        employee_id: Option<Uuid>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        Ok(self.requests.list(employee_id, status).await?)
    }

    pub async fn list_entitlements(
        &self,
        employee_id: Uuid,
        year: Option<i32>,
    ) -> Result<Vec<LeaveEntitlement>, AppError> {
        Ok(self
            .entitlements
            .list_for_employee(employee_id, year)
            .await?)
    }

    /// Create the (employee, leave type, year) ledger row if it does not
    /// exist: the registry default or the tenure-tier grant, pro-rated in
    /// the hire year. Idempotent.
    pub async fn ensure_entitlement(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
    ) -> Result<LeaveEntitlement, AppError> {
        let employee = self
            .employees
            .get_by_id(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {}", employee_id)))?;
        let leave_type = self.lookup_leave_type(leave_type_id).await?;

        let (accrued, based_on_tenure, tenure) =
            grant_for_year(&employee, &leave_type, year)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        if let Some(existing) = self
            .entitlements
            .get_for_update(&mut tx, employee_id, leave_type_id, year)
            .await?
        {
            tx.commit().await.map_err(AppError::from)?;
            return Ok(existing);
        }

        let entitlement = LeaveEntitlement::new(
            employee_id,
            leave_type_id,
            year,
            accrued,
            0.0,
            based_on_tenure,
            tenure,
            now,
        );
        self.entitlements.insert(&mut tx, &entitlement).await?;
        tx.commit().await.map_err(AppError::from)?;

        Ok(entitlement)
    }

    /// Year-end carry-over for one (employee, leave type) pair:
    /// `min(remaining, cap)` becomes next year's `carried_over`, creating
    /// the next-year row if absent. Idempotent per pair.
    pub async fn carry_over(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        from_year: i32,
    ) -> Result<LeaveEntitlement, AppError> {
        let leave_type = self.lookup_leave_type(leave_type_id).await?;
        if !leave_type.carry_over_allowed {
            return Err(AppError::Validation {
                rule: ValidationRule::LeaveType,
                message: format!("Leave type {} does not allow carry-over", leave_type.code),
            });
        }

        let employee = self
            .employees
            .get_by_id(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {}", employee_id)))?;

        let now = Utc::now();
        let to_year = from_year + 1;
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let from_row = self
            .entitlements
            .get_for_update(&mut tx, employee_id, leave_type_id, from_year)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Leave entitlement for {} in {}",
                    employee_id, from_year
                ))
            })?;

        let amount =
            accrual::capped_carry_over(from_row.remaining, leave_type.max_carry_over_days);

        let next = match self
            .entitlements
            .get_for_update(&mut tx, employee_id, leave_type_id, to_year)
            .await?
        {
            Some(mut next) => {
                next.apply_carry_over(amount);
                next.updated_at = now;
                self.entitlements.update_counters(&mut tx, &next).await?;
                next
            }
            None => {
                let (accrued, based_on_tenure, tenure) =
                    grant_for_year(&employee, &leave_type, to_year)?;
                let mut next = LeaveEntitlement::new(
                    employee_id,
                    leave_type_id,
                    to_year,
                    accrued,
                    0.0,
                    based_on_tenure,
                    tenure,
                    now,
                );
                next.apply_carry_over(amount);
                self.entitlements.insert(&mut tx, &next).await?;
                next
            }
        };

        tx.commit().await.map_err(AppError::from)?;
        Ok(next)
    }

    async fn lookup_leave_type(&self, id: Uuid) -> Result<LeaveType, AppError> {
        self.leave_types
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Validation {
                rule: ValidationRule::LeaveType,
                message: format!("Unknown leave type {}", id),
            })
    }

    async fn is_paid(&self, request: &LeaveRequest) -> Result<bool, AppError> {
        let leave_type = self
            .leave_types
            .get_by_id(request.leave_type_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Leave type {} referenced by request {} is missing",
                    request.leave_type_id, request.request_number
                ))
            })?;
        Ok(leave_type.is_paid)
    }

    async fn resolve_approval_chain(
        &self,
        employee: &Employee,
    ) -> Result<Vec<ApprovalStep>, AppError> {
        let manager = match employee.manager_id {
            Some(manager_id) => self.employees.get_by_id(manager_id).await?,
            None => None,
        };
        let hr = self.employees.find_hr_approver().await?;

        let chain = workflow::build_approval_chain(manager.as_ref(), hr.as_ref());
        if chain.is_empty() {
            return Err(AppError::internal(format!(
                "No approvers available for employee {}",
                employee.code
            )));
        }
        Ok(chain)
    }

    /// Sequential number for the year, or a timestamp-derived fallback so
    /// creation is never blocked by numbering trouble alone.
    async fn allocate_request_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        year: i32,
        now: DateTime<Utc>,
    ) -> String {
        match self
            .requests
            .max_request_number(tx, &numbering::year_prefix(year))
            .await
        {
            Ok(max) => numbering::next_request_number(year, max.as_deref()).unwrap_or_else(|| {
                log::warn!(
                    "Existing request number for {} is unparseable, using fallback",
                    year
                );
                numbering::fallback_request_number(year, now)
            }),
            Err(err) => {
                log::warn!("Request number lookup failed ({}), using fallback", err);
                numbering::fallback_request_number(year, now)
            }
        }
    }

    async fn reserve_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
        days: f64,
    ) -> Result<(), AppError> {
        let mut entitlement = self
            .entitlements
            .get_for_update(tx, employee_id, leave_type_id, year)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Leave entitlement for {} in {}",
                    employee_id, year
                ))
            })?;

        entitlement.reserve(days)?;
        entitlement.updated_at = Utc::now();
        self.entitlements.update_counters(tx, &entitlement).await?;
        Ok(())
    }

    async fn entitlement_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &LeaveRequest,
        year: i32,
    ) -> Result<LeaveEntitlement, AppError> {
        self.entitlements
            .get_for_update(tx, request.employee_id, request.leave_type_id, year)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Leave entitlement for {} in {}",
                    request.employee_id, year
                ))
            })
    }
}

/// Annual grant for an employee and year: the tenure tier table when the
/// type accrues by tenure, the registry default otherwise, pro-rated in
/// the hire year.
fn grant_for_year(
    employee: &Employee,
    leave_type: &LeaveType,
    year: i32,
) -> Result<(f64, bool, Option<i32>), AppError> {
    use crate::database::models::AccrualType;

    let year_start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| AppError::internal(format!("Invalid year {}", year)))?;
    let tenure = accrual::tenure_years(employee.hire_date, year_start);

    let (annual, based_on_tenure) = match leave_type.accrual_type {
        AccrualType::Tenure => (accrual::default_entitlement(tenure), true),
        AccrualType::Fixed => (leave_type.default_entitlement, false),
    };

    let accrued = accrual::pro_rata(employee.hire_date, annual, year);
    let tenure_years = based_on_tenure.then_some(tenure as i32);

    Ok((accrued, based_on_tenure, tenure_years))
}
