//! Pure lifecycle transitions for leave requests. Each function mutates
//! an in-memory request and reports which ledger movement (if any) the
//! caller must apply inside the same transaction.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::models::{
    ApprovalStep, ApprovalStepStatus, Employee, LeaveRequest, LeaveStatus,
};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The chain cursor advanced; the request stays pending.
    Advanced,
    /// The last level approved; the reserved days must be committed.
    FinalApproved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Cancelled while pending; the reservation must be released.
    ReleasePending,
    /// Cancelled after approval; the used days must be returned.
    ReturnUsed,
}

/// Ordered approver levels for a new request: the employee's direct
/// manager, then HR. A manager who is also the HR approver appears once.
pub fn build_approval_chain(manager: Option<&Employee>, hr: Option<&Employee>) -> Vec<ApprovalStep> {
    let mut chain = Vec::new();

    if let Some(manager) = manager {
        chain.push(step(chain.len() as i32 + 1, manager.id, "manager"));
    }
    if let Some(hr) = hr {
        if !chain.iter().any(|s| s.approver_id == hr.id) {
            chain.push(step(chain.len() as i32 + 1, hr.id, "hr"));
        }
    }

    chain
}

fn step(level: i32, approver_id: Uuid, role: &str) -> ApprovalStep {
    ApprovalStep {
        level,
        approver_id,
        approver_role: role.to_string(),
        status: ApprovalStepStatus::Pending,
        acted_at: None,
        comments: None,
    }
}

/// Move a draft into the approval workflow.
pub fn submit(
    request: &mut LeaveRequest,
    chain: Vec<ApprovalStep>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if request.status != LeaveStatus::Draft {
        return Err(AppError::InvalidTransition(format!(
            "Request {} is {}, only drafts can be submitted",
            request.request_number, request.status
        )));
    }

    request.approval_chain.0 = chain;
    request.current_approval_level = 1;
    request.status = LeaveStatus::Pending;
    request.submitted_at = Some(now);
    request.updated_at = now;
    Ok(())
}

/// Approve the step at the current level. Advances the cursor, or closes
/// the request when the last level signs off.
pub fn approve_step(
    request: &mut LeaveRequest,
    approver_id: Uuid,
    comments: Option<String>,
    now: DateTime<Utc>,
) -> Result<ApprovalOutcome, AppError> {
    if request.status != LeaveStatus::Pending {
        return Err(AppError::InvalidTransition(format!(
            "Request {} is {}, not pending approval",
            request.request_number, request.status
        )));
    }

    let level = request.current_approval_level;
    let chain_len = request.approval_chain.0.len();
    let step = current_step(request)?;

    if step.status != ApprovalStepStatus::Pending {
        return Err(AppError::InvalidTransition(format!(
            "Approval level {} has already been acted on",
            level
        )));
    }
    if step.approver_id != approver_id {
        return Err(AppError::InvalidActor(format!(
            "Approval level {} belongs to a different approver",
            level
        )));
    }

    step.status = ApprovalStepStatus::Approved;
    step.acted_at = Some(now);
    step.comments = comments;
    request.updated_at = now;

    if (level as usize) >= chain_len {
        request.status = LeaveStatus::Approved;
        Ok(ApprovalOutcome::FinalApproved)
    } else {
        request.current_approval_level = level + 1;
        Ok(ApprovalOutcome::Advanced)
    }
}

/// Reject at the current level. The chain halts; later steps are never
/// touched.
pub fn reject(
    request: &mut LeaveRequest,
    approver_id: Uuid,
    reason: String,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if request.status != LeaveStatus::Pending {
        return Err(AppError::InvalidTransition(format!(
            "Request {} is {}, not pending approval",
            request.request_number, request.status
        )));
    }

    let level = request.current_approval_level;
    let step = current_step(request)?;

    if step.status != ApprovalStepStatus::Pending {
        return Err(AppError::InvalidTransition(format!(
            "Approval level {} has already been acted on",
            level
        )));
    }
    if step.approver_id != approver_id {
        return Err(AppError::InvalidActor(format!(
            "Approval level {} belongs to a different approver",
            level
        )));
    }

    step.status = ApprovalStepStatus::Rejected;
    step.acted_at = Some(now);
    step.comments = Some(reason.clone());

    request.status = LeaveStatus::Rejected;
    request.rejected_by = Some(approver_id);
    request.rejected_at = Some(now);
    request.rejection_reason = Some(reason);
    request.updated_at = now;
    Ok(())
}

/// Cancel a pending or approved request. Only the requesting employee may
/// cancel their own request.
pub fn cancel(
    request: &mut LeaveRequest,
    employee_id: Uuid,
    reason: String,
    now: DateTime<Utc>,
) -> Result<CancelOutcome, AppError> {
    if request.employee_id != employee_id {
        return Err(AppError::InvalidActor(
            "Only the requesting employee may cancel a leave request".to_string(),
        ));
    }

    let outcome = match request.status {
        LeaveStatus::Pending => CancelOutcome::ReleasePending,
        LeaveStatus::Approved => CancelOutcome::ReturnUsed,
        other => {
            return Err(AppError::InvalidTransition(format!(
                "Request {} is {} and cannot be cancelled",
                request.request_number, other
            )));
        }
    };

    request.status = LeaveStatus::Cancelled;
    request.cancelled_by = Some(employee_id);
    request.cancelled_at = Some(now);
    request.cancellation_reason = Some(reason);
    request.updated_at = now;
    Ok(outcome)
}

fn current_step(request: &mut LeaveRequest) -> Result<&mut ApprovalStep, AppError> {
    let level = request.current_approval_level;
    let idx = usize::try_from(level - 1)
        .map_err(|_| AppError::StepNotFound(level))?;
    request
        .approval_chain
        .0
        .get_mut(idx)
        .ok_or(AppError::StepNotFound(level))
}
