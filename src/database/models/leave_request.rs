use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::macros::pg_enum;

/// One employee's request for time off. Employee and leave-type display
/// fields are snapshots taken when the request was written, so historical
/// records stay readable after master data changes.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub request_number: String,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub employee_code: String,
    pub department: String,
    pub position: String,
    pub leave_type_id: Uuid,
    pub leave_type_code: String,
    pub leave_type_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
    pub total_days: f64,
    pub reason: String,
    pub handover_to: Option<Uuid>,
    pub handover_notes: Option<String>,
    pub contact_during_leave: Option<String>,
    pub has_certificate: bool,
    pub certificate_url: Option<String>,
    pub status: LeaveStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approval_chain: Json<Vec<ApprovalStep>>,
    /// 1-based cursor into `approval_chain`; only the step at this level may act.
    pub current_approval_level: i32,
    pub rejected_by: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One link in the approval chain, stored as JSONB on the request row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStep {
    pub level: i32,
    pub approver_id: Uuid,
    pub approver_role: String,
    pub status: ApprovalStepStatus,
    pub acted_at: Option<DateTime<Utc>>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStepStatus {
    Pending,
    Approved,
    Rejected,
}

pg_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveStatus {
        Draft => "draft",
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

pg_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "snake_case")]
    pub enum HalfDayPeriod {
        Morning => "morning",
        Afternoon => "afternoon",
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestInput {
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
    pub reason: String,
    pub handover_to: Option<Uuid>,
    pub handover_notes: Option<String>,
    pub contact_during_leave: Option<String>,
    #[serde(default)]
    pub has_certificate: bool,
    pub certificate_url: Option<String>,
    /// When set, the request is stored as an editable draft: no approval
    /// chain is built and no balance is reserved until submit.
    #[serde(default)]
    pub save_as_draft: bool,
}

/// Replacement for the editable fields of a draft.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestUpdate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
    pub reason: String,
    pub handover_to: Option<Uuid>,
    pub handover_notes: Option<String>,
    pub contact_during_leave: Option<String>,
    #[serde(default)]
    pub has_certificate: bool,
    pub certificate_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLeaveRequest {
    pub id: Uuid,
    pub request_number: String,
}
