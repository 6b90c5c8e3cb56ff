use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::pg_enum;

/// Leave-type master data: the rule set a request is validated against.
/// Owned by the registry subsystem, read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveType {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub is_paid: bool,
    pub max_consecutive_days: Option<f64>,
    pub requires_certificate: bool,
    pub certificate_required_after_days: Option<f64>,
    pub default_entitlement: f64,
    pub accrual_type: AccrualType,
    pub carry_over_allowed: bool,
    pub max_carry_over_days: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pg_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "snake_case")]
    pub enum AccrualType {
        /// Flat annual grant from `default_entitlement`.
        Fixed => "fixed",
        /// Annual grant scaled by the tenure tier table.
        Tenure => "tenure",
    }
}
