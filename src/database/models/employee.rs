use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::pg_enum;

/// Employee master-data record. Owned by the directory subsystem; the leave
/// core only reads it, to snapshot display fields and resolve approvers.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub department: String,
    pub position: String,
    pub role: EmployeeRole,
    pub manager_id: Option<Uuid>,
    pub hire_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pg_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "snake_case")]
    pub enum EmployeeRole {
        Employee => "employee",
        Manager => "manager",
        Hr => "hr",
    }
}
