use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{Employee, EmployeeRole},
    utils::sql,
};

const COLUMNS: &str = "id, code, name, department, position, role, manager_id, \
                       hire_date, is_active, created_at, updated_at";

/// Read-only view of the employee directory. The leave core never writes
/// master data; it snapshots display fields and resolves approvers.
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&sql(&format!(
            "SELECT {} FROM employees WHERE id = ?",
            COLUMNS
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// First active HR employee, used as the final approval level.
    pub async fn find_hr_approver(&self) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&sql(&format!(
            r#"
            SELECT
                {}
            FROM
                employees
            WHERE
                role = ?
                AND is_active = TRUE
            ORDER BY
                code
            LIMIT 1
            "#,
            COLUMNS
        )))
        .bind(EmployeeRole::Hr)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }
}
