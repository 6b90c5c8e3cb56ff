use anyhow::Result;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{models::LeaveEntitlement, utils::sql};

const COLUMNS: &str = "id, employee_id, leave_type_id, year, accrued, carried_over, \
                       total_entitlement, used, pending, remaining, based_on_tenure, \
                       tenure_years, created_at, updated_at";

#[derive(Clone)]
pub struct EntitlementRepository {
    pool: PgPool,
}

impl EntitlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
    ) -> Result<Option<LeaveEntitlement>> {
        let entitlement = sqlx::query_as::<_, LeaveEntitlement>(&sql(&format!(
            r#"
            SELECT
                {}
            FROM
                leave_entitlements
            WHERE
                employee_id = ?
                AND leave_type_id = ?
                AND year = ?
            "#,
            COLUMNS
        )))
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entitlement)
    }

    /// Lock the ledger row for the duration of the transaction. Every
    /// reserve/commit/release/return runs against a row locked here, so
    /// concurrent mutations of the same (employee, leave type, year) key
    /// serialize and the balance invariant survives races.
    pub async fn get_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
    ) -> Result<Option<LeaveEntitlement>> {
        let entitlement = sqlx::query_as::<_, LeaveEntitlement>(&sql(&format!(
            r#"
            SELECT
                {}
            FROM
                leave_entitlements
            WHERE
                employee_id = ?
                AND leave_type_id = ?
                AND year = ?
            FOR UPDATE
            "#,
            COLUMNS
        )))
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(year)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(entitlement)
    }

    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entitlement: &LeaveEntitlement,
    ) -> Result<()> {
        sqlx::query(&sql(&format!(
            r#"
            INSERT INTO
                leave_entitlements ({})
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            COLUMNS
        )))
        .bind(entitlement.id)
        .bind(entitlement.employee_id)
        .bind(entitlement.leave_type_id)
        .bind(entitlement.year)
        .bind(entitlement.accrued)
        .bind(entitlement.carried_over)
        .bind(entitlement.total_entitlement)
        .bind(entitlement.used)
        .bind(entitlement.pending)
        .bind(entitlement.remaining)
        .bind(entitlement.based_on_tenure)
        .bind(entitlement.tenure_years)
        .bind(entitlement.created_at)
        .bind(entitlement.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Write back the balance counters after a ledger mutation.
    pub async fn update_counters(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entitlement: &LeaveEntitlement,
    ) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE
                leave_entitlements
            SET
                accrued = ?,
                carried_over = ?,
                total_entitlement = ?,
                used = ?,
                pending = ?,
                remaining = ?,
                updated_at = ?
            WHERE
                id = ?
        "#))
        .bind(entitlement.accrued)
        .bind(entitlement.carried_over)
        .bind(entitlement.total_entitlement)
        .bind(entitlement.used)
        .bind(entitlement.pending)
        .bind(entitlement.remaining)
        .bind(entitlement.updated_at)
        .bind(entitlement.id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn list_for_employee(
        &self,
        employee_id: Uuid,
        year: Option<i32>,
    ) -> Result<Vec<LeaveEntitlement>> {
        let entitlements = match year {
            Some(y) => {
                sqlx::query_as::<_, LeaveEntitlement>(&sql(&format!(
                    "SELECT {} FROM leave_entitlements WHERE employee_id = ? AND year = ? ORDER BY year DESC",
                    COLUMNS
                )))
                .bind(employee_id)
                .bind(y)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, LeaveEntitlement>(&sql(&format!(
                    "SELECT {} FROM leave_entitlements WHERE employee_id = ? ORDER BY year DESC",
                    COLUMNS
                )))
                .bind(employee_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(entitlements)
    }
}
