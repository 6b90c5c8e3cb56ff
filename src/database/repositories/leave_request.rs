use anyhow::Result;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{LeaveRequest, LeaveStatus},
    utils::sql,
};

const COLUMNS: &str = "id, request_number, employee_id, employee_name, employee_code, \
                       department, position, leave_type_id, leave_type_code, leave_type_name, \
                       start_date, end_date, half_day, half_day_period, total_days, reason, \
                       handover_to, handover_notes, contact_during_leave, has_certificate, \
                       certificate_url, status, submitted_at, approval_chain, \
                       current_approval_level, rejected_by, rejected_at, rejection_reason, \
                       cancelled_by, cancelled_at, cancellation_reason, created_at, updated_at";

#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: PgPool,
}

impl LeaveRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &LeaveRequest,
    ) -> Result<()> {
        sqlx::query(&sql(&format!(
            r#"
            INSERT INTO
                leave_requests ({})
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                 ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            COLUMNS
        )))
        .bind(request.id)
        .bind(&request.request_number)
        .bind(request.employee_id)
        .bind(&request.employee_name)
        .bind(&request.employee_code)
        .bind(&request.department)
        .bind(&request.position)
        .bind(request.leave_type_id)
        .bind(&request.leave_type_code)
        .bind(&request.leave_type_name)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.half_day)
        .bind(request.half_day_period)
        .bind(request.total_days)
        .bind(&request.reason)
        .bind(request.handover_to)
        .bind(&request.handover_notes)
        .bind(&request.contact_during_leave)
        .bind(request.has_certificate)
        .bind(&request.certificate_url)
        .bind(request.status)
        .bind(request.submitted_at)
        .bind(&request.approval_chain)
        .bind(request.current_approval_level)
        .bind(request.rejected_by)
        .bind(request.rejected_at)
        .bind(&request.rejection_reason)
        .bind(request.cancelled_by)
        .bind(request.cancelled_at)
        .bind(&request.cancellation_reason)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            "SELECT {} FROM leave_requests WHERE id = ?",
            COLUMNS
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Lock the request row for the duration of the transaction so two
    /// concurrent workflow actions on it serialize.
    pub async fn get_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            "SELECT {} FROM leave_requests WHERE id = ? FOR UPDATE",
            COLUMNS
        )))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(request)
    }

    /// Write back every mutable column of the request.
    pub async fn persist(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &LeaveRequest,
    ) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE
                leave_requests
            SET
                employee_name = ?,
                employee_code = ?,
                department = ?,
                position = ?,
                start_date = ?,
                end_date = ?,
                half_day = ?,
                half_day_period = ?,
                total_days = ?,
                reason = ?,
                handover_to = ?,
                handover_notes = ?,
                contact_during_leave = ?,
                has_certificate = ?,
                certificate_url = ?,
                status = ?,
                submitted_at = ?,
                approval_chain = ?,
                current_approval_level = ?,
                rejected_by = ?,
                rejected_at = ?,
                rejection_reason = ?,
                cancelled_by = ?,
                cancelled_at = ?,
                cancellation_reason = ?,
                updated_at = ?
            WHERE
                id = ?
        "#))
        .bind(&request.employee_name)
        .bind(&request.employee_code)
        .bind(&request.department)
        .bind(&request.position)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.half_day)
        .bind(request.half_day_period)
        .bind(request.total_days)
        .bind(&request.reason)
        .bind(request.handover_to)
        .bind(&request.handover_notes)
        .bind(&request.contact_during_leave)
        .bind(request.has_certificate)
        .bind(&request.certificate_url)
        .bind(request.status)
        .bind(request.submitted_at)
        .bind(&request.approval_chain)
        .bind(request.current_approval_level)
        .bind(request.rejected_by)
        .bind(request.rejected_at)
        .bind(&request.rejection_reason)
        .bind(request.cancelled_by)
        .bind(request.cancelled_at)
        .bind(&request.cancellation_reason)
        .bind(request.updated_at)
        .bind(request.id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM leave_requests WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// List requests with optional filtering
    pub async fn list(
        &self,
        employee_id: Option<Uuid>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>> {
        let mut query = format!("SELECT {} FROM leave_requests", COLUMNS);

        let mut params = Vec::new();
        let mut conditions = vec![];

        if let Some(eid) = employee_id {
            conditions.push(format!("employee_id = ${}::uuid", params.len() + 1));
            params.push(eid.to_string());
        }

        if let Some(s) = status {
            conditions.push(format!("status = ${}", params.len() + 1));
            params.push(s.to_string());
        }

        if !params.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY created_at DESC");

        let mut prepared = sqlx::query_as::<_, LeaveRequest>(&query);
        for param in params {
            prepared = prepared.bind(param);
        }

        let requests = prepared.fetch_all(&self.pool).await?;

        Ok(requests)
    }

    /// All pending or approved requests for one employee; the overlap rule
    /// runs against this set.
    pub async fn find_active_for_employee(&self, employee_id: Uuid) -> Result<Vec<LeaveRequest>> {
        let requests = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            SELECT
                {}
            FROM
                leave_requests
            WHERE
                employee_id = ?
                AND status IN (?, ?)
            ORDER BY
                start_date
            "#,
            COLUMNS
        )))
        .bind(employee_id)
        .bind(LeaveStatus::Pending)
        .bind(LeaveStatus::Approved)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Highest existing request number for a year, by lexicographic order
    /// over the `LV-<year>-` prefix range.
    pub async fn max_request_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        year_prefix: &str,
    ) -> Result<Option<String>> {
        let max = sqlx::query_scalar::<_, String>(&sql(r#"
            SELECT
                request_number
            FROM
                leave_requests
            WHERE
                request_number LIKE ?
            ORDER BY
                request_number DESC
            LIMIT 1
        "#))
        .bind(format!("{}%", year_prefix))
        .fetch_optional(&mut **tx)
        .await?;

        Ok(max)
    }
}
