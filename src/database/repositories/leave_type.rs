use std::time::Duration;

use anyhow::Result;
use moka::future::Cache;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::LeaveType, utils::sql};

const COLUMNS: &str = "id, code, name, is_active, is_paid, max_consecutive_days, \
                       requires_certificate, certificate_required_after_days, \
                       default_entitlement, accrual_type, carry_over_allowed, \
                       max_carry_over_days, created_at, updated_at";

/// Read-only view of the leave-type registry. Rule sets change rarely, so
/// lookups are served from a short-lived cache.
#[derive(Clone)]
pub struct LeaveTypeRepository {
    pool: PgPool,
    cache: Cache<Uuid, LeaveType>,
}

impl LeaveTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(Duration::from_secs(60))
            .build();

        Self { pool, cache }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<LeaveType>> {
        if let Some(leave_type) = self.cache.get(&id).await {
            return Ok(Some(leave_type));
        }

        let leave_type = sqlx::query_as::<_, LeaveType>(&sql(&format!(
            "SELECT {} FROM leave_types WHERE id = ?",
            COLUMNS
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(ref lt) = leave_type {
            self.cache.insert(id, lt.clone()).await;
        }

        Ok(leave_type)
    }
}
