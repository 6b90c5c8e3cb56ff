use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::LeaveService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementQuery {
    pub employee_id: Uuid,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsureEntitlementBody {
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub year: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarryOverBody {
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub from_year: i32,
}

/// List an employee's entitlement ledger rows, optionally for one year
pub async fn get_entitlements(
    service: web::Data<LeaveService>,
    query: web::Query<EntitlementQuery>,
) -> Result<HttpResponse, AppError> {
    let entitlements = service
        .list_entitlements(query.employee_id, query.year)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(entitlements)))
}

/// Create the ledger row for an employee, leave type and year if absent
pub async fn ensure_entitlement(
    service: web::Data<LeaveService>,
    body: web::Json<EnsureEntitlementBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let entitlement = service
        .ensure_entitlement(body.employee_id, body.leave_type_id, body.year)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(entitlement)))
}

/// Apply year-end carry-over for one employee and leave type
pub async fn carry_over_entitlement(
    service: web::Data<LeaveService>,
    body: web::Json<CarryOverBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let next_year = service
        .carry_over(body.employee_id, body.leave_type_id, body.from_year)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(next_year)))
}
