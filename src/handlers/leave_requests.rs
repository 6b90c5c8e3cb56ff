use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{LeaveRequestInput, LeaveRequestUpdate, LeaveStatus};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::LeaveService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalBody {
    pub approver_id: Uuid,
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionBody {
    pub approver_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationBody {
    pub employee_id: Uuid,
    pub reason: String,
}

/// Create a new leave request (or a draft when `saveAsDraft` is set)
pub async fn create_leave_request(
    service: web::Data<LeaveService>,
    input: web::Json<LeaveRequestInput>,
) -> Result<HttpResponse, AppError> {
    let created = service.create_request(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

/// List leave requests with optional filtering
pub async fn get_leave_requests(
    service: web::Data<LeaveService>,
    query: web::Query<LeaveRequestQuery>,
) -> Result<HttpResponse, AppError> {
    let status_filter = match &query.status {
        Some(status_str) => match status_str.parse::<LeaveStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error("invalid_status", "Invalid status filter")));
            }
        },
        None => None,
    };

    let requests = service
        .list_requests(query.employee_id, status_filter)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

/// Get a specific leave request by ID
pub async fn get_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = service.get_request(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Replace the editable fields of a draft
pub async fn update_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    input: web::Json<LeaveRequestUpdate>,
) -> Result<HttpResponse, AppError> {
    let updated = service
        .update_request(path.into_inner(), input.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

/// Delete a draft
pub async fn delete_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    service.delete_request(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Submit a draft into the approval workflow
pub async fn submit_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    service.submit_request(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Leave request submitted",
    )))
}

/// Approve the current chain step
pub async fn approve_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    body: web::Json<ApprovalBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    service
        .approve_request(path.into_inner(), body.approver_id, body.comments)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Leave request approved",
    )))
}

/// Reject the request at the current chain step
pub async fn reject_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    body: web::Json<RejectionBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    service
        .reject_request(path.into_inner(), body.approver_id, body.reason)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Leave request rejected",
    )))
}

/// Cancel a pending or approved request (owner only)
pub async fn cancel_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    body: web::Json<CancellationBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    service
        .cancel_request(path.into_inner(), body.employee_id, body.reason)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Leave request cancelled",
    )))
}
