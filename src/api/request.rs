use crate::api::employee::get_or_create_employee;
use crate::auth::auth::AuthUser;
use crate::model::request::{Request, RequestStatus, RequestType, transition_conflict};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

const REQUEST_COLUMNS: &str =
    "id, employee_id, request_type, detail, approver_id, status, date_requested";

#[derive(Deserialize, ToSchema)]
pub struct CreateRequest {
    #[schema(example = "Leave")]
    pub request_type: RequestType,
    #[schema(example = "Two days off for a family event")]
    pub detail: String,
    /// Server-controlled; any client-supplied value is discarded.
    #[schema(example = "Pending", nullable = true)]
    pub status: Option<String>,
    /// Server-controlled; any client-supplied value is discarded.
    #[schema(example = 2, nullable = true)]
    pub approver: Option<u64>,
}

#[derive(Deserialize, IntoParams)]
pub struct RequestFilter {
    /// Filter by request status
    #[param(example = "Pending")]
    pub status: Option<String>,
    /// Pagination page number (starts at 1)
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct RequestListResponse {
    pub data: Vec<Request>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

async fn fetch_request(pool: &MySqlPool, id: u64) -> Result<Option<Request>, sqlx::Error> {
    sqlx::query_as::<_, Request>(&format!(
        "SELECT {} FROM requests WHERE id = ?",
        REQUEST_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

fn parse_status(request: &Request) -> actix_web::Result<RequestStatus> {
    RequestStatus::from_str(&request.status).map_err(|_| {
        error!(request_id = request.id, status = %request.status, "Unknown request status in storage");
        ErrorInternalServerError("Internal Server Error")
    })
}

/// Paginated request list; non-privileged callers only see their own
#[utoipa::path(
    get,
    path = "/api/v1/requests",
    params(RequestFilter),
    responses(
        (status = 200, description = "Paginated request list", body = RequestListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Request"
)]
pub async fn list_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RequestFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();

    if !auth.is_privileged() {
        let employee = get_or_create_employee(pool.get_ref(), auth.user_id)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = auth.user_id, "Failed to resolve own employee record");
                ErrorInternalServerError("Internal Server Error")
            })?;
        where_sql.push_str(" AND employee_id = ?");
        binds.push(employee.id);
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        binds.push(status.to_string());
    }

    let count_sql = format!("SELECT COUNT(*) FROM requests{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &binds {
        count_q = count_q.bind(b);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count requests");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT {} FROM requests{} ORDER BY date_requested DESC LIMIT ? OFFSET ?",
        REQUEST_COLUMNS, where_sql
    );
    let mut data_q = sqlx::query_as::<_, Request>(&data_sql);
    for b in &binds {
        data_q = data_q.bind(b);
    }

    let requests = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch requests");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(RequestListResponse {
        data: requests,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Submit a request; status is forced to Pending, approver to unset
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request submitted", body = Request),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Request"
)]
pub async fn create_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateRequest>,
) -> actix_web::Result<impl Responder> {
    let employee = get_or_create_employee(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to resolve own employee record");
            ErrorInternalServerError("Internal Server Error")
        })?;

    // Client-supplied status/approver are intentionally ignored.
    let result = sqlx::query(
        "INSERT INTO requests (employee_id, request_type, detail, status) VALUES (?, ?, ?, ?)",
    )
    .bind(&employee.id)
    .bind(payload.request_type.to_string())
    .bind(&payload.detail)
    .bind(RequestStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = %employee.id, "Failed to create request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let created = fetch_request(pool.get_ref(), result.last_insert_id())
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorInternalServerError("Internal Server Error"))?;

    Ok(HttpResponse::Created().json(created))
}

/// Retrieve a request; owners see their own, privileged callers see all
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    params(("id" = u64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request found", body = Request),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Request not found or not visible")
    ),
    security(("bearer_auth" = [])),
    tag = "Request"
)]
pub async fn get_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let request = fetch_request(pool.get_ref(), id).await.map_err(|e| {
        error!(error = %e, id, "Failed to fetch request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    // Invisible records 404 rather than 403, matching list scoping.
    match request {
        Some(r) if auth.can_view_request(&r.employee_id) => Ok(HttpResponse::Ok().json(r)),
        _ => Ok(HttpResponse::NotFound().json(json!({"message": "Request not found"}))),
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateRequest {
    #[schema(example = "Expense", nullable = true)]
    pub request_type: Option<RequestType>,
    #[schema(example = "Updated detail", nullable = true)]
    pub detail: Option<String>,
    #[schema(example = "Approved", nullable = true)]
    pub status: Option<RequestStatus>,
}

/// Partially update a request (admin/manager only)
#[utoipa::path(
    patch,
    path = "/api/v1/requests/{id}",
    params(("id" = u64, Path, description = "Request ID")),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Updated request", body = Request),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Request not found or not visible")
    ),
    security(("bearer_auth" = [])),
    tag = "Request"
)]
pub async fn update_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateRequest>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let request = fetch_request(pool.get_ref(), id).await.map_err(|e| {
        error!(error = %e, id, "Failed to fetch request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let request = match request {
        Some(r) if auth.can_view_request(&r.employee_id) => r,
        _ => {
            return Ok(HttpResponse::NotFound().json(json!({"message": "Request not found"})));
        }
    };

    // Owners may read but not edit; status and the rest of the record are
    // server-controlled once submitted.
    if !auth.is_privileged() {
        return Err(actix_web::error::ErrorForbidden("Admin/Manager only"));
    }

    let request_type = payload
        .request_type
        .map(|t| t.to_string())
        .unwrap_or(request.request_type);
    let detail = payload.detail.clone().unwrap_or(request.detail);
    let status = payload
        .status
        .map(|s| s.to_string())
        .unwrap_or(request.status);

    sqlx::query("UPDATE requests SET request_type = ?, detail = ?, status = ? WHERE id = ?")
        .bind(&request_type)
        .bind(&detail)
        .bind(&status)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to update request");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let updated = fetch_request(pool.get_ref(), id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorInternalServerError("Internal Server Error"))?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a request: owners while Pending, never from a terminal state
#[utoipa::path(
    delete,
    path = "/api/v1/requests/{id}",
    params(("id" = u64, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 400, description = "Terminal state", body = Object, example = json!({
            "detail": "Cannot delete a request that is approved or rejected."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Request not found or not visible")
    ),
    security(("bearer_auth" = [])),
    tag = "Request"
)]
pub async fn delete_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let request = fetch_request(pool.get_ref(), id).await.map_err(|e| {
        error!(error = %e, id, "Failed to fetch request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let request = match request {
        Some(r) if auth.can_view_request(&r.employee_id) => r,
        _ => {
            return Ok(HttpResponse::NotFound().json(json!({"message": "Request not found"})));
        }
    };

    let status = parse_status(&request)?;

    if status.is_terminal() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "detail": "Cannot delete a request that is approved or rejected."
        })));
    }

    // Deny by default: anything not covered above needs the object rule.
    if !auth.can_delete_request(&request.employee_id, status) {
        return Err(actix_web::error::ErrorForbidden("Not allowed"));
    }

    sqlx::query("DELETE FROM requests WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete request");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::NoContent().finish())
}

async fn set_status(
    auth: AuthUser,
    pool: &MySqlPool,
    id: u64,
    target: RequestStatus,
) -> actix_web::Result<HttpResponse> {
    auth.require_privileged()?;

    let request = fetch_request(pool, id).await.map_err(|e| {
        error!(error = %e, id, "Failed to fetch request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let request = match request {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({"message": "Request not found"})));
        }
    };

    let current = parse_status(&request)?;

    if transition_conflict(current, target) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "detail": format!("This request is already {}.", target)
        })));
    }

    sqlx::query("UPDATE requests SET status = ?, approver_id = ? WHERE id = ?")
        .bind(target.to_string())
        .bind(auth.user_id)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to update request status");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let updated = fetch_request(pool, id)
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorInternalServerError("Internal Server Error"))?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Approve a request (admin/manager only)
#[utoipa::path(
    patch,
    path = "/api/v1/requests/{id}/approve",
    params(("id" = u64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request approved", body = Request),
        (status = 400, description = "Already approved", body = Object, example = json!({
            "detail": "This request is already Approved."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Request"
)]
pub async fn approve_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    set_status(auth, pool.get_ref(), path.into_inner(), RequestStatus::Approved).await
}

/// Reject a request (admin/manager only)
#[utoipa::path(
    patch,
    path = "/api/v1/requests/{id}/reject",
    params(("id" = u64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request rejected", body = Request),
        (status = 400, description = "Already rejected", body = Object, example = json!({
            "detail": "This request is already Rejected."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Request"
)]
pub async fn reject_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    set_status(auth, pool.get_ref(), path.into_inner(), RequestStatus::Rejected).await
}
