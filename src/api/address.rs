use crate::auth::auth::AuthUser;
use crate::model::address::Address;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateAddress {
    #[schema(example = "Nigeria")]
    pub country: String,
    #[schema(example = "Lagos")]
    pub city: String,
}

/// Address of one employee (empty array if none recorded yet)
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/address",
    params(("employee_id" = String, Path, description = "Parent employee ID")),
    responses(
        (status = 200, description = "Address list with zero or one entry", body = [Address]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Address"
)]
pub async fn get_address(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let addresses = sqlx::query_as::<_, Address>(
        "SELECT employee_id, country, city FROM addresses WHERE employee_id = ?",
    )
    .bind(&employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch address");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(addresses))
}

/// Record the address of an employee (staff only, one per employee)
#[utoipa::path(
    post,
    path = "/api/v1/employees/{employee_id}/address",
    params(("employee_id" = String, Path, description = "Parent employee ID")),
    request_body = CreateAddress,
    responses(
        (status = 201, description = "Address created", body = Address),
        (status = 400, description = "Address already exists", body = Object, example = json!({
            "employee_id": "Address already exists for this employee."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Address"
)]
pub async fn create_address(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<CreateAddress>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let employee_id = path.into_inner();

    let employee_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
            .bind(&employee_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(ErrorInternalServerError)?;
    if !employee_exists {
        return Ok(HttpResponse::NotFound().json(json!({"message": "Employee not found"})));
    }

    let already = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM addresses WHERE employee_id = ?)",
    )
    .bind(&employee_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ErrorInternalServerError)?;
    if already {
        return Ok(HttpResponse::BadRequest().json(json!({
            "employee_id": "Address already exists for this employee."
        })));
    }

    sqlx::query("INSERT INTO addresses (employee_id, country, city) VALUES (?, ?, ?)")
        .bind(&employee_id)
        .bind(&payload.country)
        .bind(&payload.city)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to create address");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(Address {
        employee_id,
        country: payload.country.clone(),
        city: payload.city.clone(),
    }))
}
