use crate::api::employee::get_or_create_employee;
use crate::auth::auth::AuthUser;
use crate::model::employee_image::EmployeeImage;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct UploadImage {
    /// Stored path or URL of the uploaded image
    #[schema(example = "employee_management/images/4F2A9C01BD37.png")]
    pub image: String,
}

/// Caller's profile image
#[utoipa::path(
    get,
    path = "/api/v1/employee-image",
    responses(
        (status = 200, description = "Image found", body = EmployeeImage),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No image uploaded yet")
    ),
    security(("bearer_auth" = [])),
    tag = "EmployeeImage"
)]
pub async fn get_image(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee = get_or_create_employee(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to resolve own employee record");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let image = sqlx::query_as::<_, EmployeeImage>(
        "SELECT employee_id, image FROM employee_images WHERE employee_id = ?",
    )
    .bind(&employee.id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = %employee.id, "Failed to fetch image");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match image {
        Some(image) => Ok(HttpResponse::Ok().json(image)),
        None => Ok(HttpResponse::NotFound().json(json!({"message": "No image uploaded"}))),
    }
}

/// Upload or replace the caller's profile image
#[utoipa::path(
    put,
    path = "/api/v1/employee-image",
    request_body = UploadImage,
    responses(
        (status = 200, description = "Image stored", body = EmployeeImage),
        (status = 400, description = "Blank image", body = Object, example = json!({
            "image": "This field may not be blank."
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "EmployeeImage"
)]
pub async fn put_image(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UploadImage>,
) -> actix_web::Result<impl Responder> {
    if payload.image.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "image": "This field may not be blank."
        })));
    }

    let employee = get_or_create_employee(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to resolve own employee record");
            ErrorInternalServerError("Internal Server Error")
        })?;

    // Create-or-replace: a second upload overwrites the single row.
    sqlx::query(
        r#"
        INSERT INTO employee_images (employee_id, image)
        VALUES (?, ?)
        ON DUPLICATE KEY UPDATE image = VALUES(image)
        "#,
    )
    .bind(&employee.id)
    .bind(payload.image.trim())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = %employee.id, "Failed to store image");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(EmployeeImage {
        employee_id: employee.id,
        image: payload.image.trim().to_string(),
    }))
}
