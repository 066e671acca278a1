use crate::auth::auth::AuthUser;
use crate::model::education::Education;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateEducation {
    #[schema(example = "University of Lagos")]
    pub institution: String,
    #[schema(example = "Computer Science", nullable = true)]
    pub course_of_study: Option<String>,
    #[schema(example = "2015-09-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2019-07-01", value_type = String, format = "date")]
    pub end_date: NaiveDate,
}

async fn employee_exists(pool: &MySqlPool, employee_id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
        .bind(employee_id)
        .fetch_one(pool)
        .await
}

/// Education records of one employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/educations",
    params(("employee_id" = String, Path, description = "Parent employee ID")),
    responses(
        (status = 200, description = "Education records", body = [Education]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Education"
)]
pub async fn list_educations(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let educations = sqlx::query_as::<_, Education>(
        "SELECT id, institution, course_of_study, start_date, end_date FROM educations WHERE employee_id = ? ORDER BY start_date",
    )
    .bind(&employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch educations");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(educations))
}

/// Add an education record under an employee (staff only)
#[utoipa::path(
    post,
    path = "/api/v1/employees/{employee_id}/educations",
    params(("employee_id" = String, Path, description = "Parent employee ID")),
    request_body = CreateEducation,
    responses(
        (status = 201, description = "Education record created", body = Education),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Education"
)]
pub async fn create_education(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<CreateEducation>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let employee_id = path.into_inner();

    let exists = employee_exists(pool.get_ref(), &employee_id)
        .await
        .map_err(ErrorInternalServerError)?;
    if !exists {
        return Ok(HttpResponse::NotFound().json(json!({"message": "Employee not found"})));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO educations (institution, course_of_study, start_date, end_date, employee_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.institution.trim())
    .bind(&payload.course_of_study)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to create education record");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(Education {
        id: result.last_insert_id(),
        institution: payload.institution.trim().to_string(),
        course_of_study: payload.course_of_study.clone(),
        start_date: payload.start_date,
        end_date: payload.end_date,
    }))
}
