use crate::auth::auth::AuthUser;
use crate::model::permission::Permission;
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update, normalize_name};
use crate::utils::list_cache;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreatePermission {
    #[schema(example = "can_view_payroll")]
    pub name: String,
    #[schema(example = "Grants read access to payroll records")]
    pub description: String,
}

/// Case-insensitive existence check, applied before the storage-level
/// unique constraint so duplicates surface as a field-keyed 400.
async fn name_taken(pool: &MySqlPool, name: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM permissions WHERE LOWER(name) = ? LIMIT 1)",
    )
    .bind(normalize_name(name))
    .fetch_one(pool)
    .await
}

/// List permissions (read-through cached)
#[utoipa::path(
    get,
    path = "/api/v1/permissions",
    responses(
        (status = 200, description = "All permissions, ordered by name", body = [Permission])
    ),
    tag = "Permission"
)]
pub async fn list_permissions(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    if let Some(cached) = list_cache::get(list_cache::PERMISSIONS_LIST_KEY).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description FROM permissions ORDER BY name",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch permissions");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let payload = serde_json::to_value(&permissions)
        .map_err(actix_web::error::ErrorInternalServerError)?;
    list_cache::store(list_cache::PERMISSIONS_LIST_KEY, payload.clone()).await;

    Ok(HttpResponse::Ok().json(payload))
}

/// Create permission (staff only)
#[utoipa::path(
    post,
    path = "/api/v1/permissions",
    request_body = CreatePermission,
    responses(
        (status = 201, description = "Permission created", body = Permission),
        (status = 400, description = "Blank or duplicate name", body = Object, example = json!({
            "name": "A permission with this name already exists."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Permission"
)]
pub async fn create_permission(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePermission>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "name": "This field may not be blank."
        })));
    }

    let taken = name_taken(pool.get_ref(), name).await.map_err(|e| {
        error!(error = %e, "Failed to check permission name");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    if taken {
        return Ok(HttpResponse::BadRequest().json(json!({
            "name": "A permission with this name already exists."
        })));
    }

    let result = sqlx::query("INSERT INTO permissions (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(&payload.description)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create permission");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(Permission {
        id: result.last_insert_id(),
        name: name.to_string(),
        description: payload.description.clone(),
    }))
}

/// Retrieve a permission by id
#[utoipa::path(
    get,
    path = "/api/v1/permissions/{id}",
    params(("id" = u64, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Permission found", body = Permission),
        (status = 404, description = "Permission not found")
    ),
    tag = "Permission"
)]
pub async fn get_permission(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let permission = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description FROM permissions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to fetch permission");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match permission {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Permission not found"
        }))),
    }
}

/// Partially update a permission (staff only)
#[utoipa::path(
    patch,
    path = "/api/v1/permissions/{id}",
    params(("id" = u64, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Updated permission", body = Permission),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Permission not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Permission"
)]
pub async fn update_permission(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let id = path.into_inner();

    if let Some(name) = body.get("name").and_then(Value::as_str) {
        if name.trim().is_empty() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "name": "This field may not be blank."
            })));
        }
        // Uniqueness check excludes the row being updated.
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM permissions WHERE LOWER(name) = ? AND id <> ? LIMIT 1)",
        )
        .bind(normalize_name(name))
        .bind(id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
        if taken {
            return Ok(HttpResponse::BadRequest().json(json!({
                "name": "A permission with this name already exists."
            })));
        }
    }

    let update = build_update_sql(
        "permissions",
        &body,
        &["name", "description"],
        "id",
        SqlValue::I64(id as i64),
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Permission not found"
        })));
    }

    let updated = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description FROM permissions WHERE id = ?",
    )
    .bind(id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a permission (staff only)
#[utoipa::path(
    delete,
    path = "/api/v1/permissions/{id}",
    params(("id" = u64, Path, description = "Permission ID")),
    responses(
        (status = 204, description = "Permission deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Permission not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Permission"
)]
pub async fn delete_permission(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM permissions WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete permission");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Permission not found"
        })));
    }

    Ok(HttpResponse::NoContent().finish())
}
