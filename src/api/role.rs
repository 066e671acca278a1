use crate::auth::auth::AuthUser;
use crate::model::role::{EmploymentType, Role};
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update, normalize_name};
use crate::utils::list_cache;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateRole {
    #[schema(example = "Backend Engineer")]
    pub title: String,
    #[schema(example = "Builds and maintains backend services")]
    pub description: String,
    /// Parent role in the reporting tree
    #[schema(example = 2, nullable = true)]
    pub reports_to: Option<u64>,
    #[schema(example = "Full-time")]
    pub employment_type: Option<EmploymentType>,
    /// Permission ids to attach to this role
    #[schema(example = json!([1, 2]))]
    pub permission: Option<Vec<u64>>,
}

#[derive(Serialize, ToSchema)]
pub struct RoleResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Backend Engineer")]
    pub title: String,
    #[schema(example = "Builds and maintains backend services")]
    pub description: String,
    #[schema(example = "Full-time")]
    pub employment_type: String,
    #[schema(example = 2, nullable = true)]
    pub reports_to: Option<u64>,
    #[schema(example = json!([1, 2]))]
    pub permission: Vec<u64>,
}

#[derive(Deserialize, IntoParams)]
pub struct RoleQuery {
    /// Exact title match
    pub title: Option<String>,
    /// Filter by parent role
    pub reports_to: Option<u64>,
    /// Substring search on title or description
    pub search: Option<String>,
}

impl RoleQuery {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.reports_to.is_none() && self.search.is_none()
    }
}

const ROLE_COLUMNS: &str = "id, title, description, employment_type, reports_to";

async fn title_taken(pool: &MySqlPool, title: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM roles WHERE LOWER(title) = ? LIMIT 1)",
    )
    .bind(normalize_name(title))
    .fetch_one(pool)
    .await
}

async fn permission_ids(pool: &MySqlPool, role_id: u64) -> Result<Vec<u64>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (u64,)>(
        "SELECT permission_id FROM role_permissions WHERE role_id = ? ORDER BY permission_id",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

fn with_permissions(role: Role, permission: Vec<u64>) -> RoleResponse {
    RoleResponse {
        id: role.id,
        title: role.title,
        description: role.description,
        employment_type: role.employment_type,
        reports_to: role.reports_to,
        permission,
    }
}

async fn role_response(pool: &MySqlPool, role: Role) -> Result<RoleResponse, sqlx::Error> {
    let permission = permission_ids(pool, role.id).await?;
    Ok(with_permissions(role, permission))
}

/// List roles (read-through cached when unfiltered)
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    params(RoleQuery),
    responses(
        (status = 200, description = "Roles ordered by title", body = [RoleResponse])
    ),
    tag = "Role"
)]
pub async fn list_roles(
    pool: web::Data<MySqlPool>,
    query: web::Query<RoleQuery>,
) -> actix_web::Result<impl Responder> {
    // Only the plain, unfiltered listing is cached; filtered reads always
    // go to the database.
    let cacheable = query.is_empty();
    if cacheable {
        if let Some(cached) = list_cache::get(list_cache::ROLES_LIST_KEY).await {
            return Ok(HttpResponse::Ok().json(cached));
        }
    }

    let mut sql = format!("SELECT {} FROM roles WHERE 1=1", ROLE_COLUMNS);
    let mut binds: Vec<String> = Vec::new();

    if let Some(title) = &query.title {
        sql.push_str(" AND title = ?");
        binds.push(title.clone());
    }
    if let Some(reports_to) = query.reports_to {
        sql.push_str(" AND reports_to = ?");
        binds.push(reports_to.to_string());
    }
    if let Some(search) = &query.search {
        sql.push_str(" AND (title LIKE ? OR description LIKE ?)");
        let like = format!("%{}%", search);
        binds.push(like.clone());
        binds.push(like);
    }
    sql.push_str(" ORDER BY title");

    let mut q = sqlx::query_as::<_, Role>(&sql);
    for b in &binds {
        q = q.bind(b);
    }

    let roles = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch roles");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let mut responses = Vec::with_capacity(roles.len());
    for role in roles {
        let response = role_response(pool.get_ref(), role).await.map_err(|e| {
            error!(error = %e, "Failed to fetch role permissions");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
        responses.push(response);
    }

    let payload =
        serde_json::to_value(&responses).map_err(actix_web::error::ErrorInternalServerError)?;
    if cacheable {
        list_cache::store(list_cache::ROLES_LIST_KEY, payload.clone()).await;
    }

    Ok(HttpResponse::Ok().json(payload))
}

/// Create role (staff only)
#[utoipa::path(
    post,
    path = "/api/v1/roles",
    request_body = CreateRole,
    responses(
        (status = 201, description = "Role created", body = RoleResponse),
        (status = 400, description = "Blank/duplicate title or bad reference", body = Object, example = json!({
            "title": "A role with this name already exists."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Role"
)]
pub async fn create_role(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateRole>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "title": "This field may not be blank."
        })));
    }

    let taken = title_taken(pool.get_ref(), title).await.map_err(|e| {
        error!(error = %e, "Failed to check role title");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    if taken {
        return Ok(HttpResponse::BadRequest().json(json!({
            "title": "A role with this name already exists."
        })));
    }

    if let Some(parent) = payload.reports_to {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM roles WHERE id = ?)")
                .bind(parent)
                .fetch_one(pool.get_ref())
                .await
                .map_err(actix_web::error::ErrorInternalServerError)?;
        if !exists {
            return Ok(HttpResponse::BadRequest().json(json!({
                "reports_to": format!("Invalid pk \"{}\" - object does not exist.", parent)
            })));
        }
    }

    // Validate every permission id up front; the attach loop below must
    // not fail halfway through.
    let permissions = payload.permission.clone().unwrap_or_default();
    for permission_id in &permissions {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM permissions WHERE id = ?)")
                .bind(permission_id)
                .fetch_one(pool.get_ref())
                .await
                .map_err(actix_web::error::ErrorInternalServerError)?;
        if !exists {
            return Ok(HttpResponse::BadRequest().json(json!({
                "permission": format!("Invalid pk \"{}\" - object does not exist.", permission_id)
            })));
        }
    }

    let employment_type = payload.employment_type.unwrap_or_default().to_string();

    let result = sqlx::query(
        "INSERT INTO roles (title, description, employment_type, reports_to) VALUES (?, ?, ?, ?)",
    )
    .bind(title)
    .bind(&payload.description)
    .bind(&employment_type)
    .bind(payload.reports_to)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create role");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let role_id = result.last_insert_id();

    for permission_id in &permissions {
        sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
            .bind(role_id)
            .bind(permission_id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, role_id, "Failed to attach permission to role");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
    }

    Ok(HttpResponse::Created().json(RoleResponse {
        id: role_id,
        title: title.to_string(),
        description: payload.description.clone(),
        employment_type,
        reports_to: payload.reports_to,
        permission: permissions,
    }))
}

/// Retrieve a role by id
#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}",
    params(("id" = u64, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role found", body = RoleResponse),
        (status = 404, description = "Role not found")
    ),
    tag = "Role"
)]
pub async fn get_role(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {} FROM roles WHERE id = ?",
        ROLE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to fetch role");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match role {
        Some(role) => {
            let response = role_response(pool.get_ref(), role)
                .await
                .map_err(actix_web::error::ErrorInternalServerError)?;
            Ok(HttpResponse::Ok().json(response))
        }
        None => Ok(HttpResponse::NotFound().json(json!({"message": "Role not found"}))),
    }
}

/// Partially update a role (staff only)
#[utoipa::path(
    patch,
    path = "/api/v1/roles/{id}",
    params(("id" = u64, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Updated role", body = RoleResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Role"
)]
pub async fn update_role(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let id = path.into_inner();

    if let Some(title) = body.get("title").and_then(Value::as_str) {
        if title.trim().is_empty() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "title": "This field may not be blank."
            })));
        }
        // Uniqueness check excludes the row being updated.
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM roles WHERE LOWER(title) = ? AND id <> ? LIMIT 1)",
        )
        .bind(normalize_name(title))
        .bind(id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
        if taken {
            return Ok(HttpResponse::BadRequest().json(json!({
                "title": "A role with this name already exists."
            })));
        }
    }
    if let Some(et) = body.get("employment_type").and_then(Value::as_str) {
        if EmploymentType::from_str(et).is_err() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "employment_type": format!("\"{}\" is not a valid choice.", et)
            })));
        }
    }

    let update = build_update_sql(
        "roles",
        &body,
        &["title", "description", "employment_type", "reports_to"],
        "id",
        SqlValue::I64(id as i64),
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({"message": "Role not found"})));
    }

    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {} FROM roles WHERE id = ?",
        ROLE_COLUMNS
    ))
    .bind(id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(actix_web::error::ErrorInternalServerError)?;

    let response = role_response(pool.get_ref(), role)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(response))
}

/// Delete a role (staff only)
#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}",
    params(("id" = u64, Path, description = "Role ID")),
    responses(
        (status = 204, description = "Role deleted; employees keep a null role"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Role"
)]
pub async fn delete_role(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM roles WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete role");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({"message": "Role not found"})));
    }

    Ok(HttpResponse::NoContent().finish())
}
