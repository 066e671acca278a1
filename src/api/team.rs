use crate::auth::auth::AuthUser;
use crate::model::team::Team;
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update, normalize_name};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateTeam {
    #[schema(example = "Platform")]
    pub name: String,
    #[schema(example = "Core platform team")]
    pub description: String,
}

#[derive(Deserialize, IntoParams)]
pub struct TeamQuery {
    /// Substring search on team name
    pub search: Option<String>,
}

async fn name_taken(pool: &MySqlPool, name: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM teams WHERE LOWER(name) = ? LIMIT 1)",
    )
    .bind(normalize_name(name))
    .fetch_one(pool)
    .await
}

/// List teams
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    params(TeamQuery),
    responses(
        (status = 200, description = "All teams, ordered by name", body = [Team]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn list_teams(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TeamQuery>,
) -> actix_web::Result<impl Responder> {
    let teams = match query.search.as_deref() {
        Some(search) => {
            sqlx::query_as::<_, Team>(
                "SELECT id, name, description FROM teams WHERE name LIKE ? ORDER BY name",
            )
            .bind(format!("%{}%", search))
            .fetch_all(pool.get_ref())
            .await
        }
        None => {
            sqlx::query_as::<_, Team>("SELECT id, name, description FROM teams ORDER BY name")
                .fetch_all(pool.get_ref())
                .await
        }
    }
    .map_err(|e| {
        error!(error = %e, "Failed to fetch teams");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(teams))
}

/// Create team
#[utoipa::path(
    post,
    path = "/api/v1/teams",
    request_body = CreateTeam,
    responses(
        (status = 201, description = "Team created", body = Team),
        (status = 400, description = "Blank or duplicate name", body = Object, example = json!({
            "name": "A team with this name already exists."
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn create_team(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTeam>,
) -> actix_web::Result<impl Responder> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "name": "This field may not be blank."
        })));
    }

    let taken = name_taken(pool.get_ref(), name).await.map_err(|e| {
        error!(error = %e, "Failed to check team name");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    if taken {
        return Ok(HttpResponse::BadRequest().json(json!({
            "name": "A team with this name already exists."
        })));
    }

    let result = sqlx::query("INSERT INTO teams (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(&payload.description)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create team");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(Team {
        id: result.last_insert_id(),
        name: name.to_string(),
        description: payload.description.clone(),
    }))
}

/// Retrieve a team by id
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}",
    params(("id" = u64, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team found", body = Team),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn get_team(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let team = sqlx::query_as::<_, Team>("SELECT id, name, description FROM teams WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch team");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match team {
        Some(t) => Ok(HttpResponse::Ok().json(t)),
        None => Ok(HttpResponse::NotFound().json(json!({"message": "Team not found"}))),
    }
}

/// Partially update a team
#[utoipa::path(
    patch,
    path = "/api/v1/teams/{id}",
    params(("id" = u64, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Updated team", body = Team),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn update_team(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    if let Some(name) = body.get("name").and_then(Value::as_str) {
        if name.trim().is_empty() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "name": "This field may not be blank."
            })));
        }
        // Uniqueness check excludes the row being updated.
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM teams WHERE LOWER(name) = ? AND id <> ? LIMIT 1)",
        )
        .bind(normalize_name(name))
        .bind(id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;
        if taken {
            return Ok(HttpResponse::BadRequest().json(json!({
                "name": "A team with this name already exists."
            })));
        }
    }

    let update = build_update_sql(
        "teams",
        &body,
        &["name", "description"],
        "id",
        SqlValue::I64(id as i64),
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({"message": "Team not found"})));
    }

    let updated = sqlx::query_as::<_, Team>("SELECT id, name, description FROM teams WHERE id = ?")
        .bind(id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a team
#[utoipa::path(
    delete,
    path = "/api/v1/teams/{id}",
    params(("id" = u64, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn delete_team(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM teams WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete team");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({"message": "Team not found"})));
    }

    Ok(HttpResponse::NoContent().finish())
}
