use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Deserialize)]
pub struct RegisterReqDto {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginReqDto {
    pub username: String,
    pub password: String,
}

/// Login-time row: user joined with the (optional) linked employee record.
#[derive(FromRow)]
pub struct UserAuthSql {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub is_staff: bool,
    pub employee_id: Option<String>,
    pub access_level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub is_staff: bool,
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record.
    pub employee_id: Option<String>,
    /// Access level of the linked employee record, if any.
    pub access_level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
