use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Coarse access tier, distinct from the `Role` entity (job title).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum AccessLevel {
    Admin,
    Manager,
    Employee,
    Guest,
}

impl AccessLevel {
    /// Admin and Manager may approve requests and see every record.
    pub fn is_privileged(self) -> bool {
        matches!(self, AccessLevel::Admin | AccessLevel::Manager)
    }
}

impl Default for AccessLevel {
    fn default() -> Self {
        AccessLevel::Employee
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum EmploymentStatus {
    Active,
    Inactive,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "4F2A9C01BD37",
        "user_id": 7,
        "phone": "017123456",
        "birth_date": "1990-04-02",
        "join_date": "2024-01-01",
        "gender": "M",
        "social_handle": "@jdoe",
        "employment_status": "Active",
        "access_level": "Employee",
        "role_id": 3
    })
)]
pub struct Employee {
    /// 12 uppercase hex chars, generated once at creation, immutable.
    #[schema(example = "4F2A9C01BD37")]
    pub id: String,

    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = "017123456", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "1990-04-02", value_type = String, format = "date", nullable = true)]
    pub birth_date: Option<NaiveDate>,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub join_date: NaiveDate,

    #[schema(example = "M", nullable = true)]
    pub gender: Option<String>,

    #[schema(example = "@jdoe", nullable = true)]
    pub social_handle: Option<String>,

    #[schema(example = "Active")]
    pub employment_status: String,

    #[schema(example = "Employee")]
    pub access_level: String,

    #[schema(example = 3, nullable = true)]
    pub role_id: Option<u64>,
}

/// Generate a fresh employee identifier: the first 12 hex chars of a
/// v4 UUID, uppercased. Assigned once at insert and never changed.
pub fn new_employee_id() -> String {
    let hex = Uuid::new_v4().to_simple().to_string();
    hex[..12].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn employee_id_is_twelve_uppercase_hex_chars() {
        let id = new_employee_id();
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, id.to_uppercase());
    }

    #[test]
    fn employee_ids_are_unique_enough() {
        let a = new_employee_id();
        let b = new_employee_id();
        assert_ne!(a, b);
    }

    #[test]
    fn only_admin_and_manager_are_privileged() {
        assert!(AccessLevel::Admin.is_privileged());
        assert!(AccessLevel::Manager.is_privileged());
        assert!(!AccessLevel::Employee.is_privileged());
        assert!(!AccessLevel::Guest.is_privileged());
    }

    #[test]
    fn access_level_parses_stored_strings() {
        assert_eq!(AccessLevel::from_str("Manager").unwrap(), AccessLevel::Manager);
        assert!(AccessLevel::from_str("Superuser").is_err());
    }
}
