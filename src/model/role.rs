use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Employment type of a role (job title), stored as its display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    #[strum(serialize = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    #[strum(serialize = "Part-time")]
    PartTime,
    Contract,
    Associate,
}

impl Default for EmploymentType {
    fn default() -> Self {
        EmploymentType::FullTime
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Role {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Backend Engineer")]
    pub title: String,

    #[schema(example = "Builds and maintains backend services")]
    pub description: String,

    #[schema(example = "Full-time")]
    pub employment_type: String,

    /// Role this one reports to, forming a tree. Null for top-level roles.
    #[schema(example = 2, nullable = true)]
    pub reports_to: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn employment_type_round_trips_display_strings() {
        assert_eq!(EmploymentType::FullTime.to_string(), "Full-time");
        assert_eq!(
            EmploymentType::from_str("Part-time").unwrap(),
            EmploymentType::PartTime
        );
        assert!(EmploymentType::from_str("Freelance").is_err());
    }

    #[test]
    fn employment_type_defaults_to_full_time() {
        assert_eq!(EmploymentType::default(), EmploymentType::FullTime);
    }
}
