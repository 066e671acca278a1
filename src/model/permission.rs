use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Permission {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "can_view_payroll")]
    pub name: String,

    #[schema(example = "Grants read access to payroll records")]
    pub description: String,
}
