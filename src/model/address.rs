use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Address {
    #[schema(example = "4F2A9C01BD37")]
    pub employee_id: String,

    #[schema(example = "Nigeria")]
    pub country: String,

    #[schema(example = "Lagos")]
    pub city: String,
}
