use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One image per employee; a second upload replaces the row in place.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeImage {
    #[schema(example = "4F2A9C01BD37")]
    pub employee_id: String,

    #[schema(example = "employee_management/images/4F2A9C01BD37.png")]
    pub image: String,
}
