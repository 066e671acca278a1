use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Platform",
        "description": "Core platform team"
    })
)]
pub struct Team {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Platform")]
    pub name: String,

    #[schema(example = "Core platform team")]
    pub description: String,
}
