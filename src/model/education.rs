use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Education {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "University of Lagos")]
    pub institution: String,

    #[schema(example = "Computer Science", nullable = true)]
    pub course_of_study: Option<String>,

    #[schema(example = "2015-09-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2019-07-01", value_type = String, format = "date")]
    pub end_date: NaiveDate,
}
