use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollPeriod {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date_from: NaiveDate,

    #[schema(example = "2024-01-16", value_type = String, format = "date")]
    pub date_to: NaiveDate,
}
