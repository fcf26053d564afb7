use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AuditEntry {
    pub id: u64,
    pub user_id: u64,

    #[schema(example = "jdcruz")]
    pub username: String,

    #[schema(example = "release")]
    pub action: String,

    #[schema(example = "benefit_record")]
    pub entity: String,

    #[schema(nullable = true)]
    pub entity_id: Option<u64>,

    #[schema(example = "Released payslip for employee 12, period 3", nullable = true)]
    pub detail: Option<String>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
