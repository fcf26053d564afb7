use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "name": "Regular OT Pay",
        "rate_type": "Regular Overtime",
        "base_rate_type": "Rate Per Hour",
        "rate_multiplier": "1.25",
        "rate_formula": "Rate Per Hour * 1.25",
        "amount_calculation_type": "rate_times_hours",
        "amount_formula": "RATE * HOURS",
        "status": "Active"
    })
)]
pub struct PayComponent {
    pub id: u64,

    #[schema(example = "Regular OT Pay")]
    pub name: String,

    /// One of the 23 rate-type labels.
    #[schema(example = "Regular Overtime")]
    pub rate_type: String,

    /// One of the 19 base-rate labels.
    #[schema(example = "Rate Per Hour")]
    pub base_rate_type: String,

    /// Fixed multiplier label or `custom`; absent for deduction types.
    #[schema(example = "1.25", nullable = true)]
    pub rate_multiplier: Option<String>,

    #[schema(example = "Rate Per Hour * 1.25")]
    pub rate_formula: String,

    /// Absent when the amount section does not apply to the rate type.
    #[schema(example = "rate_times_hours", nullable = true)]
    pub amount_calculation_type: Option<String>,

    #[schema(example = "RATE * HOURS", nullable = true)]
    pub amount_formula: Option<String>,

    /// `Active` or `Inactive`.
    #[schema(example = "Active")]
    pub status: String,
}
