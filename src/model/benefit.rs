use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// The four government-contribution document slots. Each slot holds at most
/// one uploaded document per (employee, period) record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum BenefitSlot {
    #[strum(serialize = "SSS")]
    Sss,
    #[strum(serialize = "Tax")]
    Tax,
    #[strum(serialize = "PhilHealth")]
    PhilHealth,
    #[strum(serialize = "PAG-IBIG")]
    PagIbig,
}

impl BenefitSlot {
    pub fn label(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct BenefitRecord {
    pub id: u64,
    pub employee_id: u64,
    pub period_id: u64,

    /// `pending` until released; `released` is terminal.
    #[schema(example = "pending")]
    pub status: String,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub released_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct BenefitFile {
    pub id: u64,
    pub record_id: u64,

    /// One of the four slot labels.
    #[schema(example = "SSS")]
    pub slot: String,

    #[schema(example = "sss_contribution_jan.pdf")]
    pub original_name: String,

    #[schema(example = "application/pdf")]
    pub file_type: String,

    #[schema(example = 48213)]
    pub file_size: u64,

    pub storage_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_four_fixed_slots() {
        let labels: Vec<&str> = BenefitSlot::iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["SSS", "Tax", "PhilHealth", "PAG-IBIG"]);
    }

    #[test]
    fn test_slot_labels_round_trip() {
        for slot in BenefitSlot::iter() {
            assert_eq!(BenefitSlot::from_str(slot.label()), Ok(slot));
        }
        assert!(BenefitSlot::from_str("Pagibig").is_err());
    }
}
