//! Live preview derivation for the pay-component form.
//!
//! The preview is a pure projection of the current field values. It is
//! re-derived on every evaluation and never stored apart from the formula
//! fields it mirrors.

use rust_decimal::Decimal;

use crate::rules::rate::{RateMultiplier, RateType};

/// Base amount the worked example assumes.
const EXAMPLE_BASE: u32 = 100;

/// Preview lines for a component draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentPreview {
    /// "Rate Formula: ..." line mirroring the derived rate formula.
    pub rate_line: String,
    /// Worked example at a base of ₱100, when the multiplier is numeric.
    pub example_line: Option<String>,
    /// "Amount Formula: ..." line, when the amount section applies.
    pub amount_line: Option<String>,
}

/// Builds the preview for the current selections.
///
/// `rate_formula` and `amount_formula` are the already-derived formula
/// strings; the multiplier is used only to compute the worked example.
pub fn component_preview(
    rate_type: RateType,
    multiplier: Option<RateMultiplier>,
    rate_formula: &str,
    amount_formula: Option<&str>,
) -> ComponentPreview {
    let example_line = if rate_type.is_deduction() {
        None
    } else {
        multiplier.and_then(RateMultiplier::factor).map(|factor| {
            let result = (Decimal::from(EXAMPLE_BASE) * factor).normalize();
            format!("Example: ₱{} → ₱{}", EXAMPLE_BASE, result)
        })
    };

    ComponentPreview {
        rate_line: format!("Rate Formula: {}", rate_formula),
        example_line,
        amount_line: amount_formula.map(|f| format!("Amount Formula: {}", f)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::rate::{BaseRateType, fixed_rate_formula};

    #[test]
    fn test_multiplier_preview_shows_formula_and_example() {
        let formula = fixed_rate_formula(BaseRateType::RatePerHour, RateMultiplier::X1_50);
        let preview = component_preview(
            RateType::RegularOvertime,
            Some(RateMultiplier::X1_50),
            &formula,
            Some("RATE * HOURS"),
        );

        assert_eq!(preview.rate_line, "Rate Formula: Rate Per Hour * 1.50");
        assert_eq!(preview.example_line.as_deref(), Some("Example: ₱100 → ₱150"));
        assert_eq!(preview.amount_line.as_deref(), Some("Amount Formula: RATE * HOURS"));
    }

    #[test]
    fn test_double_rate_example() {
        let formula = fixed_rate_formula(BaseRateType::RegularHolidayRate, RateMultiplier::X2_00);
        let preview = component_preview(
            RateType::RegularHoliday,
            Some(RateMultiplier::X2_00),
            &formula,
            Some("RATE * HOURS"),
        );

        assert_eq!(preview.example_line.as_deref(), Some("Example: ₱100 → ₱200"));
    }

    #[test]
    fn test_fractional_example_keeps_cents() {
        let formula = fixed_rate_formula(BaseRateType::RatePerDay, RateMultiplier::X1_25);
        let preview = component_preview(
            RateType::RestDay,
            Some(RateMultiplier::X1_25),
            &formula,
            Some("RATE * DAYS"),
        );

        assert_eq!(preview.example_line.as_deref(), Some("Example: ₱100 → ₱125"));
    }

    #[test]
    fn test_deduction_preview_has_no_example() {
        let preview = component_preview(
            RateType::Absences,
            None,
            BaseRateType::DailyAbsentRate.label(),
            Some("RATE * DAYS"),
        );

        assert_eq!(preview.rate_line, "Rate Formula: Daily Absent Rate");
        assert!(preview.example_line.is_none());
    }

    #[test]
    fn test_custom_multiplier_has_no_example() {
        let preview = component_preview(
            RateType::RegularOvertime,
            Some(RateMultiplier::Custom),
            "Rate Per Hour * 1.5 + 10",
            Some("RATE * HOURS"),
        );

        assert!(preview.example_line.is_none());
    }

    #[test]
    fn test_flat_rate_has_no_amount_line() {
        let formula = fixed_rate_formula(BaseRateType::RatePerHour, RateMultiplier::X1_00);
        let preview = component_preview(
            RateType::RatePerHour,
            Some(RateMultiplier::X1_00),
            &formula,
            None,
        );

        assert!(preview.amount_line.is_none());
        assert_eq!(preview.example_line.as_deref(), Some("Example: ₱100 → ₱100"));
    }
}
