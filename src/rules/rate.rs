//! Rate-type taxonomy and rate-formula derivation.
//!
//! A pay component is anchored on a rate type (what kind of pay or deduction
//! it is) and a base rate column (which stored rate it scales). Deduction
//! types charge the base rate as-is; everything else scales it by a fixed
//! multiplier or a custom formula.

use rust_decimal::Decimal;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The 23 named rate categories a pay component can be built on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum RateType {
    #[strum(serialize = "Basic pay-Monthly")]
    BasicPayMonthly,
    #[strum(serialize = "Basic Pay-Semi-Monthly")]
    BasicPaySemiMonthly,
    #[strum(serialize = "Rate Per Day")]
    RatePerDay,
    #[strum(serialize = "Rate Per Hour")]
    RatePerHour,
    #[strum(serialize = "Rate Per Min")]
    RatePerMin,
    #[strum(serialize = "Regular Overtime")]
    RegularOvertime,
    #[strum(serialize = "Rest Day")]
    RestDay,
    #[strum(serialize = "Rest Day OT")]
    RestDayOt,
    #[strum(serialize = "Regular Holiday")]
    RegularHoliday,
    #[strum(serialize = "Regular Holiday OT")]
    RegularHolidayOt,
    #[strum(serialize = "Special Holiday")]
    SpecialHoliday,
    #[strum(serialize = "Special Holiday OT")]
    SpecialHolidayOt,
    #[strum(serialize = "Regular Holiday Rest Day")]
    RegularHolidayRestDay,
    #[strum(serialize = "Regular Holiday Rest Day OT")]
    RegularHolidayRestDayOt,
    #[strum(serialize = "Special Holiday Rest Day")]
    SpecialHolidayRestDay,
    #[strum(serialize = "Special Holiday Rest Day OT")]
    SpecialHolidayRestDayOt,
    #[strum(serialize = "Night Differential")]
    NightDifferential,
    #[strum(serialize = "Night Differential OT")]
    NightDifferentialOt,
    #[strum(serialize = "Regular Holiday Night Differential")]
    RegularHolidayNightDifferential,
    #[strum(serialize = "Special Holiday Night Differential")]
    SpecialHolidayNightDifferential,
    #[strum(serialize = "Undertime/Late")]
    UndertimeLate,
    #[strum(serialize = "Late/Undertime")]
    LateUndertime,
    #[strum(serialize = "Absences")]
    Absences,
}

impl RateType {
    /// The display label stored in the database and shown to clients.
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Deduction types charge the base rate directly: no multiplier is
    /// offered and the rate formula is the base rate column verbatim.
    pub fn is_deduction(self) -> bool {
        matches!(
            self,
            RateType::UndertimeLate | RateType::LateUndertime | RateType::Absences
        )
    }
}

/// The 19 stored base-rate columns a component can reference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum BaseRateType {
    #[strum(serialize = "Basic Pay")]
    BasicPay,
    #[strum(serialize = "Monthly Rate")]
    MonthlyRate,
    #[strum(serialize = "Semi-Monthly Rate")]
    SemiMonthlyRate,
    #[strum(serialize = "Rate Per Day")]
    RatePerDay,
    #[strum(serialize = "Rate Per Hour")]
    RatePerHour,
    #[strum(serialize = "Rate Per Min")]
    RatePerMin,
    #[strum(serialize = "Regular OT Rate")]
    RegularOtRate,
    #[strum(serialize = "Rest Day Rate")]
    RestDayRate,
    #[strum(serialize = "Rest Day OT Rate")]
    RestDayOtRate,
    #[strum(serialize = "Regular Holiday Rate")]
    RegularHolidayRate,
    #[strum(serialize = "Regular Holiday OT Rate")]
    RegularHolidayOtRate,
    #[strum(serialize = "Special Holiday Rate")]
    SpecialHolidayRate,
    #[strum(serialize = "Special Holiday OT Rate")]
    SpecialHolidayOtRate,
    #[strum(serialize = "Regular Holiday Rest Day Rate")]
    RegularHolidayRestDayRate,
    #[strum(serialize = "Special Holiday Rest Day Rate")]
    SpecialHolidayRestDayRate,
    #[strum(serialize = "Night Diff Rate")]
    NightDiffRate,
    #[strum(serialize = "Night Diff OT Rate")]
    NightDiffOtRate,
    #[strum(serialize = "Daily Late Rate")]
    DailyLateRate,
    #[strum(serialize = "Daily Absent Rate")]
    DailyAbsentRate,
}

impl BaseRateType {
    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// Rate multiplier selection. The fixed options mirror the statutory
/// premium ladder (1.25 regular OT, 1.30 special holiday, 2.0 regular
/// holiday, and so on); `Custom` switches the component to a free-text
/// rate formula.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum RateMultiplier {
    #[strum(serialize = "1.0")]
    X1_00,
    #[strum(serialize = "1.25")]
    X1_25,
    #[strum(serialize = "1.30")]
    X1_30,
    #[strum(serialize = "1.50")]
    X1_50,
    #[strum(serialize = "2.0")]
    X2_00,
    #[strum(serialize = "2.50")]
    X2_50,
    #[strum(serialize = "custom")]
    Custom,
}

impl RateMultiplier {
    /// The six numeric choices, in the order the selector presents them.
    pub const FIXED: [RateMultiplier; 6] = [
        RateMultiplier::X1_00,
        RateMultiplier::X1_25,
        RateMultiplier::X1_30,
        RateMultiplier::X1_50,
        RateMultiplier::X2_00,
        RateMultiplier::X2_50,
    ];

    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Numeric factor for preview arithmetic. `None` for `Custom`.
    pub fn factor(self) -> Option<Decimal> {
        match self {
            RateMultiplier::X1_00 => Some(Decimal::new(10, 1)),
            RateMultiplier::X1_25 => Some(Decimal::new(125, 2)),
            RateMultiplier::X1_30 => Some(Decimal::new(130, 2)),
            RateMultiplier::X1_50 => Some(Decimal::new(150, 2)),
            RateMultiplier::X2_00 => Some(Decimal::new(20, 1)),
            RateMultiplier::X2_50 => Some(Decimal::new(250, 2)),
            RateMultiplier::Custom => None,
        }
    }
}

/// Derives the stored rate formula for a numeric multiplier selection.
///
/// Deduction types never reach this: their formula is the base label
/// verbatim. Custom selections never reach this either: their formula is
/// the validated free text.
pub fn fixed_rate_formula(base: BaseRateType, multiplier: RateMultiplier) -> String {
    format!("{} * {}", base.label(), multiplier.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_rate_type_taxonomy_has_23_labels() {
        assert_eq!(RateType::iter().count(), 23);
    }

    #[test]
    fn test_base_rate_taxonomy_has_19_labels() {
        assert_eq!(BaseRateType::iter().count(), 19);
    }

    #[test]
    fn test_deduction_set_is_exactly_three() {
        let deductions: Vec<RateType> = RateType::iter().filter(|r| r.is_deduction()).collect();
        assert_eq!(
            deductions,
            vec![
                RateType::UndertimeLate,
                RateType::LateUndertime,
                RateType::Absences
            ]
        );
    }

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for rate_type in RateType::iter() {
            assert_eq!(RateType::from_str(rate_type.label()), Ok(rate_type));
        }
        for base in BaseRateType::iter() {
            assert_eq!(BaseRateType::from_str(base.label()), Ok(base));
        }
    }

    #[test]
    fn test_multiplier_labels_match_selector() {
        let labels: Vec<&str> = RateMultiplier::FIXED.iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["1.0", "1.25", "1.30", "1.50", "2.0", "2.50"]);
    }

    #[test]
    fn test_fixed_rate_formula_spells_base_and_multiplier() {
        let formula = fixed_rate_formula(BaseRateType::RatePerHour, RateMultiplier::X1_50);
        assert_eq!(formula, "Rate Per Hour * 1.50");
    }

    #[test]
    fn test_every_fixed_multiplier_derives_exact_formula() {
        for m in RateMultiplier::FIXED {
            let formula = fixed_rate_formula(BaseRateType::RatePerDay, m);
            assert_eq!(formula, format!("Rate Per Day * {}", m.label()));
        }
    }

    #[test]
    fn test_custom_multiplier_has_no_factor() {
        assert!(RateMultiplier::Custom.factor().is_none());
        for m in RateMultiplier::FIXED {
            assert!(m.factor().is_some());
        }
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        assert!(RateType::from_str("Overtime").is_err());
        assert!(BaseRateType::from_str("Hourly").is_err());
        assert!(RateMultiplier::from_str("1.5").is_err());
    }
}
