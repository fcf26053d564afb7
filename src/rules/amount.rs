//! Amount-calculation strategy rules.
//!
//! Once a component's rate is settled, the amount strategy decides what the
//! rate is multiplied against (hours, days, minutes) or defers to a custom
//! formula. Which strategies are legal depends on the rate type, and flat
//! rate types skip the amount section entirely.

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::rules::rate::RateType;

/// How a component's final amount is computed from its rate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum AmountCalculationType {
    #[strum(serialize = "rate_times_hours")]
    RateTimesHours,
    #[strum(serialize = "rate_times_days")]
    RateTimesDays,
    #[strum(serialize = "rate_times_minutes")]
    RateTimesMinutes,
    #[strum(serialize = "custom")]
    Custom,
}

impl AmountCalculationType {
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// The canned formula for a non-custom strategy.
    pub fn default_formula(self) -> Option<&'static str> {
        match self {
            AmountCalculationType::RateTimesHours => Some("RATE * HOURS"),
            AmountCalculationType::RateTimesDays => Some("RATE * DAYS"),
            AmountCalculationType::RateTimesMinutes => Some("RATE * MINUTES"),
            AmountCalculationType::Custom => None,
        }
    }
}

/// Flat rate types carry their amount in the rate itself, so the amount
/// section does not apply to them at all.
pub fn shows_amount_calculation(rate_type: RateType) -> bool {
    !matches!(
        rate_type,
        RateType::RatePerDay
            | RateType::RatePerHour
            | RateType::RatePerMin
            | RateType::BasicPayMonthly
            | RateType::BasicPaySemiMonthly
    )
}

/// The legal amount strategies for a rate type, default first.
///
/// Time-based deductions are restricted to their natural unit plus custom;
/// absences count days; every other rate type gets the full set.
pub fn amount_options(rate_type: RateType) -> &'static [AmountCalculationType] {
    match rate_type {
        RateType::UndertimeLate | RateType::LateUndertime => &[
            AmountCalculationType::RateTimesMinutes,
            AmountCalculationType::Custom,
        ],
        RateType::Absences => &[
            AmountCalculationType::RateTimesDays,
            AmountCalculationType::Custom,
        ],
        _ => &[
            AmountCalculationType::RateTimesHours,
            AmountCalculationType::RateTimesDays,
            AmountCalculationType::RateTimesMinutes,
            AmountCalculationType::Custom,
        ],
    }
}

/// The strategy preselected when the section first appears.
pub fn default_amount_option(rate_type: RateType) -> AmountCalculationType {
    amount_options(rate_type)[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_flat_rate_types_hide_amount_section() {
        for rate_type in [
            RateType::RatePerDay,
            RateType::RatePerHour,
            RateType::RatePerMin,
            RateType::BasicPayMonthly,
            RateType::BasicPaySemiMonthly,
        ] {
            assert!(!shows_amount_calculation(rate_type), "{rate_type} should hide");
        }
    }

    #[test]
    fn test_overtime_shows_amount_section() {
        assert!(shows_amount_calculation(RateType::RegularOvertime));
        assert!(shows_amount_calculation(RateType::RegularHolidayOt));
    }

    #[test]
    fn test_late_types_offer_minutes_plus_custom() {
        for rate_type in [RateType::UndertimeLate, RateType::LateUndertime] {
            assert_eq!(
                amount_options(rate_type),
                &[
                    AmountCalculationType::RateTimesMinutes,
                    AmountCalculationType::Custom
                ]
            );
            assert_eq!(
                default_amount_option(rate_type),
                AmountCalculationType::RateTimesMinutes
            );
        }
    }

    #[test]
    fn test_absences_offer_days_plus_custom() {
        assert_eq!(
            amount_options(RateType::Absences),
            &[
                AmountCalculationType::RateTimesDays,
                AmountCalculationType::Custom
            ]
        );
        assert_eq!(
            default_amount_option(RateType::Absences),
            AmountCalculationType::RateTimesDays
        );
    }

    #[test]
    fn test_other_types_offer_full_set_with_hours_default() {
        let options = amount_options(RateType::RegularOvertime);
        assert_eq!(options.len(), 4);
        assert_eq!(options[0], AmountCalculationType::RateTimesHours);
        assert_eq!(
            default_amount_option(RateType::RegularOvertime),
            AmountCalculationType::RateTimesHours
        );
    }

    #[test]
    fn test_default_formulas() {
        assert_eq!(
            AmountCalculationType::RateTimesHours.default_formula(),
            Some("RATE * HOURS")
        );
        assert_eq!(
            AmountCalculationType::RateTimesDays.default_formula(),
            Some("RATE * DAYS")
        );
        assert_eq!(
            AmountCalculationType::RateTimesMinutes.default_formula(),
            Some("RATE * MINUTES")
        );
        assert_eq!(AmountCalculationType::Custom.default_formula(), None);
    }

    #[test]
    fn test_every_rate_type_has_a_default_in_its_options() {
        for rate_type in RateType::iter() {
            let options = amount_options(rate_type);
            assert!(options.contains(&default_amount_option(rate_type)));
            assert!(options.contains(&AmountCalculationType::Custom));
        }
    }
}
