//! Pay-component rule engine.
//!
//! Pure decision logic for the pay-component form: which rate types take a
//! multiplier, which amount strategies are legal, how formula strings are
//! derived, and whether a custom formula is acceptable. Nothing in this
//! module touches the database; the API layer feeds it raw field values and
//! persists whatever it resolves.

pub mod amount;
pub mod formula;
pub mod period;
pub mod preview;
pub mod rate;

use std::str::FromStr;

use thiserror::Error;

use crate::rules::amount::{
    AmountCalculationType, amount_options, default_amount_option, shows_amount_calculation,
};
use crate::rules::formula::validate_formula;
use crate::rules::rate::{BaseRateType, RateMultiplier, RateType, fixed_rate_formula};

/// A violation of the component rules. Every variant maps to a 400-level
/// response with its display message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Unknown rate type '{0}'")]
    UnknownRateType(String),

    #[error("Unknown base rate type '{0}'")]
    UnknownBaseRateType(String),

    #[error("Unknown rate multiplier '{0}'")]
    UnknownMultiplier(String),

    #[error("Unknown amount calculation type '{0}'")]
    UnknownAmountCalculation(String),

    #[error("A rate multiplier is required for rate type '{rate_type}'")]
    MultiplierRequired { rate_type: String },

    #[error("'{option}' is not a legal amount calculation for rate type '{rate_type}'")]
    AmountOptionNotAllowed { rate_type: String, option: String },

    #[error("A custom {field} formula is required when 'custom' is selected")]
    CustomFormulaRequired { field: &'static str },

    #[error("Invalid {field} formula: {message}")]
    InvalidFormula { field: &'static str, message: String },
}

/// Raw field values as submitted by a client.
#[derive(Debug, Default, Clone)]
pub struct ComponentInput<'a> {
    pub rate_type: &'a str,
    pub base_rate_type: &'a str,
    pub rate_multiplier: Option<&'a str>,
    pub custom_rate_formula: Option<&'a str>,
    pub amount_calculation_type: Option<&'a str>,
    pub custom_amount_formula: Option<&'a str>,
}

/// The fully-derived component fields, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedComponent {
    pub rate_type: RateType,
    pub base_rate_type: BaseRateType,
    pub rate_multiplier: Option<RateMultiplier>,
    pub rate_formula: String,
    pub amount_calculation_type: Option<AmountCalculationType>,
    pub amount_formula: Option<String>,
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Resolves and validates a component submission.
///
/// Deduction types ignore any submitted multiplier and derive the base rate
/// label verbatim. Flat rate types ignore the amount section entirely. A
/// `custom` selection in either position requires a formula that passes
/// [`validate_formula`]; a failing formula rejects the whole save.
pub fn resolve(input: &ComponentInput) -> Result<ResolvedComponent, RuleError> {
    let rate_type = RateType::from_str(input.rate_type)
        .map_err(|_| RuleError::UnknownRateType(input.rate_type.to_string()))?;
    let base_rate_type = BaseRateType::from_str(input.base_rate_type)
        .map_err(|_| RuleError::UnknownBaseRateType(input.base_rate_type.to_string()))?;

    let (rate_multiplier, rate_formula) = if rate_type.is_deduction() {
        // Base rate applies unmodified; any submitted multiplier is ignored.
        (None, base_rate_type.label().to_string())
    } else {
        let raw = input
            .rate_multiplier
            .ok_or_else(|| RuleError::MultiplierRequired {
                rate_type: rate_type.label().to_string(),
            })?;
        let multiplier = RateMultiplier::from_str(raw)
            .map_err(|_| RuleError::UnknownMultiplier(raw.to_string()))?;

        let formula = match multiplier {
            RateMultiplier::Custom => {
                let text = non_blank(input.custom_rate_formula)
                    .ok_or(RuleError::CustomFormulaRequired { field: "rate" })?;
                let check = validate_formula(text);
                if !check.valid {
                    return Err(RuleError::InvalidFormula {
                        field: "rate",
                        message: check.message.unwrap_or_default(),
                    });
                }
                text.to_string()
            }
            _ => fixed_rate_formula(base_rate_type, multiplier),
        };

        (Some(multiplier), formula)
    };

    let (amount_calculation_type, amount_formula) = if !shows_amount_calculation(rate_type) {
        (None, None)
    } else {
        let calc = match input.amount_calculation_type {
            None => default_amount_option(rate_type),
            Some(raw) => AmountCalculationType::from_str(raw)
                .map_err(|_| RuleError::UnknownAmountCalculation(raw.to_string()))?,
        };

        if !amount_options(rate_type).contains(&calc) {
            return Err(RuleError::AmountOptionNotAllowed {
                rate_type: rate_type.label().to_string(),
                option: calc.label().to_string(),
            });
        }

        let formula = match calc {
            AmountCalculationType::Custom => {
                let text = non_blank(input.custom_amount_formula)
                    .ok_or(RuleError::CustomFormulaRequired { field: "amount" })?;
                let check = validate_formula(text);
                if !check.valid {
                    return Err(RuleError::InvalidFormula {
                        field: "amount",
                        message: check.message.unwrap_or_default(),
                    });
                }
                text.to_string()
            }
            other => other
                .default_formula()
                .expect("non-custom options carry a formula")
                .to_string(),
        };

        (Some(calc), Some(formula))
    };

    Ok(ResolvedComponent {
        rate_type,
        base_rate_type,
        rate_multiplier,
        rate_formula,
        amount_calculation_type,
        amount_formula,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(rate_type: &'a str, base: &'a str) -> ComponentInput<'a> {
        ComponentInput {
            rate_type,
            base_rate_type: base,
            ..Default::default()
        }
    }

    #[test]
    fn test_deduction_uses_base_rate_verbatim() {
        for rate_type in ["Undertime/Late", "Late/Undertime", "Absences"] {
            let base = if rate_type == "Absences" {
                "Daily Absent Rate"
            } else {
                "Daily Late Rate"
            };
            let resolved = resolve(&input(rate_type, base)).unwrap();
            assert_eq!(resolved.rate_formula, base);
            assert!(resolved.rate_multiplier.is_none());
        }
    }

    #[test]
    fn test_deduction_ignores_submitted_multiplier() {
        let mut draft = input("Absences", "Daily Absent Rate");
        draft.rate_multiplier = Some("2.0");
        let resolved = resolve(&draft).unwrap();
        assert!(resolved.rate_multiplier.is_none());
        assert_eq!(resolved.rate_formula, "Daily Absent Rate");
    }

    #[test]
    fn test_fixed_multiplier_derives_formula() {
        let mut draft = input("Regular Overtime", "Rate Per Hour");
        draft.rate_multiplier = Some("1.25");
        let resolved = resolve(&draft).unwrap();
        assert_eq!(resolved.rate_formula, "Rate Per Hour * 1.25");
        assert_eq!(resolved.rate_multiplier, Some(RateMultiplier::X1_25));
    }

    #[test]
    fn test_multiplier_required_for_non_deduction() {
        let err = resolve(&input("Regular Overtime", "Rate Per Hour")).unwrap_err();
        assert!(matches!(err, RuleError::MultiplierRequired { .. }));
    }

    #[test]
    fn test_custom_multiplier_requires_formula() {
        let mut draft = input("Regular Overtime", "Rate Per Hour");
        draft.rate_multiplier = Some("custom");
        let err = resolve(&draft).unwrap_err();
        assert_eq!(err, RuleError::CustomFormulaRequired { field: "rate" });
    }

    #[test]
    fn test_invalid_custom_formula_blocks_save() {
        let mut draft = input("Regular Overtime", "Rate Per Hour");
        draft.rate_multiplier = Some("custom");
        draft.custom_rate_formula = Some("Rate Per Hour ** 1.5");
        let err = resolve(&draft).unwrap_err();
        assert!(matches!(err, RuleError::InvalidFormula { field: "rate", .. }));
    }

    #[test]
    fn test_valid_custom_formula_is_stored_trimmed() {
        let mut draft = input("Regular Overtime", "Rate Per Hour");
        draft.rate_multiplier = Some("custom");
        draft.custom_rate_formula = Some("  Rate Per Hour * 1.5 + 10  ");
        let resolved = resolve(&draft).unwrap();
        assert_eq!(resolved.rate_formula, "Rate Per Hour * 1.5 + 10");
    }

    #[test]
    fn test_flat_rate_types_store_no_amount_fields() {
        for rate_type in [
            "Rate Per Day",
            "Rate Per Hour",
            "Rate Per Min",
            "Basic pay-Monthly",
            "Basic Pay-Semi-Monthly",
        ] {
            let mut draft = input(rate_type, "Rate Per Hour");
            draft.rate_multiplier = Some("1.0");
            draft.amount_calculation_type = Some("rate_times_hours");
            let resolved = resolve(&draft).unwrap();
            assert!(resolved.amount_calculation_type.is_none());
            assert!(resolved.amount_formula.is_none());
        }
    }

    #[test]
    fn test_amount_defaults_by_rate_type() {
        let mut ot = input("Regular Overtime", "Rate Per Hour");
        ot.rate_multiplier = Some("1.25");
        let resolved = resolve(&ot).unwrap();
        assert_eq!(
            resolved.amount_calculation_type,
            Some(AmountCalculationType::RateTimesHours)
        );
        assert_eq!(resolved.amount_formula.as_deref(), Some("RATE * HOURS"));

        let late = resolve(&input("Undertime/Late", "Daily Late Rate")).unwrap();
        assert_eq!(
            late.amount_calculation_type,
            Some(AmountCalculationType::RateTimesMinutes)
        );
        assert_eq!(late.amount_formula.as_deref(), Some("RATE * MINUTES"));

        let absent = resolve(&input("Absences", "Daily Absent Rate")).unwrap();
        assert_eq!(
            absent.amount_calculation_type,
            Some(AmountCalculationType::RateTimesDays)
        );
        assert_eq!(absent.amount_formula.as_deref(), Some("RATE * DAYS"));
    }

    #[test]
    fn test_restricted_amount_option_is_rejected() {
        let mut draft = input("Undertime/Late", "Daily Late Rate");
        draft.amount_calculation_type = Some("rate_times_hours");
        let err = resolve(&draft).unwrap_err();
        assert!(matches!(err, RuleError::AmountOptionNotAllowed { .. }));
    }

    #[test]
    fn test_custom_amount_formula_is_validated() {
        let mut draft = input("Absences", "Daily Absent Rate");
        draft.amount_calculation_type = Some("custom");
        draft.custom_amount_formula = Some("RATE * ()");
        let err = resolve(&draft).unwrap_err();
        assert!(matches!(err, RuleError::InvalidFormula { field: "amount", .. }));
    }

    #[test]
    fn test_unknown_labels_are_rejected() {
        assert!(matches!(
            resolve(&input("Overtime", "Rate Per Hour")).unwrap_err(),
            RuleError::UnknownRateType(_)
        ));
        assert!(matches!(
            resolve(&input("Regular Overtime", "Hourly")).unwrap_err(),
            RuleError::UnknownBaseRateType(_)
        ));
    }
}
