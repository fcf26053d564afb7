//! Custom formula validation.
//!
//! Custom rate and amount formulas are free text written by accountants.
//! Validation is advisory at the form level but binding at save time: a
//! formula that fails any check here is rejected by the save handlers.

use serde::Serialize;

const OPERATORS: [char; 4] = ['+', '-', '*', '/'];

/// Verdict of a formula check: `valid` plus a message describing the first
/// violation found, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaCheck {
    pub valid: bool,
    pub message: Option<String>,
}

impl FormulaCheck {
    fn ok() -> Self {
        FormulaCheck {
            valid: true,
            message: None,
        }
    }

    fn reject(message: &str) -> Self {
        FormulaCheck {
            valid: false,
            message: Some(message.to_string()),
        }
    }
}

fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c == ' '
        || c == '.'
        || c == '('
        || c == ')'
        || is_operator(c)
}

/// Checks a custom formula against the form's syntax rules.
///
/// A formula is rejected when it is blank, contains a character outside
/// letters/digits/underscore/space and `+ - * / . ( )`, places two operator
/// characters next to each other (`**`, `//`, `+-`, ...), starts or ends
/// with an operator, or contains empty parentheses.
pub fn validate_formula(text: &str) -> FormulaCheck {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return FormulaCheck::reject("Formula cannot be empty");
    }

    if let Some(bad) = trimmed.chars().find(|c| !is_allowed_char(*c)) {
        return FormulaCheck::reject(&format!("Formula contains invalid character '{}'", bad));
    }

    let chars: Vec<char> = trimmed.chars().collect();

    if is_operator(chars[0]) {
        return FormulaCheck::reject("Formula cannot start with an operator");
    }

    if is_operator(chars[chars.len() - 1]) {
        return FormulaCheck::reject("Formula cannot end with an operator");
    }

    if chars
        .windows(2)
        .any(|pair| is_operator(pair[0]) && is_operator(pair[1]))
    {
        return FormulaCheck::reject("Formula cannot contain repeated operators");
    }

    if trimmed.contains("()") {
        return FormulaCheck::reject("Formula cannot contain empty parentheses");
    }

    FormulaCheck::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_rate_times_multiplier_is_valid() {
        let check = validate_formula("Rate Per Hour * 1.5");
        assert!(check.valid);
        assert!(check.message.is_none());
    }

    #[test]
    fn test_repeated_operators_rejected() {
        assert!(!validate_formula("Rate Per Hour ** 1.5").valid);
        assert!(!validate_formula("RATE // 2").valid);
        assert!(!validate_formula("RATE +- 2").valid);
        assert!(!validate_formula("RATE */ 2").valid);
    }

    #[test]
    fn test_leading_operator_rejected() {
        let check = validate_formula("* 5");
        assert!(!check.valid);
        assert_eq!(
            check.message.as_deref(),
            Some("Formula cannot start with an operator")
        );
    }

    #[test]
    fn test_trailing_operator_rejected() {
        let check = validate_formula("5 *");
        assert!(!check.valid);
        assert_eq!(
            check.message.as_deref(),
            Some("Formula cannot end with an operator")
        );
    }

    #[test]
    fn test_empty_parentheses_rejected() {
        assert!(!validate_formula("()").valid);
        assert!(!validate_formula("RATE * ()").valid);
    }

    #[test]
    fn test_illegal_characters_rejected() {
        assert!(!validate_formula("RATE * 2%").valid);
        assert!(!validate_formula("RATE = 5").valid);
        assert!(!validate_formula("₱100 * 2").valid);
    }

    #[test]
    fn test_blank_formula_rejected() {
        assert!(!validate_formula("").valid);
        assert!(!validate_formula("   ").valid);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(validate_formula("  RATE * HOURS  ").valid);
    }

    #[test]
    fn test_parenthesised_expression_is_valid() {
        assert!(validate_formula("(Rate Per Day + 50) * 2").valid);
    }

    #[test]
    fn test_underscores_and_digits_are_allowed() {
        assert!(validate_formula("night_diff_rate * 0.10").valid);
    }
}
