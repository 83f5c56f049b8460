//! Range checks applied before a loan is handed to the calculator.
//!
//! None of these functions fail: each returns a verdict plus an optional
//! message so a caller can report every field at once.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{LoanSpecification, RepaymentFrequency};
use crate::types::Money;
use crate::{LoanCalcError, LoanCalcResult};

pub const MAX_LOAN_AMOUNT: Decimal = dec!(10_000_000);
pub const MAX_INTEREST_RATE: Decimal = dec!(20);
pub const MAX_TERM_YEARS: Decimal = dec!(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        ValidationResult {
            is_valid: true,
            error: None,
        }
    }

    fn fail(message: &str) -> Self {
        ValidationResult {
            is_valid: false,
            error: Some(message.to_string()),
        }
    }
}

/// A rejected field and the message to show for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Raw numeric loan request, before the term is known to be a whole number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    pub annual_rate_percent: Decimal,
    pub term_years: Decimal,
    #[serde(default)]
    pub frequency: RepaymentFrequency,
}

impl LoanInput {
    pub fn validate(&self) -> Vec<FieldError> {
        validate_fields(self.principal, self.annual_rate_percent, self.term_years)
    }

    /// Convert to a [`LoanSpecification`], failing on the first invalid field.
    pub fn to_specification(&self) -> LoanCalcResult<LoanSpecification> {
        if let Some(first) = self.validate().into_iter().next() {
            return Err(LoanCalcError::InvalidInput {
                field: first.field.into(),
                reason: first.message,
            });
        }
        let term_years = self.term_years.to_u32().ok_or_else(|| LoanCalcError::InvalidInput {
            field: "term_years".into(),
            reason: "Loan term must be a whole number of years".into(),
        })?;
        Ok(LoanSpecification {
            principal: self.principal,
            annual_rate_percent: self.annual_rate_percent,
            term_years,
            frequency: self.frequency,
        })
    }
}

impl From<&LoanSpecification> for LoanInput {
    fn from(spec: &LoanSpecification) -> Self {
        LoanInput {
            principal: spec.principal,
            annual_rate_percent: spec.annual_rate_percent,
            term_years: Decimal::from(spec.term_years),
            frequency: spec.frequency,
        }
    }
}

pub fn validate_loan_amount(amount: Money) -> ValidationResult {
    if amount <= Decimal::ZERO {
        return ValidationResult::fail("Loan amount must be greater than 0");
    }
    if amount > MAX_LOAN_AMOUNT {
        return ValidationResult::fail("Loan amount cannot exceed $10,000,000");
    }
    ValidationResult::ok()
}

pub fn validate_interest_rate(rate: Decimal) -> ValidationResult {
    if rate < Decimal::ZERO {
        return ValidationResult::fail("Interest rate cannot be negative");
    }
    if rate > MAX_INTEREST_RATE {
        return ValidationResult::fail("Interest rate cannot exceed 20%");
    }
    ValidationResult::ok()
}

pub fn validate_loan_term(years: Decimal) -> ValidationResult {
    if years <= Decimal::ZERO {
        return ValidationResult::fail("Loan term must be at least 1 year");
    }
    if years > MAX_TERM_YEARS {
        return ValidationResult::fail("Loan term cannot exceed 30 years");
    }
    if !years.fract().is_zero() {
        return ValidationResult::fail("Loan term must be a whole number of years");
    }
    ValidationResult::ok()
}

/// Run every field check, returning one entry per failing field in
/// declaration order.
pub fn validate_fields(principal: Money, rate: Decimal, term_years: Decimal) -> Vec<FieldError> {
    [
        ("principal", validate_loan_amount(principal)),
        ("annual_rate_percent", validate_interest_rate(rate)),
        ("term_years", validate_loan_term(term_years)),
    ]
    .into_iter()
    .filter_map(|(field, verdict)| {
        if verdict.is_valid {
            None
        } else {
            Some(FieldError {
                field,
                message: verdict.error.unwrap_or_default(),
            })
        }
    })
    .collect()
}

pub fn validate_specification(spec: &LoanSpecification) -> Vec<FieldError> {
    validate_fields(
        spec.principal,
        spec.annual_rate_percent,
        Decimal::from(spec.term_years),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn assert_rejected(result: ValidationResult) {
        assert!(!result.is_valid);
        assert!(result.error.as_deref().is_some_and(|m| !m.is_empty()));
    }

    #[test]
    fn test_loan_amount_bounds() {
        assert_rejected(validate_loan_amount(Decimal::ZERO));
        assert_rejected(validate_loan_amount(dec!(-5)));
        assert_rejected(validate_loan_amount(dec!(10_000_001)));
        assert_eq!(validate_loan_amount(dec!(10_000_000)), ValidationResult::ok());
        assert_eq!(validate_loan_amount(dec!(1)), ValidationResult::ok());
    }

    #[test]
    fn test_loan_amount_messages() {
        assert_eq!(
            validate_loan_amount(Decimal::ZERO).error.as_deref(),
            Some("Loan amount must be greater than 0")
        );
        assert_eq!(
            validate_loan_amount(dec!(10_000_001)).error.as_deref(),
            Some("Loan amount cannot exceed $10,000,000")
        );
    }

    #[test]
    fn test_interest_rate_bounds() {
        assert_rejected(validate_interest_rate(dec!(-1)));
        assert_rejected(validate_interest_rate(dec!(20.01)));
        assert!(validate_interest_rate(dec!(20)).is_valid);
        assert!(validate_interest_rate(Decimal::ZERO).is_valid);
    }

    #[test]
    fn test_loan_term_bounds() {
        assert_rejected(validate_loan_term(Decimal::ZERO));
        assert_rejected(validate_loan_term(dec!(31)));
        assert_rejected(validate_loan_term(dec!(2.5)));
        assert!(validate_loan_term(dec!(30)).is_valid);
        assert!(validate_loan_term(dec!(1)).is_valid);
        assert_eq!(
            validate_loan_term(dec!(2.5)).error.as_deref(),
            Some("Loan term must be a whole number of years")
        );
    }

    #[test]
    fn test_validate_fields_reports_each_failure_in_order() {
        let errors = validate_fields(Decimal::ZERO, dec!(25), dec!(2.5));
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["principal", "annual_rate_percent", "term_years"]);
    }

    #[test]
    fn test_validate_fields_all_good() {
        assert!(validate_fields(dec!(500_000), dec!(6.5), dec!(30)).is_empty());
    }

    #[test]
    fn test_loan_input_to_specification() {
        let input = LoanInput {
            principal: dec!(500_000),
            annual_rate_percent: dec!(6.5),
            term_years: dec!(30),
            frequency: RepaymentFrequency::Monthly,
        };
        let spec = input.to_specification().unwrap();
        assert_eq!(spec.term_years, 30);
        assert_eq!(spec.frequency, RepaymentFrequency::Monthly);
        assert_eq!(LoanInput::from(&spec), input);
    }

    #[test]
    fn test_loan_input_fractional_term_rejected() {
        let input = LoanInput {
            principal: dec!(500_000),
            annual_rate_percent: dec!(6.5),
            term_years: dec!(2.5),
            frequency: RepaymentFrequency::Weekly,
        };
        match input.to_specification().unwrap_err() {
            LoanCalcError::InvalidInput { field, .. } => assert_eq!(field, "term_years"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
