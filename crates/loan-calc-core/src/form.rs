//! Raw form state for an interactive calculator.
//!
//! Every edit returns a fresh [`FormOutcome`] produced by [`LoanForm::recompute`];
//! nothing is cached between edits and the calculator itself keeps no state.

use serde::Serialize;

use crate::amortization::{self, RepaymentFrequency, RepaymentResult};
use crate::presentation::{parse_currency_input, parse_rate_input, parse_term_input, strip_non_digits};
use crate::validation::{FieldError, LoanInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanForm {
    loan_amount: String,
    interest_rate: String,
    loan_term_years: String,
    frequency: RepaymentFrequency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FormOutcome {
    Computed { result: RepaymentResult },
    Invalid { errors: Vec<FieldError> },
}

impl Default for LoanForm {
    fn default() -> Self {
        LoanForm {
            loan_amount: "500000".into(),
            interest_rate: "6.5".into(),
            loan_term_years: "30".into(),
            frequency: RepaymentFrequency::Fortnightly,
        }
    }
}

impl LoanForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loan_amount(&self) -> &str {
        &self.loan_amount
    }

    pub fn interest_rate(&self) -> &str {
        &self.interest_rate
    }

    pub fn loan_term_years(&self) -> &str {
        &self.loan_term_years
    }

    pub fn frequency(&self) -> RepaymentFrequency {
        self.frequency
    }

    /// Currency fields only ever hold digits.
    pub fn set_loan_amount(&mut self, raw: &str) -> FormOutcome {
        self.loan_amount = strip_non_digits(raw);
        self.recompute()
    }

    pub fn set_interest_rate(&mut self, raw: &str) -> FormOutcome {
        self.interest_rate = raw.trim().to_string();
        self.recompute()
    }

    pub fn set_loan_term(&mut self, raw: &str) -> FormOutcome {
        self.loan_term_years = raw.trim().to_string();
        self.recompute()
    }

    pub fn set_frequency(&mut self, frequency: RepaymentFrequency) -> FormOutcome {
        self.frequency = frequency;
        self.recompute()
    }

    /// Parsed view of the current raw fields.
    pub fn input(&self) -> LoanInput {
        LoanInput {
            principal: parse_currency_input(&self.loan_amount),
            annual_rate_percent: parse_rate_input(&self.interest_rate),
            term_years: parse_term_input(&self.loan_term_years),
            frequency: self.frequency,
        }
    }

    /// Parse, validate, and only then hand the loan to the calculator.
    pub fn recompute(&self) -> FormOutcome {
        let input = self.input();
        let errors = input.validate();
        if !errors.is_empty() {
            tracing::debug!(invalid_fields = errors.len(), "form not recomputed");
            return FormOutcome::Invalid { errors };
        }
        match input.to_specification() {
            Ok(spec) => FormOutcome::Computed {
                result: amortization::compute(&spec),
            },
            Err(e) => FormOutcome::Invalid {
                errors: vec![FieldError {
                    field: "term_years",
                    message: e.to_string(),
                }],
            },
        }
    }
}
