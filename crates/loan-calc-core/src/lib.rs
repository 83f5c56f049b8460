pub mod amortization;
pub mod error;
pub mod form;
pub mod presentation;
pub mod types;
pub mod validation;

pub use amortization::{compute, calculate_repayments, LoanSpecification, RepaymentFrequency, RepaymentResult};
pub use error::LoanCalcError;
pub use types::*;

/// Standard result type for all loan-calc operations
pub type LoanCalcResult<T> = Result<T, LoanCalcError>;
