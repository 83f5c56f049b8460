use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::validation;
use crate::{types::*, LoanCalcError, LoanCalcResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// How often a repayment falls due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepaymentFrequency {
    Weekly,
    #[default]
    Fortnightly,
    Monthly,
}

impl RepaymentFrequency {
    pub const ALL: [RepaymentFrequency; 3] = [
        RepaymentFrequency::Weekly,
        RepaymentFrequency::Fortnightly,
        RepaymentFrequency::Monthly,
    ];

    /// Fixed count of repayment periods in a year. Not derived from a day
    /// count: 52 weeks and 26 fortnights are the lending convention.
    pub fn payments_per_year(self) -> u32 {
        match self {
            RepaymentFrequency::Weekly => 52,
            RepaymentFrequency::Fortnightly => 26,
            RepaymentFrequency::Monthly => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepaymentFrequency::Weekly => "weekly",
            RepaymentFrequency::Fortnightly => "fortnightly",
            RepaymentFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RepaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepaymentFrequency {
    type Err = LoanCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(RepaymentFrequency::Weekly),
            "fortnightly" => Ok(RepaymentFrequency::Fortnightly),
            "monthly" => Ok(RepaymentFrequency::Monthly),
            other => Err(LoanCalcError::InvalidInput {
                field: "frequency".into(),
                reason: format!(
                    "Unknown repayment frequency '{other}' (expected weekly, fortnightly or monthly)"
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSpecification {
    pub principal: Money,
    /// Annual rate as a percentage (6.5 = 6.5%).
    pub annual_rate_percent: Decimal,
    pub term_years: u32,
    #[serde(default)]
    pub frequency: RepaymentFrequency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentResult {
    pub periodic_payment: Money,
    pub total_interest: Money,
    pub total_repayment: Money,
    pub number_of_payments: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Periodic payment, total interest and total repayment for a fixed-rate
/// amortizing loan.
///
/// Does not validate. Callers must reject out-of-range values first (see
/// [`crate::validation`]); a zero term yields zero amounts rather than a
/// meaningful answer.
pub fn compute(spec: &LoanSpecification) -> RepaymentResult {
    let per_year = spec.frequency.payments_per_year();
    let rate = period_rate(spec.annual_rate_percent, spec.frequency);
    let n = spec.term_years.saturating_mul(per_year);

    let payment = periodic_payment(rate, n, spec.principal);
    let total_repayment = payment * Decimal::from(n);
    let total_interest = total_repayment - spec.principal;

    RepaymentResult {
        periodic_payment: round_money(payment),
        total_interest: round_money(total_interest),
        total_repayment: round_money(total_repayment),
        number_of_payments: n,
    }
}

/// Validate, compute and wrap the result in the standard output envelope.
pub fn calculate_repayments(
    spec: &LoanSpecification,
) -> LoanCalcResult<ComputationOutput<RepaymentResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if let Some(first) = validation::validate_specification(spec).into_iter().next() {
        tracing::warn!(field = first.field, reason = %first.message, "rejected loan specification");
        return Err(LoanCalcError::InvalidInput {
            field: first.field.into(),
            reason: first.message,
        });
    }

    let rate = period_rate(spec.annual_rate_percent, spec.frequency);
    let output = compute(spec);

    tracing::debug!(
        frequency = %spec.frequency,
        period_rate = %rate,
        number_of_payments = output.number_of_payments,
        periodic_payment = %output.periodic_payment,
        "computed repayments"
    );

    if rate.is_zero() {
        warnings.push("Zero interest rate: repayments are straight-line principal only".into());
    }
    if output.total_interest > spec.principal {
        warnings.push(format!(
            "Total interest ({}) exceeds the amount borrowed ({})",
            output.total_interest, spec.principal
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "payments_per_year": spec.frequency.payments_per_year(),
        "period_rate": rate.to_string(),
        "number_of_payments": output.number_of_payments,
    });

    Ok(with_metadata(
        "Fixed-rate amortization (level payment annuity)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Per-period decimal rate: (annual% / 100) / payments per year.
pub fn period_rate(annual_rate_percent: Decimal, frequency: RepaymentFrequency) -> Rate {
    annual_rate_percent / dec!(100) / Decimal::from(frequency.payments_per_year())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Level payment that retires `principal` over `nper` periods.
fn periodic_payment(rate: Rate, nper: u32, principal: Money) -> Money {
    if nper == 0 {
        return Decimal::ZERO;
    }

    if rate.is_zero() {
        return principal / Decimal::from(nper);
    }

    // PMT = P * r * (1+r)^n / ((1+r)^n - 1)
    let one_plus_r = Decimal::ONE + rate;
    match one_plus_r.checked_powi(i64::from(nper)) {
        Some(factor) if factor != Decimal::ONE => {
            principal * rate * (factor / (factor - Decimal::ONE))
        }
        // (1+r)^n too small to distinguish from 1: interest is negligible.
        Some(_) => principal / Decimal::from(nper),
        // Growth factor overflowed: the annuity ratio has converged to 1.
        None => principal * rate,
    }
}

fn round_money(value: Decimal) -> Money {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn spec(
        principal: Decimal,
        rate: Decimal,
        term_years: u32,
        frequency: RepaymentFrequency,
    ) -> LoanSpecification {
        LoanSpecification {
            principal,
            annual_rate_percent: rate,
            term_years,
            frequency,
        }
    }

    #[test]
    fn test_payments_per_year_lookup() {
        assert_eq!(RepaymentFrequency::Weekly.payments_per_year(), 52);
        assert_eq!(RepaymentFrequency::Fortnightly.payments_per_year(), 26);
        assert_eq!(RepaymentFrequency::Monthly.payments_per_year(), 12);
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("weekly".parse::<RepaymentFrequency>().unwrap(), RepaymentFrequency::Weekly);
        assert_eq!(" Monthly ".parse::<RepaymentFrequency>().unwrap(), RepaymentFrequency::Monthly);
        let err = "daily".parse::<RepaymentFrequency>().unwrap_err();
        match err {
            LoanCalcError::InvalidInput { field, .. } => assert_eq!(field, "frequency"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_frequency_serde_lowercase() {
        let json = serde_json::to_string(&RepaymentFrequency::Fortnightly).unwrap();
        assert_eq!(json, "\"fortnightly\"");
        let back: RepaymentFrequency = serde_json::from_str("\"weekly\"").unwrap();
        assert_eq!(back, RepaymentFrequency::Weekly);
    }

    #[test]
    fn test_period_rate_not_rounded() {
        // 6.5% / 26 = 0.0025 exactly
        assert_eq!(period_rate(dec!(6.5), RepaymentFrequency::Fortnightly), dec!(0.0025));
        // 5% / 12 keeps full precision
        let r = period_rate(dec!(5), RepaymentFrequency::Monthly);
        assert!(r.scale() > 2);
        assert!((r - dec!(0.00416666666)).abs() < dec!(0.00000000001));
    }

    #[test]
    fn test_fortnightly_30_year_reference() {
        // r = 0.0025, n = 780
        let out = compute(&spec(dec!(500_000), dec!(6.5), 30, RepaymentFrequency::Fortnightly));
        assert_eq!(out.number_of_payments, 780);
        assert_eq!(out.periodic_payment, dec!(1457.93));
        assert_eq!(out.total_repayment, dec!(1137186.32));
        assert_eq!(out.total_interest, dec!(637186.32));
    }

    #[test]
    fn test_monthly_25_year_reference() {
        let out = compute(&spec(dec!(250_000), dec!(5), 25, RepaymentFrequency::Monthly));
        assert_eq!(out.number_of_payments, 300);
        assert_eq!(out.periodic_payment, dec!(1461.48));
        assert_eq!(out.total_repayment, dec!(438442.53));
        assert_eq!(out.total_interest, dec!(188442.53));
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let out = compute(&spec(dec!(100_000), Decimal::ZERO, 10, RepaymentFrequency::Monthly));
        assert_eq!(out.number_of_payments, 120);
        assert_eq!(out.periodic_payment, dec!(833.33));
        assert_eq!(out.total_repayment, dec!(100000.00));
        assert_eq!(out.total_interest, Decimal::ZERO);
        assert!(out.total_interest.is_sign_positive());
    }

    #[test]
    fn test_one_year_weekly_boundary() {
        let out = compute(&spec(dec!(10_000), dec!(20), 1, RepaymentFrequency::Weekly));
        assert_eq!(out.number_of_payments, 52);
        assert_eq!(out.periodic_payment, dec!(212.55));
        assert_eq!(out.total_repayment, dec!(11052.47));
        assert_eq!(out.total_interest, dec!(1052.47));
    }

    #[test]
    fn test_outputs_rounded_to_cents() {
        let out = compute(&spec(dec!(300_000), dec!(4.25), 20, RepaymentFrequency::Fortnightly));
        assert!(out.periodic_payment.scale() <= 2);
        assert!(out.total_interest.scale() <= 2);
        assert!(out.total_repayment.scale() <= 2);
        assert_eq!(out.periodic_payment, dec!(856.88));
        assert_eq!(out.total_repayment, dec!(445579.57));
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert!(round_money(dec!(-0.0000001)).is_sign_positive());
    }

    #[test]
    fn test_zero_term_does_not_panic() {
        let out = compute(&spec(dec!(100_000), dec!(5), 0, RepaymentFrequency::Monthly));
        assert_eq!(out.number_of_payments, 0);
        assert_eq!(out.periodic_payment, Decimal::ZERO);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let s = spec(dec!(750_000), dec!(7.15), 27, RepaymentFrequency::Weekly);
        assert_eq!(compute(&s), compute(&s));
    }

    #[test]
    fn test_calculate_repayments_envelope() {
        let s = spec(dec!(500_000), dec!(6.5), 30, RepaymentFrequency::Fortnightly);
        let out = calculate_repayments(&s).unwrap();
        assert_eq!(out.result, compute(&s));
        assert_eq!(out.assumptions["payments_per_year"], 26);
        let rate: Decimal = out.assumptions["period_rate"].as_str().unwrap().parse().unwrap();
        assert_eq!(rate, dec!(0.0025));
        // 637k interest on 500k borrowed
        assert!(out.warnings.iter().any(|w| w.contains("exceeds the amount borrowed")));
    }

    #[test]
    fn test_calculate_repayments_zero_rate_warning() {
        let s = spec(dec!(100_000), Decimal::ZERO, 10, RepaymentFrequency::Monthly);
        let out = calculate_repayments(&s).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("Zero interest rate"));
    }

    #[test]
    fn test_calculate_repayments_rejects_invalid() {
        let s = spec(dec!(100_000), dec!(5), 31, RepaymentFrequency::Monthly);
        let err = calculate_repayments(&s).unwrap_err();
        match err {
            LoanCalcError::InvalidInput { field, reason } => {
                assert_eq!(field, "term_years");
                assert_eq!(reason, "Loan term cannot exceed 30 years");
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_specification_json_shape() {
        let s: LoanSpecification = serde_json::from_str(
            r#"{"principal": 500000, "annual_rate_percent": "6.5", "term_years": 30, "frequency": "monthly"}"#,
        )
        .unwrap();
        assert_eq!(s.principal, dec!(500000));
        assert_eq!(s.annual_rate_percent, dec!(6.5));
        assert_eq!(s.frequency, RepaymentFrequency::Monthly);

        let defaulted: LoanSpecification = serde_json::from_str(
            r#"{"principal": 1000, "annual_rate_percent": 1, "term_years": 1}"#,
        )
        .unwrap();
        assert_eq!(defaulted.frequency, RepaymentFrequency::Fortnightly);
    }
}
