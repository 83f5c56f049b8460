use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use loan_calc_core::amortization::{self, RepaymentFrequency, RepaymentResult};
use loan_calc_core::form::{FormOutcome, LoanForm};
use loan_calc_core::presentation::{format_currency, format_number, parse_currency_input};
use loan_calc_core::validation::{FieldError, LoanInput};
use loan_calc_core::LoanCalcError;

use crate::input;

/// Arguments shared by `calculate` and `validate`
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount; currency formatting such as "$500,000" is accepted
    #[arg(long, alias = "amount", value_parser = parse_amount)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (6.5 = 6.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in whole years
    #[arg(long, alias = "years")]
    pub term: Option<Decimal>,

    /// Repayment frequency: weekly, fortnightly or monthly
    #[arg(long)]
    pub frequency: Option<RepaymentFrequency>,
}

fn parse_amount(raw: &str) -> Result<Decimal, String> {
    Ok(parse_currency_input(raw))
}

const FIELDS: [&str; 3] = ["principal", "annual_rate_percent", "term_years"];

pub fn run_calculate(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = resolve_input(&args)?;
    let spec = loan_input.to_specification()?;
    let output = amortization::calculate_repayments(&spec)?;

    let mut value = serde_json::to_value(&output).map_err(LoanCalcError::from)?;
    value["display"] = display_amounts(&output.result);
    Ok(value)
}

pub fn run_validate(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = resolve_input(&args)?;
    let errors = loan_input.validate();

    let mut result = Map::new();
    result.insert("is_valid".into(), Value::Bool(errors.is_empty()));
    result.extend(field_messages(&errors));
    Ok(json!({ "result": result }))
}

/// JSON view of a form recomputation, shaped like the `calculate` envelope.
pub fn outcome_value(outcome: &FormOutcome) -> Value {
    match outcome {
        FormOutcome::Computed { result } => json!({
            "status": "computed",
            "result": result,
            "display": display_amounts(result),
        }),
        FormOutcome::Invalid { errors } => {
            let messages: Map<String, Value> = errors
                .iter()
                .map(|e| (e.field.to_string(), Value::String(e.message.clone())))
                .collect();
            json!({
                "status": "invalid",
                "result": messages,
            })
        }
    }
}

/// Input precedence: --input file, piped stdin, then flags over the form defaults.
fn resolve_input(args: &LoanArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::from_file(path);
    }
    if let Some(piped) = input::from_stdin()? {
        return Ok(piped);
    }

    let defaults = LoanForm::default().input();
    Ok(LoanInput {
        principal: args.principal.unwrap_or(defaults.principal),
        annual_rate_percent: args.rate.unwrap_or(defaults.annual_rate_percent),
        term_years: args.term.unwrap_or(defaults.term_years),
        frequency: args.frequency.unwrap_or(defaults.frequency),
    })
}

fn display_amounts(result: &RepaymentResult) -> Value {
    json!({
        "periodic_payment": format_currency(result.periodic_payment),
        "total_interest": format_currency(result.total_interest),
        "total_repayment": format_currency(result.total_repayment),
        "number_of_payments": format_number(Decimal::from(result.number_of_payments)),
    })
}

/// One entry per field: its error message, or "ok".
fn field_messages(errors: &[FieldError]) -> Map<String, Value> {
    FIELDS
        .iter()
        .map(|field| {
            let message = errors
                .iter()
                .find(|e| e.field == *field)
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "ok".to_string());
            (field.to_string(), Value::String(message))
        })
        .collect()
}
