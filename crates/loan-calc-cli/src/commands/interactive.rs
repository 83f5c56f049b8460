use clap::Args;
use colored::Colorize;
use std::io::{self, BufRead};

use loan_calc_core::amortization::RepaymentFrequency;
use loan_calc_core::form::{FormOutcome, LoanForm};

use super::loan::outcome_value;
use crate::output;
use crate::OutputFormat;

/// Arguments for the line-by-line calculator
///
/// Each stdin line edits one field, e.g. `amount 650000`, `rate=5.99`,
/// `term 25` or `frequency weekly`. `show` prints the current result and
/// `quit` stops reading.
#[derive(Args)]
pub struct InteractiveArgs {
    /// Do not print the result for the starting inputs before reading edits
    #[arg(long)]
    pub skip_initial: bool,
}

pub fn run_interactive(
    args: InteractiveArgs,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = LoanForm::new();
    if !args.skip_initial {
        output::format_output(format, &outcome_value(&form.recompute()));
    }

    for line in io::stdin().lock().lines() {
        let line = line?;
        let edit = line.trim();
        if edit.is_empty() || edit.starts_with('#') {
            continue;
        }

        let (field, value) = split_edit(edit);
        let outcome = match apply_edit(&mut form, &field.to_ascii_lowercase(), value) {
            Ok(Some(outcome)) => outcome,
            Ok(None) => break,
            Err(message) => {
                tracing::warn!(edit, "ignored edit");
                eprintln!("{}: {}", "error".red().bold(), message);
                continue;
            }
        };
        output::format_output(format, &outcome_value(&outcome));
    }

    Ok(())
}

/// `Ok(None)` ends the session.
fn apply_edit(form: &mut LoanForm, field: &str, value: &str) -> Result<Option<FormOutcome>, String> {
    let outcome = match field {
        "quit" | "exit" => return Ok(None),
        "show" => form.recompute(),
        "amount" | "principal" => form.set_loan_amount(value),
        "rate" => form.set_interest_rate(value),
        "term" | "years" => form.set_loan_term(value),
        "frequency" => {
            let frequency: RepaymentFrequency = value.parse().map_err(|e| format!("{e}"))?;
            form.set_frequency(frequency)
        }
        other => {
            return Err(format!(
                "unknown field '{other}' (expected amount, rate, term, frequency, show or quit)"
            ))
        }
    };
    Ok(Some(outcome))
}

fn split_edit(edit: &str) -> (&str, &str) {
    match edit.split_once(|c: char| c == '=' || c.is_whitespace()) {
        Some((field, value)) => (field.trim(), value.trim()),
        None => (edit, ""),
    }
}
