//! Lenient parsing of typed-in form values and NZD display formatting.

use rust_decimal::prelude::*;
use std::str::FromStr;

use crate::types::Money;

/// Keep only the digits of a currency field ("$500,000" -> 500000).
/// Anything without digits reads as zero; amounts too long for a Decimal
/// saturate at `Decimal::MAX` so they fail the upper bound, not the lower.
pub fn parse_currency_input(raw: &str) -> Money {
    let digits = strip_non_digits(raw);
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(significant).unwrap_or(Decimal::MAX)
}

pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Leading decimal number of `raw` ("6.5%" -> 6.5, "1e5" -> 100000), zero
/// when there is none.
pub fn parse_rate_input(raw: &str) -> Decimal {
    leading_number(raw, true)
}

/// Leading whole number of `raw` ("2.5" -> 2, "30 years" -> 30), zero when
/// there is none.
pub fn parse_term_input(raw: &str) -> Decimal {
    leading_number(raw, false)
}

fn leading_number(raw: &str, allow_fraction: bool) -> Decimal {
    let s = raw.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_point = false;

    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if allow_fraction && !seen_point => seen_point = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return Decimal::ZERO;
    }
    let mantissa = s[..end].trim_end_matches('.');
    let value = Decimal::from_str(mantissa).unwrap_or(saturated(mantissa.starts_with('-')));

    match leading_exponent(&s[end..]) {
        Some(exp) if allow_fraction && !value.is_zero() => scale_by_power_of_ten(value, exp),
        _ => value,
    }
}

/// `value * 10^exp`, saturating on overflow and fading to zero past the
/// smallest representable fraction.
fn scale_by_power_of_ten(value: Decimal, exp: i64) -> Decimal {
    let mut out = value;
    for _ in 0..exp.unsigned_abs().min(64) {
        out = if exp > 0 {
            match out.checked_mul(Decimal::TEN) {
                Some(next) => next,
                None => return saturated(value.is_sign_negative()),
            }
        } else {
            out / Decimal::TEN
        };
    }
    out
}

/// Exponent of an `e`/`E` suffix ("e-3", "E+5"), if one follows the mantissa.
fn leading_exponent(rest: &str) -> Option<i64> {
    let body = rest.strip_prefix(['e', 'E'])?;
    let sign_len = usize::from(body.starts_with(['+', '-']));
    let digit_len = body[sign_len..]
        .chars()
        .take_while(char::is_ascii_digit)
        .count();
    if digit_len == 0 {
        return None;
    }
    let exp = &body[..sign_len + digit_len];
    Some(exp.parse::<i64>().unwrap_or(if exp.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

fn saturated(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// Whole-dollar NZD amount with thousands separators ("$1,137,186").
pub fn format_currency(amount: Money) -> String {
    let whole = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let grouped = group_thousands(&whole.abs().trunc().to_string());
    if whole.is_sign_negative() && !whole.is_zero() {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Nearest whole number with thousands separators ("500,000").
pub fn format_number(amount: Decimal) -> String {
    let whole = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let grouped = group_thousands(&whole.abs().trunc().to_string());
    if whole.is_sign_negative() && !whole.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
