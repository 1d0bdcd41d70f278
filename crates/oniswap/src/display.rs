//! Display-only formatting of balances.
//!
//! Output of this module is for presentation. It is never parsed back into an
//! amount.

/// Format a decimal balance for display, picking the precision by magnitude.
///
/// | value           | fractional digits          |
/// |-----------------|----------------------------|
/// | < 0.001         | 8                          |
/// | [0.001, 1)      | 6                          |
/// | [1, 1000)       | 4                          |
/// | >= 1000         | up to 2, grouped thousands |
///
/// Digits are truncated. Input that is not a decimal renders as `"0.00"`.
pub fn format_balance(value: &str) -> String {
    let Some((integer, fraction)) = split_decimal(value) else {
        return "0.00".to_string();
    };

    if integer == "0" {
        let below_milli = fraction.bytes().take(3).all(|b| b == b'0');
        return fixed(integer, fraction, if below_milli { 8 } else { 6 });
    }

    if integer.len() < 4 {
        return fixed(integer, fraction, 4);
    }

    let fraction = fraction.get(..2).unwrap_or(fraction).trim_end_matches('0');
    if fraction.is_empty() {
        group_thousands(integer)
    } else {
        format!("{}.{}", group_thousands(integer), fraction)
    }
}

/// Split a decimal string into an integer part without leading zeros and a
/// fractional part. Returns `None` for anything that is not a decimal.
fn split_decimal(value: &str) -> Option<(&str, &str)> {
    let value = value.trim();
    let (integer, fraction) = value.split_once('.').unwrap_or((value, ""));

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(integer) || !is_digits(fraction) {
        return None;
    }

    let integer = integer.trim_start_matches('0');
    Some((if integer.is_empty() { "0" } else { integer }, fraction))
}

/// Render with exactly `digits` fractional digits, padding or truncating.
fn fixed(integer: &str, fraction: &str, digits: usize) -> String {
    let fraction = fraction.get(..digits).unwrap_or(fraction);
    format!("{integer}.{fraction:0<digits$}")
}

fn group_thousands(integer: &str) -> String {
    let mut out = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
