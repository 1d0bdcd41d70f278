//! Conversion between human decimal strings and integer base units.
//!
//! Conversions are exact: fractional digits beyond the decimal count are
//! truncated, never rounded. Nothing in this module fails; inputs that cannot
//! be represented convert to zero, since every caller feeds it
//! sanitizer-approved strings.

use crate::types::{Amount, U256};

/// `10^decimals`, or `None` if it does not fit in a `U256`.
pub fn pow10(decimals: u8) -> Option<Amount> {
    U256::from(10).checked_pow(U256::from(decimals))
}

/// Convert a decimal string to base units.
///
/// `"1.5"` with 18 decimals is `1_500_000_000_000_000_000`. Empty strings,
/// `"."` and malformed input yield zero.
pub fn to_base_units(value: &str, decimals: u8) -> Amount {
    if value.is_empty() || value == "0" {
        return U256::ZERO;
    }
    if pow10(decimals).is_none() {
        return U256::ZERO;
    }

    let mut parts = value.split('.');
    let integer = match parts.next() {
        Some(s) if !s.is_empty() => s,
        _ => "0",
    };
    let fraction = parts.next().unwrap_or("");

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(integer) || !is_digits(fraction) {
        return U256::ZERO;
    }

    let width = decimals as usize;
    let mut digits = String::with_capacity(integer.len() + width);
    digits.push_str(integer);
    if fraction.len() >= width {
        digits.push_str(&fraction[..width]);
    } else {
        digits.push_str(fraction);
        digits.extend(std::iter::repeat('0').take(width - fraction.len()));
    }

    U256::from_str_radix(&digits, 10).unwrap_or(U256::ZERO)
}

/// Convert base units to a decimal string with trailing zeros stripped.
///
/// Zero renders as `"0"`, whole amounts render without a decimal point.
pub fn from_base_units(amount: Amount, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }
    let Some(divisor) = pow10(decimals) else {
        return "0".to_string();
    };

    let quotient = amount / divisor;
    let remainder = amount % divisor;

    let padded = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    let fraction = padded.trim_end_matches('0');

    if fraction.is_empty() {
        quotient.to_string()
    } else {
        format!("{quotient}.{fraction}")
    }
}

/// Truncate the fractional part of a decimal string to at most `max_digits`.
///
/// Strings within the limit are returned unchanged, so repeated application is
/// a no-op.
pub fn truncate_fraction(value: &str, max_digits: usize) -> String {
    let Some((integer, fraction)) = value.split_once('.') else {
        return value.to_string();
    };
    match fraction.char_indices().nth(max_digits) {
        Some(_) if max_digits == 0 => integer.to_string(),
        Some((cut, _)) => format!("{integer}.{}", &fraction[..cut]),
        None => value.to_string(),
    }
}

/// Whether a decimal string denotes a strictly positive value.
pub fn is_positive_decimal(value: &str) -> bool {
    value.bytes().any(|b| (b'1'..=b'9').contains(&b))
}
