// Utility helpers for parsing and formatting figures.
//
// This module centralizes the "dirty" spreadsheet number handling and the
// display formatting so the aggregator can work with plain `f64` values.
use num_format::{Locale, ToFormattedString};

/// `numerator / denominator * 100`, or `0.0` when the denominator is not
/// positive. Never returns NaN or infinity.
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        let pct = numerator / denominator * 100.0;
        if pct.is_finite() {
            return pct;
        }
    }
    0.0
}

/// Parse a spreadsheet cell into `f64` while being forgiving about
/// formatting issues that are common in Excel/CSV exports.
///
/// - Trims whitespace and a trailing `%`.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for blank or unparseable cells.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim_end();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimal places plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // u128 covers every figure a report realistically holds; beyond that the
    // digits are printed without separators.
    let mut res = match int_part.parse::<u128>() {
        Ok(int_val) => int_val.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
