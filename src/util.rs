// Utility helpers for parsing and number formatting.
//
// The storm CSV is hand-entered data spanning six decades, so every field is
// read as an optional string and converted here. Callers get `None` for
// anything unusable and decide the fallback themselves.
use chrono::NaiveDateTime;
use num_format::{Locale, ToFormattedString};

/// Layout of `BGN_DATE`, e.g. `4/18/1950 0:00:00`.
pub const BEGIN_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Parse a string-like value into `f64`, forgiving thousands separators and
/// surrounding whitespace.
///
/// - Rejects values that contain alphabetic characters.
/// - Rejects non-finite results (`inf`, `NaN` spelled as digits cannot occur,
///   but overflow can).
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative count. Integral decimals such as `"3.00"` are
/// accepted because the export writes some count columns as floats.
pub fn parse_count_safe(s: Option<&str>) -> Option<u32> {
    let s = s?.trim();
    if let Ok(v) = s.parse::<u32>() {
        return Some(v);
    }
    let v = parse_f64_safe(Some(s))?;
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return None;
    }
    Some(v as u32)
}

pub fn parse_u64_safe(s: Option<&str>) -> Option<u64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u64>()
        .ok()
        .or_else(|| parse_count_safe(Some(s)).map(u64::from))
}

/// Parse a `BGN_DATE` value. `None` for blank or malformed input.
pub fn parse_begin_date(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, BEGIN_DATE_FORMAT).ok()
}

/// Trimmed copy of an optional field, or `default` when absent.
pub fn text_or(s: Option<String>, default: &str) -> String {
    match s {
        Some(v) => v.trim().to_string(),
        None => default.to_string(),
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `en` thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Damage totals run into the hundreds of billions, well inside u64.
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
