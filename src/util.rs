// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values. Statistics follow the
// usual dataframe conventions: undefined aggregates (mean of nothing, std of
// a single value) come back as NaN rather than a sentinel.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Fixed day-of-week lookup, indexed by 1 (Monday) through 7 (Sunday).
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Map a 1-7 day-of-week to its name; anything else is "Unknown".
pub fn day_name_for(day_of_week: Option<u32>) -> String {
    match day_of_week {
        Some(d @ 1..=7) => DAY_NAMES[(d - 1) as usize].to_string(),
        _ => "Unknown".to_string(),
    }
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
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

pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Some exports write integer codes as "3.0".
    match s.parse::<u32>() {
        Ok(v) => Some(v),
        Err(_) => parse_f64_safe(Some(s))
            .filter(|v| v.fract() == 0.0 && *v >= 0.0)
            .map(|v| v as u32),
    }
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // ISO dates are the norm, but flight exports also show up with slashed
    // variants. Unparseable dates become `None`, never an error.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    FMTS.iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Sample standard deviation (n - 1 denominator); NaN below two values.
pub fn sample_std(v: &[f64]) -> f64 {
    sample_variance(v).sqrt()
}

/// Sample variance (n - 1 denominator); NaN below two values.
pub fn sample_variance(v: &[f64]) -> f64 {
    if v.len() < 2 {
        return f64::NAN;
    }
    let m = mean(v);
    let ss: f64 = v.iter().map(|x| (x - m) * (x - m)).sum();
    ss / (v.len() - 1) as f64
}

pub fn median(v: &[f64]) -> f64 {
    percentile(v, 50.0)
}

/// Percentile with linear interpolation between closest ranks; NaN for an
/// empty slice. `q` is on the 0-100 scale.
pub fn percentile(v: &[f64], q: f64) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    let mut sorted = v.to_vec();
    // `partial_cmp` with an equality fallback keeps NaN inputs from panicking.
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let frac = pos - lower as f64;
    if lower + 1 >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    sorted[lower] * (1.0 - frac) + sorted[lower + 1] * frac
}

/// Round to 2 decimal places. Non-finite values pass through unchanged.
pub fn round2(v: f64) -> f64 {
    if !v.is_finite() {
        return v;
    }
    (v * 100.0).round() / 100.0
}

/// Round to 3 decimal places. Non-finite values pass through unchanged.
pub fn round3(v: f64) -> f64 {
    if !v.is_finite() {
        return v;
    }
    (v * 1000.0).round() / 1000.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    if !n.is_finite() {
        return format!("{}", n);
    }
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
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
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_rejects_text_and_strips_commas() {
        assert_eq!(parse_f64_safe(Some("1,234.5")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("  ")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parse_u32_accepts_float_encoded_integers() {
        assert_eq!(parse_u32_safe(Some("7")), Some(7));
        assert_eq!(parse_u32_safe(Some("3.0")), Some(3));
        assert_eq!(parse_u32_safe(Some("3.5")), None);
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date_safe(Some("2024-01-15")), Some(expected));
        assert_eq!(parse_date_safe(Some("01/15/2024")), Some(expected));
        assert_eq!(parse_date_safe(Some("not a date")), None);
    }

    #[test]
    fn day_names_map_and_default() {
        assert_eq!(day_name_for(Some(1)), "Monday");
        assert_eq!(day_name_for(Some(7)), "Sunday");
        assert_eq!(day_name_for(Some(0)), "Unknown");
        assert_eq!(day_name_for(None), "Unknown");
    }

    #[test]
    fn undefined_aggregates_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(median(&[]).is_nan());
        assert!(sample_std(&[1.0]).is_nan());
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&v, 25.0) - 1.75).abs() < 1e-12);
        assert!((median(&v) - 2.5).abs() < 1e-12);
        assert!((percentile(&v, 100.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn rounding_preserves_non_finite() {
        assert!((round2(1.005) - 1.0).abs() < 0.02);
        assert!(round2(f64::NAN).is_nan());
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round2(f64::INFINITY), f64::INFINITY);
    }
}
