// Utility helpers for parsing, rounding and number formatting.
//
// CSV cells arrive as loose text; everything here turns them into typed
// values or formats typed values back for the console.
use num_format::{Locale, ToFormattedString};

/// Parse a study-hours cell into `f64`, tolerating surrounding whitespace.
///
/// - Returns `None` for a missing or blank cell.
/// - Rejects values containing letters (`"six"`, `"6h"`, `"NaN"`).
/// - Rejects any `","`: hours never reach a thousand, so `"1,5"` is a
///   decimal comma and must not be read as `15`.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic() || c == ',') {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Round half away from zero to `decimals` places.
pub fn round_to(v: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (v * factor).round() / factor
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice rather than NaN.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with `1,234.50` style grouping on the integer part.
    if !n.is_finite() {
        return n.to_string();
    }
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
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

/// Spreadsheet column letter for a 1-based index (`1 -> A`, `27 -> AA`).
pub fn col_to_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Minimal escaping for text placed inside HTML elements and attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Lowercase file-name fragment: runs of anything but ASCII letters and
/// digits become a single `_`.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64_safe() {
        assert_eq!(parse_f64_safe(Some(" 6.5 ")), Some(6.5));
        assert_eq!(parse_f64_safe(Some("1,5")), None);
        assert_eq!(parse_f64_safe(Some("1,250.5")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("six")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(59.996, 2), 60.0);
        assert_eq!(round_to(-1.234, 2), -1.23);
        assert_eq!(round_to(7.0, 2), 7.0);
    }

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[50.0, 70.0]), 60.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234.5, 2), "1,234.50");
        assert_eq!(format_number(-60.0, 1), "-60.0");
        assert_eq!(format_number(0.0, 0), "0");
    }

    #[test]
    fn test_col_to_letter() {
        assert_eq!(col_to_letter(1), "A");
        assert_eq!(col_to_letter(6), "F");
        assert_eq!(col_to_letter(27), "AA");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Study Hours vs Predicted Marks"), "study_hours_vs_predicted_marks");
        assert_eq!(slug("  Marks & Hours!"), "marks_hours");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>A & B</b>"), "&lt;b&gt;A &amp; B&lt;/b&gt;");
    }
}
