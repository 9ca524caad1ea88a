//! Number and text formatting for map labels.

/// Formats a number with thousands separators and at most
/// `max_fraction_digits` fractional digits, trailing zeros dropped.
/// Ties round away from zero (`12.25` to one digit is `12.3`).
///
/// `format_number(1234567.0, 3)` is `"1,234,567"` and
/// `format_number(1234.56, 1)` is `"1,234.6"`.
#[must_use]
pub fn format_number(value: f64, max_fraction_digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!(
        "{:.*}",
        max_fraction_digits,
        round_half_away(value.abs(), max_fraction_digits)
    );
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Rounds to `digits` fractional digits with ties away from zero.
///
/// `{:.N}` alone rounds exact ties to even.
fn round_half_away(value: f64, digits: usize) -> f64 {
    let factor = i32::try_from(digits).map_or(f64::INFINITY, |d| 10_f64.powi(d));
    let scaled = value * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    }
}

/// Escapes text for inclusion in HTML content.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
