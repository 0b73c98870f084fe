//! Display formatting for energy figures.

/// Placeholder shown wherever an aggregate has no data behind it.
pub const NO_DATA: &str = "No data";

/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use pv_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 2), "1,234.50");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    // "-0.00" reads badly on a KPI card.
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Two-decimal energy value with unit, e.g. `"1,234.56 kWh"`.
pub fn format_kwh(value: f64) -> String {
    format!("{} kWh", format_number(value, 2))
}

/// Like [`format_kwh`] but renders `None` as [`NO_DATA`].
pub fn format_optional_kwh(value: Option<f64>) -> String {
    value.map(format_kwh).unwrap_or_else(|| NO_DATA.to_string())
}

/// Two-decimal value without unit, or [`NO_DATA`].
pub fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format_number(v, 2))
        .unwrap_or_else(|| NO_DATA.to_string())
}

/// Insert commas every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
