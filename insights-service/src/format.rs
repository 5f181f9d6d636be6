//! Value formatters for chart series.

use common::models::ValueFormat;

/// Renders `value` with `format`.
pub fn format_value(format: ValueFormat, value: f64) -> String {
    match format {
        ValueFormat::Latency => format_latency(value),
        ValueFormat::Count => format_count(value),
        ValueFormat::Percent => format_percent(value),
    }
}

/// Milliseconds as μs below 1 ms, ms below 1 s, s otherwise.
pub fn format_latency(ms: f64) -> String {
    let ms = if ms.is_finite() { ms } else { 0.0 };
    if ms.abs() < 1.0 {
        format!("{:.0}μs", ms * 1000.0)
    } else if ms.abs() < 1000.0 {
        format!("{:.2}ms", ms)
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}

/// Rounded integer with `,` thousands separators.
pub fn format_count(value: f64) -> String {
    let value = if value.is_finite() { value.round() } else { 0.0 };
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Percentage with one decimal.
pub fn format_percent(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{:.1}%", value)
}
