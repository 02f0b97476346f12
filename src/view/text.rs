//! Formatting helpers shared by the renderers.

/// Width of the label column in key/value blocks.
pub const LABEL_WIDTH: usize = 18;

/// `"  label      value"` with the value column aligned.
pub fn key_value_line(label: &str, value: impl std::fmt::Display) -> String {
    format!("  {:<width$}{}", label, value, width = LABEL_WIDTH)
}

/// Money with thousands separators and two decimals, e.g. `5,000.00 USDC`.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let cents = (amount * 100.0).round();
    let sign = if cents < 0.0 { "-" } else { "" };
    let cents = cents.abs() as u64;
    let whole = group_thousands(cents / 100);
    format!("{}{}.{:02} {}", sign, whole, cents % 100, currency)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Cut `text` to at most `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
