// 💰 Income field
// Keystroke filtering, on-blur normalization to two decimals, and BRL display.

/// Keep only digits and one decimal separator.
///
/// Both `.` and `,` count as a separator. The last one is the decimal point and
/// is written as `.`; earlier ones are thousands grouping and are dropped, so
/// pasted `R$ 1.234,56` keeps its value.
pub fn filter_income_input(raw: &str) -> String {
    let decimal_at = raw.rfind(['.', ',']);
    let mut out = String::with_capacity(raw.len());

    for (i, c) in raw.char_indices() {
        match c {
            '0'..='9' => out.push(c),
            '.' | ',' if Some(i) == decimal_at => out.push('.'),
            _ => {}
        }
    }

    out
}

/// Normalize a finished income entry to exactly two fractional digits.
///
/// Returns `None` when the text is not a number; the field keeps its text then.
/// Negative amounts become `0.00`.
pub fn normalize_income(raw: &str) -> Option<String> {
    let value = parse_amount(raw)?;
    if value <= 0.0 {
        return Some("0.00".to_string());
    }
    Some(format!("{:.2}", value))
}

/// Parse an amount typed with either `.` or `,` as decimal separator.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format an amount as Brazilian reais: `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, frac)
}
