//! Presentation formatting for sales figures. Values are rounded here and nowhere else.

/// Formats `value` with two decimals and comma thousands separators: `1,234,567.50`.
///
/// Non-finite values are written as Rust prints them (`inf`, `NaN`), without grouping.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Formats `value` as dollars: `$1,234,567.50`, `-$12.00`.
pub fn format_currency(value: f64) -> String {
    let amount = format_amount(value);
    match amount.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_two_decimals() {
        assert_eq!(format_amount(1234567.5), "1,234,567.50");
        assert_eq!(format_currency(1234567.5), "$1,234,567.50");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(100.0), "100.00");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(123456.0), "123,456.00");
    }

    #[test]
    fn negative_values_carry_a_leading_sign() {
        assert_eq!(format_amount(-1500.25), "-1,500.25");
        assert_eq!(format_currency(-1500.25), "-$1,500.25");
    }

    #[test]
    fn negatives_that_round_to_zero_lose_their_sign() {
        assert_eq!(format_amount(-0.001), "0.00");
        assert_eq!(format_currency(-0.001), "$0.00");
        assert_eq!(format_currency(-0.0), "$0.00");
    }

    #[test]
    fn non_finite_values_are_not_grouped() {
        assert_eq!(format_amount(f64::INFINITY), "inf");
        assert_eq!(format_currency(f64::NEG_INFINITY), "-$inf");
        assert_eq!(format_amount(f64::NAN), "NaN");
    }
}
