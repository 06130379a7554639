//! Utility functions for rounding and formatting money
//!
//! Centralizes the 2-decimal rounding rule of valuations and the display of
//! dollar amounts and percentages.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to cents with midpoint-away-from-zero, scale fixed at 2.
///
/// # Examples
/// ```
/// use hindsight::utils::round_money;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_money(dec!(1220)).to_string(), "1220.00");
/// assert_eq!(round_money(dec!(2.345)).to_string(), "2.35");
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value using US conventions: `,` thousands separator,
/// `.` decimal separator, two decimals.
///
/// # Arguments
/// * `value` - The decimal value to format
/// * `width` - Minimum width for padding (0 for no padding, right-aligned)
/// * `with_symbol` - Whether to include the `$` prefix
///
/// # Examples
/// ```
/// use hindsight::utils::format_usd_with_width;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_usd_with_width(dec!(1234.56), 0, true), "$1,234.56");
/// assert_eq!(format_usd_with_width(dec!(1234), 12, false), "    1,234.00");
/// ```
pub fn format_usd_with_width(value: Decimal, width: usize, with_symbol: bool) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = round_money(value.abs()).to_string();
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let prefix = if with_symbol { "$" } else { "" };
    let result = format!("{}{}{}.{}", sign, prefix, with_separators, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format as dollars: "$1,234.56"
pub fn format_usd(value: Decimal) -> String {
    format_usd_with_width(value, 0, true)
}

/// Signed percentage with one decimal: "+22.0%", "-3.5%"
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded > Decimal::ZERO { "+" } else { "" };
    format!("{}{:.1}%", sign, rounded)
}
