//! Rupee display formatting.
//!
//! Amounts of one crore or more render as `₹X.XX Cr`; smaller amounts use
//! Indian digit grouping (`₹12,34,567`).

/// One crore rupees.
pub const CRORE: u64 = 10_000_000;

/// Formats a rupee amount for display.
#[must_use]
pub fn format_inr(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    if abs >= CRORE {
        // Hundredths of a crore, rounded half-up.
        let hundredths = (abs + CRORE / 200) / (CRORE / 100);
        format!("{sign}₹{}.{:02} Cr", hundredths / 100, hundredths % 100)
    } else {
        format!("{sign}₹{}", group_indian(abs))
    }
}

/// Formats an unsigned amount, saturating at `i64::MAX`.
#[must_use]
pub fn format_inr_u64(amount: u64) -> String {
    format_inr(i64::try_from(amount).unwrap_or(i64::MAX))
}

/// Groups digits as thousands, then pairs: `1234567` → `12,34,567`.
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        if let Some(group) = head.get(start..end) {
            groups.push(group);
        }
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_amounts_use_indian_grouping() {
        assert_eq!(format_inr(0), "₹0");
        assert_eq!(format_inr(999), "₹999");
        assert_eq!(format_inr(1_000), "₹1,000");
        assert_eq!(format_inr(100_000), "₹1,00,000");
        assert_eq!(format_inr(9_999_999), "₹99,99,999");
    }

    #[test]
    fn crore_amounts_use_two_decimals() {
        assert_eq!(format_inr(10_000_000), "₹1.00 Cr");
        assert_eq!(format_inr(85_000_000), "₹8.50 Cr");
        assert_eq!(format_inr(100_000_000), "₹10.00 Cr");
        assert_eq!(format_inr(12_345_678), "₹1.23 Cr");
    }

    #[test]
    fn crore_rounding_is_half_up() {
        assert_eq!(format_inr(10_050_000), "₹1.01 Cr");
        assert_eq!(format_inr(10_049_999), "₹1.00 Cr");
        assert_eq!(format_inr(99_950_000), "₹10.00 Cr");
    }

    #[test]
    fn negative_amounts_keep_sign() {
        assert_eq!(format_inr(-1_500), "-₹1,500");
        assert_eq!(format_inr(-20_000_000), "-₹2.00 Cr");
    }

    #[test]
    fn unsigned_formatting_matches_signed() {
        assert_eq!(format_inr_u64(45_000_000), "₹4.50 Cr");
        assert_eq!(format_inr_u64(u64::MAX), format_inr(i64::MAX));
    }
}
