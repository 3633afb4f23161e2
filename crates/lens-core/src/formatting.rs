/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use lens_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(999), "999");
/// assert_eq!(format_count(1_234), "1,234");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a ratio in `[0, 1]` as a percentage with one decimal place.
///
/// # Examples
///
/// ```
/// use lens_core::formatting::format_percent;
///
/// assert_eq!(format_percent(0.0), "0.0%");
/// assert_eq!(format_percent(0.5), "50.0%");
/// assert_eq!(format_percent(1.0), "100.0%");
/// ```
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Insert `,` separators every three digits, right to left.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let chars: Vec<char> = digits.chars().collect();
    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count_small() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(42), "42");
        assert_eq!(format_count(100), "100");
    }

    #[test]
    fn test_format_count_boundaries() {
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(999_999), "999,999");
        assert_eq!(format_count(1_000_000), "1,000,000");
    }

    #[test]
    fn test_format_percent_rounding() {
        assert_eq!(format_percent(0.333), "33.3%");
        assert_eq!(format_percent(0.6666), "66.7%");
    }
}
