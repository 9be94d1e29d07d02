//! Angle arithmetic and fixed-point formatting.

/// Digits written after the decimal point for every rewritten value.
pub const DECIMALS: usize = 6;

const FULL_TURN: f64 = 360.0;

/// Parses a numeric token. Non-finite values (`nan`, `inf`) are rejected so
/// they are reported rather than propagated.
pub fn parse_angle(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Renders `value` with [`DECIMALS`] fractional digits, never as `-0.000000`.
pub fn format_angle(value: f64) -> String {
    let formatted = format!("{value:.DECIMALS$}");
    match formatted.strip_prefix('-') {
        Some(magnitude) if magnitude.bytes().all(|b| b == b'0' || b == b'.') => {
            magnitude.to_string()
        }
        _ => formatted,
    }
}

pub fn offset(old: f64, by: f64) -> f64 {
    old + by
}

/// `(old + by) mod 360`, always in `[0, 360)` after rounding to [`DECIMALS`].
pub fn rotate(old: f64, by: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS as i32);
    let wrapped = (old + by).rem_euclid(FULL_TURN);
    let rounded = (wrapped * scale).round() / scale;
    if rounded >= FULL_TURN { 0.0 } else { rounded }
}

pub fn invert_offset(old: f64, by: f64) -> f64 {
    -old + by
}

pub fn invert(old: f64) -> f64 {
    -old
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_uses_six_decimals() {
        assert_eq!(format_angle(190.0), "190.000000");
        assert_eq!(format_angle(-12.3456789), "-12.345679");
        assert_eq!(format_angle(-0.0), "0.000000");
        assert_eq!(format_angle(-0.0000001), "0.000000");
    }

    #[test]
    fn rotate_wraps_into_range() {
        assert_eq!(rotate(190.0, 180.0), 10.0);
        assert_eq!(rotate(-90.0, 0.0), 270.0);
        assert_eq!(rotate(359.9999999, 0.0), 0.0);
    }

    #[test]
    fn parse_rejects_non_numbers() {
        assert_eq!(parse_angle("12.5"), Some(12.5));
        assert_eq!(parse_angle("1e2"), Some(100.0));
        assert_eq!(parse_angle("abc"), None);
        assert_eq!(parse_angle("nan"), None);
    }
}
