//! Sort keys derived from string fields such as micrograph or tomogram names.
//!
//! The key is the digit run of the first `_<digits>` that is directly
//! followed by `.` or the end of the value: `rec_PD272_03.tomostar` → 3.
//! Keys only order rows; they are never used to join two files.

use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;

/// Key for values without a match. Such rows sort after every keyed row.
pub const UNKEYED: u64 = u64::MAX;

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"_(\d+)(?:\.|$)").expect("valid key pattern"))
}

pub fn extract_key(value: &str) -> u64 {
    key_pattern()
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<u64>().ok())
        .unwrap_or(UNKEYED)
}

/// Stable sort by `key_of`; items with equal keys keep their input order.
pub fn sort_rows_by_key<T, F>(rows: Vec<T>, mut key_of: F) -> Vec<T>
where
    F: FnMut(&T) -> u64,
{
    rows.into_iter()
        .map(|row| (key_of(&row), row))
        .sorted_by_key(|(key, _)| *key)
        .map(|(_, row)| row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_trailing_digit_run() {
        assert_eq!(extract_key("rec_PD272_03.tomostar"), 3);
        assert_eq!(extract_key("foo_12"), 12);
        assert_eq!(extract_key("a_1.b_2.c"), 1);
        assert_eq!(extract_key("nomatch"), UNKEYED);
        assert_eq!(extract_key("tilt_12a"), UNKEYED);
    }

    #[test]
    fn overflowing_digits_are_unkeyed() {
        assert_eq!(extract_key("rec_99999999999999999999999.mrc"), UNKEYED);
    }
}
