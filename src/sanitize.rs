//! Input cleaning shared by the store and the form layer.
//!
//! Cleaning normalizes instead of rejecting: a negative or fractional id is
//! turned into a usable one, never reported as an error.

/// Truncates toward zero and drops the sign. Non-finite input becomes `0`.
pub fn clear_int(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    // `as` saturates at the i64 bounds.
    (value.trunc() as i64).saturating_abs()
}

/// Drops the sign of an already integral id.
pub fn clear_id(value: i64) -> i64 {
    value.saturating_abs()
}

/// Cleans a raw form value the way a lenient decoder would: leading
/// whitespace is skipped, an optional sign and the leading run of digits are
/// read, anything after is ignored. No digits means `0`.
pub fn clear_int_str(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let magnitude = rest[..digits_len].bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
    });

    let signed = if negative { -magnitude } else { magnitude };
    clear_id(signed)
}

/// Trims surrounding whitespace and escapes single quotes so the result can
/// sit inside an SQL string literal.
///
/// The escaping is meant for literal SQL text only. A value passed through
/// bound parameters keeps the doubled quotes, so `Don't` is stored as
/// `Don''t`.
pub fn clear_str(value: &str) -> String {
    value.trim().replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_int_truncates_before_dropping_sign() {
        assert_eq!(clear_int(-5.0), 5);
        assert_eq!(clear_int(5.0), 5);
        assert_eq!(clear_int(3.7), 3);
        assert_eq!(clear_int(-3.7), 3);
        assert_eq!(clear_int(0.9), 0);
    }

    #[test]
    fn clear_int_maps_non_finite_to_zero() {
        assert_eq!(clear_int(f64::NAN), 0);
        assert_eq!(clear_int(f64::INFINITY), 0);
        assert_eq!(clear_int(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn clear_id_saturates_at_min() {
        assert_eq!(clear_id(-42), 42);
        assert_eq!(clear_id(i64::MIN), i64::MAX);
    }

    #[test]
    fn clear_int_str_reads_leading_number() {
        assert_eq!(clear_int_str("12"), 12);
        assert_eq!(clear_int_str("  -7"), 7);
        assert_eq!(clear_int_str("+3"), 3);
        assert_eq!(clear_int_str("3.7"), 3);
        assert_eq!(clear_int_str("12abc"), 12);
        assert_eq!(clear_int_str("abc"), 0);
        assert_eq!(clear_int_str(""), 0);
        assert_eq!(clear_int_str("-"), 0);
    }

    #[test]
    fn clear_str_trims_and_escapes_quotes() {
        assert_eq!(clear_str("  plain  "), "plain");
        assert_eq!(clear_str("\tit's\n"), "it''s");
        assert_eq!(clear_str("   "), "");
    }
}
