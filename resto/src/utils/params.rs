//! Lenient coercion of raw query-string values.
//!
//! Nothing here rejects input: a value that cannot be read yields `None` and the
//! caller falls back to its default.

/// Reads the leading integer of `raw`, ignoring surrounding whitespace and any
/// trailing garbage (`"12abc"` -> 12, `"2.7"` -> 2, `"-3"` -> -3).
///
/// Values beyond the `i64` range saturate.
pub fn coerce_int(raw: Option<&str>) -> Option<i64> {
    let trimmed = raw?.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[..digits_len];
    let value = match digits.parse::<i64>() {
        Ok(v) if negative => -v,
        Ok(v) => v,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    };

    Some(value)
}

/// Reads a score threshold. Blank, non-numeric, non-finite and negative values
/// are ignored.
pub fn coerce_score(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite() && *score >= 0.0)
}

/// Returns the value only when it is present and non-empty.
pub fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_int_reads_leading_digits() {
        assert_eq!(coerce_int(Some("42")), Some(42));
        assert_eq!(coerce_int(Some("  7")), Some(7));
        assert_eq!(coerce_int(Some("12abc")), Some(12));
        assert_eq!(coerce_int(Some("2.7")), Some(2));
        assert_eq!(coerce_int(Some("-1")), Some(-1));
        assert_eq!(coerce_int(Some("+5")), Some(5));
    }

    #[test]
    fn test_coerce_int_without_digits() {
        assert_eq!(coerce_int(None), None);
        assert_eq!(coerce_int(Some("")), None);
        assert_eq!(coerce_int(Some("abc")), None);
        assert_eq!(coerce_int(Some("-")), None);
        assert_eq!(coerce_int(Some(".5")), None);
    }

    #[test]
    fn test_coerce_int_saturates() {
        assert_eq!(coerce_int(Some("99999999999999999999999")), Some(i64::MAX));
        assert_eq!(coerce_int(Some("-99999999999999999999999")), Some(i64::MIN));
    }

    #[test]
    fn test_coerce_score() {
        assert_eq!(coerce_score(Some("20")), Some(20.0));
        assert_eq!(coerce_score(Some(" 12.5 ")), Some(12.5));
        assert_eq!(coerce_score(Some("0")), Some(0.0));
        assert_eq!(coerce_score(Some("abc")), None);
        assert_eq!(coerce_score(Some("")), None);
        assert_eq!(coerce_score(Some("-3")), None);
        assert_eq!(coerce_score(Some("NaN")), None);
        assert_eq!(coerce_score(Some("inf")), None);
        assert_eq!(coerce_score(None), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("Bronx")), Some("Bronx".to_string()));
        assert_eq!(non_empty(Some("American ")), Some("American ".to_string()));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
    }
}
