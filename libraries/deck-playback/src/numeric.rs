//! Clamping and safe-number coercion
//!
//! Every value that crosses a boundary (storage, config, slider text) goes
//! through here before the engine trusts it.

/// Clamp to `[0, 1]`; NaN maps to 0
#[inline]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamp to `[min, max]`; NaN maps to `min`
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Return `value` when finite, `fallback` otherwise
#[inline]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Parse a number the way slider values and stored strings are written
///
/// Surrounding whitespace is accepted. Empty text, garbage and non-finite
/// results yield `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a non-negative integer index ("1", " 2 ", "3.0")
pub fn parse_index(text: &str) -> Option<usize> {
    let n = parse_number(text)?;
    if n < 0.0 || n.fract() != 0.0 || n > usize::MAX as f64 {
        return None;
    }
    Some(n as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp01_bounds() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(0.25), 0.25);
        assert_eq!(clamp01(7.0), 1.0);
        assert_eq!(clamp01(f32::INFINITY), 1.0);
        assert_eq!(clamp01(f32::NEG_INFINITY), 0.0);
        assert_eq!(clamp01(f32::NAN), 0.0);
    }

    #[test]
    fn clamp_handles_nan() {
        assert_eq!(clamp(f64::NAN, 200.0, 12000.0), 200.0);
        assert_eq!(clamp(50.0, 200.0, 12000.0), 200.0);
        assert_eq!(clamp(99999.0, 200.0, 12000.0), 12000.0);
    }

    #[test]
    fn finite_or_fallback() {
        assert_eq!(finite_or(1.5, 2.0), 1.5);
        assert_eq!(finite_or(f64::NAN, 2.0), 2.0);
        assert_eq!(finite_or(f64::INFINITY, 2.0), 2.0);
    }

    #[test]
    fn parse_number_is_lenient_about_whitespace_only() {
        assert_eq!(parse_number("0.8"), Some(0.8));
        assert_eq!(parse_number("  0.8\n"), Some(0.8));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("loud"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn parse_index_rejects_fractions_and_negatives() {
        assert_eq!(parse_index("1"), Some(1));
        assert_eq!(parse_index("2.0"), Some(2));
        assert_eq!(parse_index("1.5"), None);
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("x"), None);
    }
}
