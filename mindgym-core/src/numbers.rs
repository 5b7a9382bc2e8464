//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

use crate::constants::MILLIS_PER_DAY;

/// Round a f64 and clamp it to the u32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let max = f64::from(u32::MAX);
    let clamped = value.clamp(0.0, max).round();
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Arithmetic mean of `count` values summing to `total`, rounded to the nearest integer.
#[must_use]
pub fn rounded_mean(total: u64, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    let total = cast::<u64, f64>(total).unwrap_or(0.0);
    let count = cast::<usize, f64>(count).unwrap_or(1.0);
    round_f64_to_u32(total / count)
}

/// Convert a score coming from a loosely typed boundary (JS numbers) into a `u32`.
///
/// Returns `None` for negative, fractional, non-finite or out-of-range values.
#[must_use]
pub fn score_from_f64(value: f64) -> Option<u32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    cast::<f64, u32>(value)
}

/// Convert a millisecond clock reading from f64, truncating fractions.
#[must_use]
pub fn millis_from_f64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    cast::<f64, i64>(value.trunc()).unwrap_or(0)
}

/// Length of a window of `days` days in milliseconds.
#[must_use]
pub fn days_to_millis(days: u32) -> i64 {
    i64::from(days).saturating_mul(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_rounds_to_nearest() {
        assert_eq!(rounded_mean(0, 0), 0);
        assert_eq!(rounded_mean(10, 4), 3);
        assert_eq!(rounded_mean(7, 2), 4);
        assert_eq!(rounded_mean(5, 3), 2);
        assert_eq!(rounded_mean(300, 3), 100);
    }

    #[test]
    fn rounding_clamps_out_of_range() {
        assert_eq!(round_f64_to_u32(f64::NAN), 0);
        assert_eq!(round_f64_to_u32(-4.2), 0);
        assert_eq!(round_f64_to_u32(f64::INFINITY), u32::MAX);
    }

    #[test]
    fn score_conversion_rejects_invalid_values() {
        assert_eq!(score_from_f64(450.0), Some(450));
        assert_eq!(score_from_f64(0.0), Some(0));
        assert_eq!(score_from_f64(-1.0), None);
        assert_eq!(score_from_f64(1.5), None);
        assert_eq!(score_from_f64(f64::NAN), None);
        assert_eq!(score_from_f64(1e12), None);
    }

    #[test]
    fn millis_conversion_truncates() {
        assert_eq!(millis_from_f64(1_700_000_000_123.9), 1_700_000_000_123);
        assert_eq!(millis_from_f64(f64::NAN), 0);
    }

    #[test]
    fn day_window_saturates() {
        assert_eq!(days_to_millis(7), 604_800_000);
        assert_eq!(days_to_millis(0), 0);
    }
}
