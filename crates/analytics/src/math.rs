/// Beyond this magnitude not every integer is representable as an `f64` (2^53).
pub(crate) const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Rounds `value` to `decimals` places, mapping non-finite input to `0.0`.
///
/// Values too large to carry `decimals` fractional places are returned as they are.
pub(crate) fn round_dp(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let scaled = value * scale;
    if !(scaled.abs() < MAX_EXACT_INTEGER) {
        return finite_or_zero(value);
    }
    finite_or_zero(scaled.round() / scale)
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_dp(33.35, 1), 33.4);
        assert_eq!(round_dp(66.666_666, 1), 66.7);
        assert_eq!(round_dp(-2.25, 1), -2.3);
    }

    #[test]
    fn absorbs_floating_point_artefacts() {
        assert_eq!(round_dp(0.29 * 100.0, 10), 29.0);
        assert_eq!(round_dp(0.07 * 100.0, 10), 7.0);
    }

    #[test]
    fn non_finite_values_become_zero() {
        assert_eq!(round_dp(f64::NAN, 1), 0.0);
        assert_eq!(round_dp(f64::NEG_INFINITY, 10), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
    }

    #[test]
    fn large_finite_values_pass_through() {
        assert_eq!(round_dp(1e25, 10), 1e25);
        assert_eq!(round_dp(1e300, 10), 1e300);
        assert_eq!(round_dp(-1e300, 10), -1e300);
        assert_eq!(round_dp(123_456_789.123, 10), 123_456_789.123);
    }
}
