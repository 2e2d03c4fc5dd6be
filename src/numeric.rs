//! Small arithmetic helpers shared by the aggregation stages.
//!
//! Every helper here returns `0.0` instead of `NaN` or infinity so callers can
//! feed results straight into display code.

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Rounds to the nearest integer with halves going up, so `-1.5` becomes
/// `-1.0` rather than `-2.0`.
pub fn round_half_up(value: f64) -> f64 {
    finite_or_zero((value + 0.5).floor())
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    finite_or_zero(round_half_up(value * factor) / factor)
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    finite_or_zero(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean over the values that are present; `None` when nothing is.
pub fn mean_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(mean(&present))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn rounding_keeps_requested_precision() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round_to(7.25, 1), 7.3);
        assert_eq!(round_to(f64::NAN, 2), 0.0);
    }

    #[test]
    fn halves_round_up_on_both_sides_of_zero() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.6), -2.0);
        assert_eq!(round_to(-0.125, 2), -0.12);
    }

    #[test]
    fn mean_present_skips_missing_values() {
        assert_eq!(mean_present([Some(80.0), None, Some(90.0)]), Some(85.0));
        assert_eq!(mean_present([None, None]), None);
    }
}
