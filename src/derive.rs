//! Derived metrics
//!
//! Sweeps turn averaged fields into plotted values with a handful of
//! formulas. They are plain IEEE arithmetic: a zero denominator yields an
//! infinite or NaN value, which is written as-is.

use crate::averager::AggregateResult;
use crate::Result;

/// Nanoseconds per second, for timings reported in ns
pub const NANOS_PER_SEC: f64 = 1e9;

/// `a / b`
#[must_use]
pub fn ratio(a: f64, b: f64) -> f64 {
    a / b
}

/// Percentage by which `a` undercuts `b`: `100 × (1 − a/b)`.
///
/// Zero when `a == b`, 100 when `a == 0` and `b > 0`.
#[must_use]
pub fn reduction_percent(a: f64, b: f64) -> f64 {
    100.0 * (1.0 - a / b)
}

/// Ratio of two fields of the same aggregate
///
/// # Errors
///
/// Returns `UnknownField` if either field is missing
pub fn field_ratio(result: &AggregateResult, numerator: &str, denominator: &str) -> Result<f64> {
    Ok(ratio(result.mean(numerator)?, result.mean(denominator)?))
}

/// Sum of several fields of the same aggregate
///
/// # Errors
///
/// Returns `UnknownField` if any field is missing
pub fn field_sum(result: &AggregateResult, fields: &[&str]) -> Result<f64> {
    fields.iter().map(|f| result.mean(f)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_equal_is_zero() {
        assert!(reduction_percent(42.0, 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reduction_zero_numerator_is_hundred() {
        assert!((reduction_percent(0.0, 17.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reduction_half() {
        assert!((reduction_percent(25.0, 50.0) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_by_zero_is_not_finite() {
        assert!(!ratio(1.0, 0.0).is_finite());
    }
}
