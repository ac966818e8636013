//! Likelihood loss for retrieval strengths.

use crate::error::{CueFitError, CueFitResult};

/// Default floor applied before taking logarithms.
pub const DEFAULT_ZERO_FLOOR: f64 = 1.0e-8;

/// Upper sanity bound for probabilities after rounding to one decimal.
/// Leaves room for small overshoot above 1.0.
const PROBABILITY_CEILING: f64 = 1.1;

/// Replace non-finite values: NaN and -inf become 0, +inf becomes 1.
pub fn sanitize_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else if value == f64::INFINITY {
        1.0
    } else if value == f64::NEG_INFINITY {
        0.0
    } else {
        value
    }
}

/// Round to one decimal place, ties to even.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

fn within_bounds(value: f64) -> bool {
    let rounded = round_one_decimal(value);
    (0.0..=PROBABILITY_CEILING).contains(&rounded)
}

/// Total negative log-likelihood of a sequence of choice probabilities.
///
/// Non-finite inputs are sanitized first. Every value must then round (to
/// one decimal) into `[0.0, 1.1]`, otherwise a validation error carrying
/// the offending values is logged and returned. Values at or below
/// `zero_floor` are raised to it before the log is taken; a floor of 0
/// disables this.
///
/// # Example
///
/// ```
/// use cuefit_core::model::negative_log_likelihood;
///
/// let loss = negative_log_likelihood(&[0.5, 0.5], 1e-8).unwrap();
/// assert!((loss - 2.0 * 2f64.ln()).abs() < 1e-12);
/// ```
pub fn negative_log_likelihood(probabilities: &[f64], zero_floor: f64) -> CueFitResult<f64> {
    let sanitized: Vec<f64> = probabilities
        .iter()
        .copied()
        .map(sanitize_probability)
        .collect();

    let offending: Vec<f64> = sanitized
        .iter()
        .copied()
        .filter(|p| !within_bounds(*p))
        .collect();

    if !offending.is_empty() {
        tracing::error!(
            offending = ?offending,
            values = ?sanitized,
            "Values not within 0-1 range"
        );
        return Err(CueFitError::probability_range(offending));
    }

    let loss = sanitized
        .into_iter()
        .map(|p| {
            if zero_floor > 0.0 && p <= zero_floor {
                zero_floor
            } else {
                p
            }
        })
        .map(|p| -p.ln())
        .sum();

    Ok(loss)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_probability() {
        let loss = negative_log_likelihood(&[0.8], DEFAULT_ZERO_FLOOR).unwrap();
        assert!((loss - 0.223_143_551).abs() < 1e-6);
    }

    #[test]
    fn test_certain_choices_cost_nothing() {
        let loss = negative_log_likelihood(&[1.0, 1.0, 1.0], DEFAULT_ZERO_FLOOR).unwrap();
        assert_eq!(loss, 0.0);
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(negative_log_likelihood(&[], DEFAULT_ZERO_FLOOR).unwrap(), 0.0);
    }

    #[test]
    fn test_negative_value_rejected() {
        let err = negative_log_likelihood(&[0.5, -0.3], DEFAULT_ZERO_FLOOR).unwrap_err();
        assert_eq!(err.offending_values(), Some(&[-0.3][..]));
    }

    #[test]
    fn test_tolerance_above_one() {
        assert!(negative_log_likelihood(&[1.05], DEFAULT_ZERO_FLOOR).is_ok());
        assert!(negative_log_likelihood(&[1.12], DEFAULT_ZERO_FLOOR).is_ok());
        assert!(negative_log_likelihood(&[1.2], DEFAULT_ZERO_FLOOR).is_err());
        assert!(negative_log_likelihood(&[4.0], DEFAULT_ZERO_FLOOR).is_err());
    }

    #[test]
    fn test_small_negative_rounds_to_zero() {
        // -0.04 rounds to -0.0, which is inside the range.
        assert!(negative_log_likelihood(&[-0.04], DEFAULT_ZERO_FLOOR).is_ok());
    }

    #[test]
    fn test_non_finite_values_sanitized() {
        let raw = negative_log_likelihood(
            &[f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.5],
            DEFAULT_ZERO_FLOOR,
        )
        .unwrap();
        let expected =
            negative_log_likelihood(&[0.0, 1.0, 0.0, 0.5], DEFAULT_ZERO_FLOOR).unwrap();
        assert_eq!(raw, expected);
    }

    #[test]
    fn test_zero_floor_clamps() {
        let loss = negative_log_likelihood(&[0.0], 1.0e-8).unwrap();
        assert!((loss - (-(1.0e-8f64).ln())).abs() < 1e-9);

        let tiny = negative_log_likelihood(&[1.0e-12], 1.0e-8).unwrap();
        assert_eq!(tiny, loss);
    }

    #[test]
    fn test_disabled_floor_gives_infinite_loss() {
        let loss = negative_log_likelihood(&[0.0], 0.0).unwrap();
        assert!(loss.is_infinite());
    }

    #[test]
    fn test_sanitize_probability() {
        assert_eq!(sanitize_probability(f64::NAN), 0.0);
        assert_eq!(sanitize_probability(f64::INFINITY), 1.0);
        assert_eq!(sanitize_probability(f64::NEG_INFINITY), 0.0);
        assert_eq!(sanitize_probability(0.3), 0.3);
    }
}
