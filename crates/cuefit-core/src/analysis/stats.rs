//! Information criteria and interval estimates.
//!
//! Uses Student t critical values via `statrs`.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Akaike information criterion. `ll` is the log-likelihood.
pub fn aic(ll: f64, k: usize) -> f64 {
    2.0 * k as f64 - 2.0 * ll
}

/// Bayesian information criterion over `n` observations.
pub fn bic(ll: f64, n: usize, k: usize) -> f64 {
    k as f64 * (n as f64).ln() - 2.0 * ll
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard error of the mean, with the n - 1 sample variance.
pub fn standard_error(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    Some((variance / n as f64).sqrt())
}

/// Half-width of the t-based confidence interval of the mean.
///
/// `None` with fewer than two values or a confidence outside (0, 1).
/// Identical values give a half-width of 0.
pub fn mean_confidence_interval(values: &[f64], confidence: f64) -> Option<f64> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return None;
    }
    let se = standard_error(values)?;
    let df = (values.len() - 1) as f64;
    let t = StudentsT::new(0.0, 1.0, df).ok()?;
    Some(se * t.inverse_cdf((1.0 + confidence) / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aic() {
        assert_eq!(aic(-10.0, 2), 24.0);
        assert_eq!(aic(-10.0, 0), 20.0);
    }

    #[test]
    fn test_bic() {
        let value = bic(-10.0, 100, 2);
        assert!((value - (2.0 * 100f64.ln() + 20.0)).abs() < 1e-12);
        assert_eq!(bic(-10.0, 100, 0), 20.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_confidence_interval_two_values() {
        // sem = 0.5, t(0.975, 1) = 12.7062
        let h = mean_confidence_interval(&[1.0, 2.0], 0.95).unwrap();
        assert!((h - 6.353).abs() < 1e-3);
    }

    #[test]
    fn test_confidence_interval_five_values() {
        // sem = sqrt(2.5 / 5), t(0.975, 4) = 2.7764
        let h = mean_confidence_interval(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.95).unwrap();
        assert!((h - 1.9633).abs() < 1e-3);
    }

    #[test]
    fn test_confidence_interval_needs_two_values() {
        assert_eq!(mean_confidence_interval(&[1.0], 0.95), None);
        assert_eq!(mean_confidence_interval(&[], 0.95), None);
    }

    #[test]
    fn test_constant_values_have_zero_width() {
        assert_eq!(mean_confidence_interval(&[0.4, 0.4, 0.4], 0.95), Some(0.0));
    }
}
