//! Missing-value aware statistics over plain slices.
//!
//! `NaN` marks a missing value. Every function skips missing values unless
//! stated otherwise and returns `NaN` when nothing is left to reduce.

/// Number of non-missing values.
pub fn count_valid(data: &[f64]) -> usize {
    data.iter().filter(|v| !v.is_nan()).count()
}

/// Arithmetic mean of the non-missing values.
pub fn nan_mean(data: &[f64]) -> f64 {
    let (sum, n) = data
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Arithmetic mean; any missing value makes the result missing.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Variance of the non-missing values with `n - ddof` denominator.
///
/// Returns `NaN` when `n <= ddof`.
pub fn nan_variance(data: &[f64], ddof: usize) -> f64 {
    let n = count_valid(data);
    if n <= ddof {
        return f64::NAN;
    }
    let m = nan_mean(data);
    let ss: f64 = data
        .iter()
        .filter(|v| !v.is_nan())
        .map(|&v| (v - m) * (v - m))
        .sum();
    ss / (n - ddof) as f64
}

/// Standard deviation of the non-missing values with `n - ddof` denominator.
pub fn nan_std(data: &[f64], ddof: usize) -> f64 {
    nan_variance(data, ddof).sqrt()
}

/// Weighted mean.
///
/// With `skipna`, both sums run over positions where the value is present:
/// `sum(w * x) / sum(w)`. Without it a missing value propagates. Returns
/// `NaN` when the weight sum is zero.
pub fn weighted_mean(data: &[f64], weights: &[f64], skipna: bool) -> f64 {
    let mut num = 0.0;
    let mut den = 0.0;
    for (&x, &w) in data.iter().zip(weights) {
        if x.is_nan() {
            if skipna {
                continue;
            }
            return f64::NAN;
        }
        if w.is_nan() {
            continue;
        }
        num += w * x;
        den += w;
    }
    if den == 0.0 { f64::NAN } else { num / den }
}

/// Weighted (population) variance around the weighted mean.
pub fn weighted_variance(data: &[f64], weights: &[f64], skipna: bool) -> f64 {
    let m = weighted_mean(data, weights, skipna);
    if m.is_nan() {
        return f64::NAN;
    }
    let sq: Vec<f64> = data.iter().map(|&x| (x - m) * (x - m)).collect();
    weighted_mean(&sq, weights, skipna)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn nan_mean_skips_missing() {
        assert_relative_eq!(nan_mean(&[1.0, f64::NAN, 3.0]), 2.0);
        assert!(nan_mean(&[f64::NAN]).is_nan());
        assert!(nan_mean(&[]).is_nan());
    }

    #[test]
    fn mean_propagates_missing() {
        assert!(mean(&[1.0, f64::NAN]).is_nan());
        assert_relative_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn variance_ddof() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(nan_variance(&data, 0), 4.0, epsilon = 1e-12);
        assert_relative_eq!(nan_variance(&data, 1), 32.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(nan_std(&data, 0), 2.0, epsilon = 1e-12);
        assert!(nan_variance(&[1.0], 1).is_nan());
    }

    #[test]
    fn weighted_mean_basic() {
        assert_relative_eq!(weighted_mean(&[1.0, 3.0], &[3.0, 1.0], true), 1.5);
    }

    #[test]
    fn weighted_mean_equal_weights_is_mean() {
        let data = [0.5, 1.5, -2.0, 4.0];
        assert_relative_eq!(weighted_mean(&data, &[2.5; 4], true), nan_mean(&data), epsilon = 1e-12);
    }

    #[test]
    fn weighted_mean_missing_value() {
        let data = [1.0, f64::NAN, 3.0];
        let w = [1.0, 10.0, 1.0];
        assert_relative_eq!(weighted_mean(&data, &w, true), 2.0);
        assert!(weighted_mean(&data, &w, false).is_nan());
    }

    #[test]
    fn weighted_mean_zero_weights() {
        assert!(weighted_mean(&[1.0, 2.0], &[0.0, 0.0], true).is_nan());
    }

    #[test]
    fn weighted_variance_equal_weights() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(weighted_variance(&data, &[1.0; 8], true), 4.0, epsilon = 1e-12);
    }
}
