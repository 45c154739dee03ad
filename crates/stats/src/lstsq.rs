//! Polynomial least squares via Householder QR.

use ndarray::{Array1, Array2, s};

/// A fitted polynomial in a centered and scaled abscissa.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyFit {
    /// Coefficients in increasing power of `(x - center) / scale`.
    coeffs: Vec<f64>,
    center: f64,
    scale: f64,
}

impl PolyFit {
    /// Fits a degree-`deg` polynomial to the pairs `(x[i], y[i])`.
    ///
    /// Returns `None` if there are not more points than the degree, the
    /// abscissa does not have `deg + 1` distinct values, or any input is
    /// not finite.
    pub fn fit(x: &[f64], y: &[f64], deg: usize) -> Option<Self> {
        let m = x.len().min(y.len());
        if m <= deg || x.iter().chain(y).any(|v| !v.is_finite()) {
            return None;
        }
        let center = x[..m].iter().sum::<f64>() / m as f64;
        let spread = x[..m].iter().fold(0.0_f64, |acc, &v| acc.max((v - center).abs()));
        let scale = if spread > 0.0 { spread } else { 1.0 };
        let a = Array2::from_shape_fn((m, deg + 1), |(i, j)| ((x[i] - center) / scale).powi(j as i32));
        let coeffs = solve(a, &y[..m])?;
        Some(Self { coeffs, center, scale })
    }

    /// Evaluates the polynomial at `x` (Horner scheme).
    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.scale;
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }
}

/// Least-squares solution of `a * c = b` for a tall, full-rank `a`.
fn solve(mut r: Array2<f64>, b: &[f64]) -> Option<Vec<f64>> {
    let (m, n) = r.dim();
    if m < n {
        return None;
    }
    let mut qtb = Array1::from(b.to_vec());
    for k in 0..n {
        let norm = r.slice(s![k.., k]).mapv(|v| v * v).sum().sqrt();
        if norm == 0.0 {
            return None;
        }
        let alpha = if r[[k, k]] > 0.0 { -norm } else { norm };
        let mut v = r.slice(s![k.., k]).to_owned();
        v[0] -= alpha;
        let vv = v.dot(&v);
        if vv == 0.0 {
            continue;
        }
        for j in k..n {
            let f = 2.0 * v.dot(&r.slice(s![k.., j])) / vv;
            r.slice_mut(s![k.., j]).scaled_add(-f, &v);
        }
        let f = 2.0 * v.dot(&qtb.slice(s![k..])) / vv;
        qtb.slice_mut(s![k..]).scaled_add(-f, &v);
    }
    let max_diag = (0..n).map(|i| r[[i, i]].abs()).fold(0.0_f64, f64::max);
    let mut coeffs = vec![0.0; n];
    for i in (0..n).rev() {
        let d = r[[i, i]];
        if d.abs() <= 1e-10 * max_diag {
            return None;
        }
        let tail: f64 = (i + 1..n).map(|j| r[[i, j]] * coeffs[j]).sum();
        coeffs[i] = (qtb[i] - tail) / d;
    }
    Some(coeffs)
}
