//! Rescaling of service output into physical units.

use nino_grid::{AttrValue, AxisRef, Dataset, LabeledArray, OnMissing, require_axis};
use nino_stats::{Weights, std};
use tracing::debug;

use crate::error::EofError;
use crate::service::{EofOptions, ModeDecomposition, ModeFit};

/// Name of the mode axis shared by components and scores.
pub const MODE_DIM: &str = "mode";

/// Computes `options.n_modes` EOF patterns of `da` along `dim`.
///
/// Each component is multiplied by the standard deviation of its scores
/// along `dim`, so patterns carry the units of the input. The returned
/// array has an `explained_variance` attribute listing the percentage of
/// variance per mode, and its coordinates keep the input's coordinate
/// attributes.
///
/// # Errors
///
/// Returns the soft [`nino_grid::GridError::UnresolvedAxis`] if `dim`
/// cannot be resolved, [`EofError::InvalidFit`] if the service output is
/// not laid out along [`MODE_DIM`], and any error of the service.
#[tracing::instrument(level = "debug", skip(service, da, options), fields(var = da.name(), dim = %dim))]
pub fn eof_modes<S: ModeDecomposition + ?Sized>(
    service: &S,
    da: &LabeledArray,
    dim: &AxisRef,
    options: &EofOptions,
) -> Result<LabeledArray, EofError> {
    let dim = require_axis(da, dim, OnMissing::Warn)?;
    let ModeFit {
        components,
        scores,
        explained_variance_ratio,
    } = service.fit(da, &dim, options)?;
    check_layout(&components, &scores, &dim, &explained_variance_ratio)?;

    let scale = std(&scores, &[AxisRef::Name(dim.clone())], &Weights::None, 0, true)?;
    let percent: Vec<f64> = explained_variance_ratio.iter().map(|r| r * 100.0).collect();
    debug!(modes = percent.len(), explained = ?percent, "modes fitted");

    let mut out = components
        .zip_with(&scale, |c, s| c * s)?
        .with_name(da.name())
        .with_attr("explained_variance", AttrValue::FloatList(percent));
    for axis in da.dims() {
        let source = da.coord(axis).filter(|_| out.has_axis(axis));
        let target = out.coord(axis).cloned();
        if let (Some(source), Some(target)) = (source, target) {
            let mut attrs = target.attrs().clone();
            attrs.extend(source.attrs().iter().map(|(k, v)| (k.clone(), v.clone())));
            out = out.with_coord(axis.clone(), target.with_attrs(attrs))?;
        }
    }
    Ok(out)
}

/// Applies [`eof_modes`] to every variable of `ds` except cell-bound
/// variables (names containing `_bounds` or `_bnds`).
///
/// # Errors
///
/// Propagates the first error of [`eof_modes`].
pub fn eofs<S: ModeDecomposition + ?Sized>(
    service: &S,
    ds: &Dataset,
    dim: &AxisRef,
    options: &EofOptions,
) -> Result<Dataset, EofError> {
    let mut out = Dataset::new().with_attrs(ds.attrs().clone());
    for var in ds.variables() {
        if var.name().contains("_bounds") || var.name().contains("_bnds") {
            continue;
        }
        out = out.with_replaced(eof_modes(service, var, dim, options)?);
    }
    Ok(out)
}

fn check_layout(components: &LabeledArray, scores: &LabeledArray, dim: &str, ratio: &[f64]) -> Result<(), EofError> {
    let invalid = |reason: String| Err(EofError::InvalidFit { reason });
    if components.dims().first().map(String::as_str) != Some(MODE_DIM) {
        return invalid(format!("components must lead with '{MODE_DIM}', got {:?}", components.dims()));
    }
    if !scores.has_axis(MODE_DIM) || !scores.has_axis(dim) {
        return invalid(format!("scores must span '{MODE_DIM}' and '{dim}', got {:?}", scores.dims()));
    }
    let modes = components.shape()[0];
    if scores.len_of(MODE_DIM) != Some(modes) || ratio.len() != modes {
        return invalid(format!(
            "{modes} component(s) but {} explained variance ratio(s)",
            ratio.len()
        ));
    }
    Ok(())
}
