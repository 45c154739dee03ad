//! Inner-join alignment of two arrays along one axis.

use crate::array::LabeledArray;
use crate::coord::label_positions;
use crate::error::GridError;

/// Keeps only the labels along `dim` present in both arrays, in `x`'s order.
///
/// # Errors
///
/// Returns [`GridError::MissingAxis`] if either array lacks `dim`,
/// [`GridError::InvalidCoordinate`] if its coordinate is not 1-D, or the
/// soft [`GridError::EmptyAlignment`] when no label is shared.
pub fn align(x: &LabeledArray, y: &LabeledArray, dim: &str) -> Result<(LabeledArray, LabeledArray), GridError> {
    x.axis_index(dim)?;
    y.axis_index(dim)?;
    let labels = |a: &LabeledArray| {
        a.coord(dim)
            .and_then(|c| c.labels())
            .ok_or_else(|| GridError::InvalidCoordinate {
                name: dim.to_string(),
                reason: "alignment needs a 1-D coordinate".to_string(),
            })
    };
    let (x_labels, y_labels) = (labels(x)?, labels(y)?);
    if x_labels == y_labels {
        return Ok((x.clone(), y.clone()));
    }
    let y_positions = label_positions(&y_labels);
    let (xi, yi): (Vec<usize>, Vec<usize>) = x_labels
        .iter()
        .enumerate()
        .filter_map(|(i, label)| y_positions.get(label).map(|&j| (i, j)))
        .unzip();
    if xi.is_empty() {
        return Err(GridError::EmptyAlignment {
            axis: dim.to_string(),
        });
    }
    Ok((x.take(dim, &xi)?, y.take(dim, &yi)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;

    fn labelled(name: &str, labels: Vec<f64>) -> LabeledArray {
        let n = labels.len();
        LabeledArray::series(name, "time", (0..n).map(|i| i as f64).collect())
            .with_coord("time", Coordinate::axis("time", labels))
            .unwrap()
    }

    #[test]
    fn intersection_in_x_order() {
        let x = labelled("x", vec![1.0, 2.0, 3.0, 4.0]);
        let y = labelled("y", vec![3.0, 4.0, 5.0]);
        let (ax, ay) = align(&x, &y, "time").unwrap();
        assert_eq!(ax.values().as_slice().unwrap(), &[2.0, 3.0]);
        assert_eq!(ay.values().as_slice().unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn disjoint_is_soft() {
        let x = labelled("x", vec![1.0]);
        let y = labelled("y", vec![2.0]);
        let err = align(&x, &y, "time").unwrap_err();
        assert!(err.is_soft());
    }
}
