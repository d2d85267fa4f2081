//! Clustering engines over caller-owned pairwise dissimilarity matrices,
//! and the evaluation metrics judging their output.
//!
//! Engines implement [`ClusterEngine`]: a single `train` call over an `N×N`
//! symmetric matrix produces one label per point, after which the engine is
//! read-only until [`ClusterEngine::cleanup`]. Label conventions follow the
//! noise-aware scheme: DBSCAN reserves label 0 for noise with clusters
//! `1..=K`; NJW/k-means label `0..K` with no noise class and can be aligned
//! with [`reserve_noise_label`].

pub mod evaluation;

mod dbscan;
mod kmeans;
mod njw;

pub use dbscan::{DbscanParams, DistanceDbscan};
pub use kmeans::{Kmeans, KmeansParams, PointClusterer};
pub use njw::{Njw, NjwParams};

use nalgebra::DMatrix;

use crate::error::ClusterError;
use crate::measure::MeasureKind;

/// One cluster label per input point.
pub type Labels = Vec<usize>;

/// A clustering engine over a pairwise dissimilarity matrix.
pub trait ClusterEngine {
    /// Trains on the matrix and returns the labels. `kind` states whether
    /// the matrix holds distances or similarities; engines convert as
    /// needed. Training an already-trained engine is an
    /// [`ClusterError::InvalidState`] error; call
    /// [`ClusterEngine::cleanup`] first.
    fn train(&mut self, matrix: &DMatrix<f64>, kind: MeasureKind) -> Result<Labels, ClusterError>;

    /// Number of clusters of the trained model.
    fn num_clusters(&self) -> usize;

    fn method_name(&self) -> &'static str;

    fn is_trained(&self) -> bool;

    /// Releases the trained state; the engine may be trained again.
    fn cleanup(&mut self);
}

/// Shifts 0-based labels up by one so label 0 is free for a noise class,
/// aligning k-means/NJW output with the DBSCAN convention.
pub fn reserve_noise_label(labels: &[usize]) -> Labels {
    labels.iter().map(|&l| l + 1).collect()
}

/// Square, NaN-free and symmetric (within tolerance); returns the size.
pub(crate) fn validate_square_matrix(
    matrix: &DMatrix<f64>,
    component: &'static str,
) -> Result<usize, ClusterError> {
    let n = matrix.nrows();
    if matrix.ncols() != n {
        return Err(ClusterError::invalid_input(
            component,
            format!("matrix must be square, got {}x{}", n, matrix.ncols()),
        ));
    }
    if n < 2 {
        return Err(ClusterError::invalid_input(
            component,
            "matrix must cover at least two points",
        ));
    }
    for i in 0..n {
        for j in 0..n {
            let value = matrix[(i, j)];
            if value.is_nan() {
                return Err(ClusterError::invalid_input(
                    component,
                    format!("matrix entry ({i}, {j}) is NaN"),
                ));
            }
            if j > i {
                let mirrored = matrix[(j, i)];
                if (value - mirrored).abs() > 1e-9 * (1.0 + value.abs()) {
                    return Err(ClusterError::invalid_input(
                        component,
                        format!("matrix is not symmetric at ({i}, {j})"),
                    ));
                }
            }
        }
    }
    Ok(n)
}

/// Labels must cover exactly the matrix rows.
pub(crate) fn validate_labels(
    labels: &[usize],
    n: usize,
    component: &'static str,
) -> Result<(), ClusterError> {
    if labels.len() == n {
        Ok(())
    } else {
        Err(ClusterError::invalid_input(
            component,
            format!("{} labels for a {n}-point matrix", labels.len()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asymmetric_matrices_are_rejected() {
        let mut m = DMatrix::<f64>::zeros(3, 3);
        m[(0, 1)] = 1.0;
        m[(1, 0)] = 2.0;
        assert!(validate_square_matrix(&m, "test").is_err());
    }

    #[test]
    fn nan_entries_are_rejected() {
        let mut m = DMatrix::<f64>::zeros(2, 2);
        m[(0, 1)] = f64::NAN;
        m[(1, 0)] = f64::NAN;
        assert!(validate_square_matrix(&m, "test").is_err());
    }

    #[test]
    fn reserve_noise_label_shifts_up() {
        assert_eq!(reserve_noise_label(&[0, 1, 0, 2]), vec![1, 2, 1, 3]);
    }
}
