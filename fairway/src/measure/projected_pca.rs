use nalgebra::{DMatrix, DVector, SymmetricEigen};

use super::TrajectoryMeasure;
use crate::error::MeasureError;
use fairway_types::XyList;

/// Trajectory distance in a PCA-projected flattened coordinate space.
///
/// Each trajectory of `N` waypoints is flattened to a `2N`-vector
/// `(lon₀, lat₀, lon₁, lat₁, …)`; [`ProjectedPca::fit`] computes the
/// principal axes of the flattened training set, and the measure is the
/// Euclidean norm of the difference of the projected vectors. All
/// trajectories must be uniformly resampled to the same length first.
///
/// With `auto_dimension` the cut-off is placed at the largest gap of the
/// eigenvalue spectrum; a fixed `dimension` of 0 disables the projection
/// (identity).
#[derive(Clone, Debug)]
pub struct ProjectedPca {
    /// Number of principal axes kept. Ignored when `auto_dimension` is set.
    pub dimension: usize,
    /// Place the cut-off at the largest eigenvalue gap.
    pub auto_dimension: bool,
    pub reversed_sequence: bool,
    projection: Option<DMatrix<f64>>,
}

impl ProjectedPca {
    pub fn new(dimension: usize, auto_dimension: bool) -> Self {
        ProjectedPca {
            dimension,
            auto_dimension,
            reversed_sequence: false,
            projection: None,
        }
    }

    /// Number of axes of the fitted projection, if fitted.
    pub fn projected_dimension(&self) -> Option<usize> {
        self.projection.as_ref().map(|p| p.nrows())
    }

    fn flatten(t: &XyList) -> DVector<f64> {
        DVector::from_fn(t.len() * 2, |i, _| {
            let wp = t[i / 2];
            if i % 2 == 0 {
                wp.lon
            } else {
                wp.lat
            }
        })
    }

    /// Computes the projection from the training trajectories. Must run
    /// before the first `measure` call.
    pub fn fit(&mut self, trajectories: &[XyList]) -> Result<(), MeasureError> {
        if trajectories.is_empty() {
            return Err(MeasureError::invalid_input(
                "ProjectedPCA",
                "fit needs at least one trajectory",
            ));
        }
        let len = trajectories[0].len();
        if len < 2 || trajectories.iter().any(|t| t.len() != len) {
            return Err(MeasureError::invalid_input(
                "ProjectedPCA",
                "fit needs uniformly resampled trajectories of equal length >= 2",
            ));
        }
        let vn = 2 * len;

        if !self.auto_dimension && self.dimension == 0 {
            self.projection = Some(DMatrix::identity(vn, vn));
            return Ok(());
        }

        // covariance of the flattened samples: E[x xᵀ] − μ μᵀ
        let mut second_moment = DMatrix::<f64>::zeros(vn, vn);
        let mut mean = DVector::<f64>::zeros(vn);
        for t in trajectories {
            let x = Self::flatten(t);
            second_moment += &x * x.transpose();
            mean += &x;
        }
        let count = trajectories.len() as f64;
        second_moment /= count;
        mean /= count;
        let covariance = second_moment - &mean * mean.transpose();

        let eigen = SymmetricEigen::new(covariance);
        // ascending eigenvalue order; nalgebra leaves them unsorted
        let mut order: Vec<usize> = (0..vn).collect();
        order.sort_by(|&p, &q| {
            eigen.eigenvalues[p]
                .partial_cmp(&eigen.eigenvalues[q])
                .unwrap()
        });

        let dimension = if self.auto_dimension {
            let mut gap_index = vn - 1;
            let mut max_gap = 0.0;
            for i in (1..vn).rev() {
                let gap = eigen.eigenvalues[order[i]] - eigen.eigenvalues[order[i - 1]];
                if gap > max_gap {
                    max_gap = gap;
                    gap_index = i;
                }
            }
            vn - gap_index
        } else {
            self.dimension.min(vn)
        };

        // top `dimension` eigenvectors as rows of the projection
        self.projection = Some(DMatrix::from_fn(dimension, vn, |r, c| {
            eigen.eigenvectors[(c, order[vn - dimension + r])]
        }));
        Ok(())
    }
}

impl TrajectoryMeasure<XyList> for ProjectedPca {
    fn measure_core(&self, a: &XyList, b: &XyList) -> Result<f64, MeasureError> {
        let projection = self.projection.as_ref().ok_or_else(|| {
            MeasureError::invalid_state("ProjectedPCA", "fit must be called before measure")
        })?;
        if a.len() != b.len() || projection.ncols() != 2 * a.len() {
            return Err(MeasureError::invalid_input(
                "ProjectedPCA",
                "trajectory length does not match the fitted projection",
            ));
        }
        let diff = Self::flatten(a) - Self::flatten(b);
        Ok((projection * diff).norm())
    }

    fn name(&self) -> &'static str {
        "ProjectedPCA"
    }

    fn reversed_sequence(&self) -> bool {
        self.reversed_sequence
    }
}
