//! Parallel all-pairs distance-matrix construction.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::error::MeasureError;
use crate::measure::{Trajectory, TrajectoryMeasure};

/// A monotone 0..1 progress signal for a matrix build. Clone the handle and
/// poll [`Progress::fraction`] from any thread; the observer never contends
/// with the evaluation itself.
#[derive(Clone, Debug, Default)]
pub struct Progress {
    inner: Arc<ProgressState>,
}

#[derive(Debug, Default)]
struct ProgressState {
    completed: AtomicUsize,
    total: AtomicUsize,
}

impl Progress {
    pub fn new() -> Self {
        Progress::default()
    }

    /// Completed fraction in `[0, 1]`; 0 before the build starts.
    pub fn fraction(&self) -> f64 {
        let total = self.inner.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.inner.completed.load(Ordering::Relaxed) as f64 / total as f64
    }

    fn begin(&self, total: usize) {
        self.inner.completed.store(0, Ordering::Relaxed);
        self.inner.total.store(total.max(1), Ordering::Relaxed);
    }

    fn bump(&self) {
        self.inner.completed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Builds the symmetric pairwise dissimilarity matrix of `trajectories`
/// under `measure`: `M[i][j] = M[j][i] = measure(tᵢ, tⱼ)` for `i < j`, zero
/// diagonal. Pair evaluations run in parallel across all cores; the first
/// kernel error aborts the build, and a partial matrix is never returned.
///
/// # Examples
///
/// ```
/// use fairway::geodesy::{self, CoordSysKind};
/// use fairway::matrix::pairwise_distance_matrix;
/// use fairway::measure::DynamicTimeWarping;
/// use fairway_types::{Position, XyList};
///
/// geodesy::set_default_coord_sys(CoordSysKind::Haversine).unwrap();
///
/// let tracks: Vec<XyList> = (0..3)
///     .map(|t| {
///         (0..4)
///             .map(|i| Position::new(0.01 * i as f64, 0.01 * t as f64))
///             .collect()
///     })
///     .collect();
/// let m = pairwise_distance_matrix(&DynamicTimeWarping::default(), &tracks).unwrap();
/// assert_eq!(m.nrows(), 3);
/// assert_eq!(m[(1, 2)], m[(2, 1)]);
/// assert_eq!(m[(0, 0)], 0.0);
/// ```
pub fn pairwise_distance_matrix<T, M>(
    measure: &M,
    trajectories: &[T],
) -> Result<DMatrix<f64>, MeasureError>
where
    T: Trajectory + Sync,
    M: TrajectoryMeasure<T> + Sync,
{
    pairwise_distance_matrix_with_progress(measure, trajectories, &Progress::new())
}

/// [`pairwise_distance_matrix`] reporting into the given progress handle.
pub fn pairwise_distance_matrix_with_progress<T, M>(
    measure: &M,
    trajectories: &[T],
    progress: &Progress,
) -> Result<DMatrix<f64>, MeasureError>
where
    T: Trajectory + Sync,
    M: TrajectoryMeasure<T> + Sync,
{
    let count = trajectories.len();
    let pairs: Vec<(usize, usize)> = (0..count)
        .flat_map(|i| (i + 1..count).map(move |j| (i, j)))
        .collect();
    progress.begin(pairs.len());
    log::debug!(
        "{}: computing {} pairwise distances over {} trajectories",
        measure.name(),
        pairs.len(),
        count
    );

    let distances: Result<Vec<f64>, MeasureError> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let d = measure.measure(&trajectories[i], &trajectories[j]);
            progress.bump();
            d
        })
        .collect();
    let distances = distances?;

    let mut matrix = DMatrix::<f64>::zeros(count, count);
    for (&(i, j), &d) in pairs.iter().zip(&distances) {
        matrix[(i, j)] = d;
        matrix[(j, i)] = d;
    }
    log::debug!("{}: distance matrix finished", measure.name());
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::DynamicTimeWarping;
    use crate::test_support::use_haversine;
    use fairway_types::{Position, XyList};

    fn fleet() -> Vec<XyList> {
        (0..5)
            .map(|t| {
                (0..4)
                    .map(|i| Position::new(0.01 * i as f64, 0.02 * t as f64))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        use_haversine();
        let m = pairwise_distance_matrix(&DynamicTimeWarping::default(), &fleet()).unwrap();
        assert_eq!(m.nrows(), 5);
        for i in 0..5 {
            assert_eq!(m[(i, i)], 0.0);
            for j in 0..5 {
                assert_eq!(m[(i, j)], m[(j, i)]);
                assert!(m[(i, j)] >= 0.0 && !m[(i, j)].is_nan());
            }
        }
    }

    #[test]
    fn progress_reaches_one() {
        use_haversine();
        let progress = Progress::new();
        assert_eq!(progress.fraction(), 0.0);
        let _ = pairwise_distance_matrix_with_progress(
            &DynamicTimeWarping::default(),
            &fleet(),
            &progress,
        )
        .unwrap();
        assert_eq!(progress.fraction(), 1.0);
    }

    #[test]
    fn kernel_errors_abort_the_build() {
        use_haversine();
        let mut tracks = fleet();
        tracks.push(XyList::new(vec![Position::new(0.0, 0.0)])); // too short
        assert!(pairwise_distance_matrix(&DynamicTimeWarping::default(), &tracks).is_err());
    }
}
