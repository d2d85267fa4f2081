use std::collections::VecDeque;

use nalgebra::DMatrix;
use rayon::prelude::*;

use super::{validate_square_matrix, ClusterEngine, Labels};
use crate::error::ClusterError;
use crate::measure::MeasureKind;

/// Parameters of [`DistanceDbscan`].
#[derive(Clone, Copy, Debug)]
pub struct DbscanParams {
    /// Density threshold: a point is a core point when its ε-neighbourhood,
    /// the point itself included, holds at least `min_pts` points.
    pub min_pts: usize,
    /// Neighbour radius ε, in distance-matrix units.
    pub epsilon: f64,
}

/// Density-based clustering straight off a pairwise distance matrix.
///
/// Similarity input is first converted to a distance by `s ↦ √(−ln s)`
/// (non-positive similarities map to +∞). The point set is then swept in
/// index order: each unlabelled core point seeds a cluster that expands
/// breadth-first through core points, attaching non-core neighbours as
/// border points; points reachable from no core point are noise. Labels are
/// emitted with **0 = noise** and clusters `1..=K`, and
/// [`ClusterEngine::num_clusters`] reports `K`.
///
/// # Examples
///
/// ```
/// use fairway::cluster::{ClusterEngine, DbscanParams, DistanceDbscan};
/// use fairway::measure::MeasureKind;
/// use nalgebra::DMatrix;
///
/// // two points close together, one far away
/// let points = [0.0f64, 1.0, 40.0];
/// let m = DMatrix::from_fn(3, 3, |i, j| (points[i] - points[j]).abs());
/// let mut dbscan = DistanceDbscan::new(DbscanParams {
///     min_pts: 2,
///     epsilon: 2.0,
/// })
/// .unwrap();
/// let labels = dbscan.train(&m, MeasureKind::Distance).unwrap();
/// assert_eq!(labels, vec![1, 1, 0]); // 0 is noise
/// assert_eq!(dbscan.num_clusters(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct DistanceDbscan {
    params: DbscanParams,
    labels: Option<Labels>,
    num_clusters: usize,
}

// internal label scheme during the sweep; shifted down on completion
const UNCLASSIFIED: usize = 0;
const NOISE: usize = 1;

impl DistanceDbscan {
    pub fn new(params: DbscanParams) -> Result<Self, ClusterError> {
        if params.min_pts == 0 {
            return Err(ClusterError::invalid_input(
                "DistanceBasedDBSCAN",
                "min_pts must be at least 1",
            ));
        }
        if !(params.epsilon > 0.0) {
            return Err(ClusterError::invalid_input(
                "DistanceBasedDBSCAN",
                format!("epsilon must be positive, got {}", params.epsilon),
            ));
        }
        Ok(DistanceDbscan {
            params,
            labels: None,
            num_clusters: 0,
        })
    }

    pub fn params(&self) -> DbscanParams {
        self.params
    }

    /// Labels of the last training run.
    pub fn labels(&self) -> Option<&Labels> {
        self.labels.as_ref()
    }

    /// Classifying new points against a trained model is future work.
    pub fn classify(&self, _distances_to_training: &[f64]) -> Result<usize, ClusterError> {
        Err(ClusterError::NotImplemented {
            component: "DistanceBasedDBSCAN",
            operation: "online classification",
        })
    }

    fn neighbour_sets(&self, matrix: &DMatrix<f64>, similarity: bool) -> Vec<Vec<usize>> {
        let n = matrix.nrows();
        (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .filter(|&j| {
                        if i == j {
                            return false;
                        }
                        let d = if similarity {
                            similarity_to_distance(matrix[(i, j)])
                        } else {
                            matrix[(i, j)]
                        };
                        d < self.params.epsilon
                    })
                    .collect()
            })
            .collect()
    }

    fn expand_cluster(
        &self,
        seed: usize,
        cluster: usize,
        neighbours: &[Vec<usize>],
        labels: &mut [usize],
    ) {
        let mut queue = VecDeque::from([seed]);
        while let Some(p) = queue.pop_front() {
            labels[p] = cluster;
            // only core points propagate the cluster; non-core members
            // stay attached as border points
            if neighbours[p].len() + 1 >= self.params.min_pts {
                for &q in &neighbours[p] {
                    if labels[q] != cluster {
                        queue.push_back(q);
                    }
                }
            }
        }
    }
}

fn similarity_to_distance(s: f64) -> f64 {
    if s <= 0.0 {
        f64::INFINITY
    } else {
        (-s.ln()).max(0.0).sqrt()
    }
}

impl ClusterEngine for DistanceDbscan {
    fn train(&mut self, matrix: &DMatrix<f64>, kind: MeasureKind) -> Result<Labels, ClusterError> {
        if self.is_trained() {
            return Err(ClusterError::invalid_state(
                "DistanceBasedDBSCAN",
                "train called twice without cleanup",
            ));
        }
        let n = validate_square_matrix(matrix, "DistanceBasedDBSCAN")?;
        if n <= self.params.min_pts {
            return Err(ClusterError::invalid_input(
                "DistanceBasedDBSCAN",
                format!("{n} points cannot satisfy min_pts {}", self.params.min_pts),
            ));
        }

        let neighbours = self.neighbour_sets(matrix, kind == MeasureKind::Similarity);

        let mut labels = vec![UNCLASSIFIED; n];
        // clusters are numbered from 2 during the sweep; the final shift
        // down makes noise 0 and clusters 1..=K
        let mut next_cluster = NOISE + 1;
        for i in 0..n {
            if labels[i] != UNCLASSIFIED {
                continue;
            }
            if neighbours[i].len() + 1 >= self.params.min_pts {
                self.expand_cluster(i, next_cluster, &neighbours, &mut labels);
                next_cluster += 1;
            } else {
                labels[i] = NOISE;
            }
        }
        for label in &mut labels {
            debug_assert!(*label > UNCLASSIFIED);
            *label -= 1;
        }

        self.num_clusters = next_cluster - NOISE - 1;
        log::debug!(
            "DistanceBasedDBSCAN: {} clusters, {} noise points over {n} points",
            self.num_clusters,
            labels.iter().filter(|&&l| l == 0).count()
        );
        self.labels = Some(labels.clone());
        Ok(labels)
    }

    fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    fn method_name(&self) -> &'static str {
        "DistanceBasedDBSCAN"
    }

    fn is_trained(&self) -> bool {
        self.labels.is_some()
    }

    fn cleanup(&mut self) {
        self.labels = None;
        self.num_clusters = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_of(points: &[(f64, f64)]) -> DMatrix<f64> {
        DMatrix::from_fn(points.len(), points.len(), |i, j| {
            let (xi, yi) = points[i];
            let (xj, yj) = points[j];
            (xi - xj).hypot(yi - yj)
        })
    }

    fn toy() -> DMatrix<f64> {
        matrix_of(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (50.0, 50.0), (51.0, 50.0)])
    }

    #[test]
    fn two_clusters_with_reserved_noise_label() {
        let mut dbscan = DistanceDbscan::new(DbscanParams {
            min_pts: 2,
            epsilon: 2.5,
        })
        .unwrap();
        let labels = dbscan.train(&toy(), MeasureKind::Distance).unwrap();
        assert_eq!(labels, vec![1, 1, 1, 2, 2]);
        assert_eq!(dbscan.num_clusters(), 2);
        assert!(dbscan.is_trained());
    }

    #[test]
    fn sparse_points_become_noise() {
        let mut dbscan = DistanceDbscan::new(DbscanParams {
            min_pts: 3,
            epsilon: 2.5,
        })
        .unwrap();
        let labels = dbscan.train(&toy(), MeasureKind::Distance).unwrap();
        // the pair at (50, 50) is too thin for min_pts 3
        assert_eq!(labels, vec![1, 1, 1, 0, 0]);
        assert_eq!(dbscan.num_clusters(), 1);
    }

    #[test]
    fn labelling_is_stable_under_input_rotation() {
        let rotated = matrix_of(&[(50.0, 50.0), (51.0, 50.0), (0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let mut dbscan = DistanceDbscan::new(DbscanParams {
            min_pts: 2,
            epsilon: 2.5,
        })
        .unwrap();
        let labels = dbscan.train(&rotated, MeasureKind::Distance).unwrap();
        // same partition up to cluster-index permutation
        assert_eq!(labels, vec![1, 1, 2, 2, 2]);
        assert_eq!(dbscan.num_clusters(), 2);
    }

    #[test]
    fn border_points_attach_without_propagating() {
        // a chain where the tail point is within reach of the last core
        // point but is not core itself
        let m = matrix_of(&[(0.0, 0.0), (1.0, 0.0), (1.5, 0.5), (3.0, 0.0)]);
        let mut dbscan = DistanceDbscan::new(DbscanParams {
            min_pts: 3,
            epsilon: 1.7,
        })
        .unwrap();
        let labels = dbscan.train(&m, MeasureKind::Distance).unwrap();
        assert_eq!(labels, vec![1, 1, 1, 1]);
        assert_eq!(dbscan.num_clusters(), 1);
    }

    #[test]
    fn similarity_input_is_converted() {
        // exp(-d²) similarities of the toy layout
        let base = toy();
        let sim = DMatrix::from_fn(5, 5, |i, j| {
            if i == j {
                1.0
            } else {
                (-(base[(i, j)] * base[(i, j)])).exp()
            }
        });
        let mut dbscan = DistanceDbscan::new(DbscanParams {
            min_pts: 2,
            epsilon: 2.5,
        })
        .unwrap();
        // √(−ln s) recovers the original distances
        let labels = dbscan.train(&sim, MeasureKind::Similarity).unwrap();
        assert_eq!(labels, vec![1, 1, 1, 2, 2]);
    }

    #[test]
    fn retraining_without_cleanup_is_rejected() {
        let mut dbscan = DistanceDbscan::new(DbscanParams {
            min_pts: 2,
            epsilon: 2.5,
        })
        .unwrap();
        dbscan.train(&toy(), MeasureKind::Distance).unwrap();
        assert!(matches!(
            dbscan.train(&toy(), MeasureKind::Distance),
            Err(ClusterError::InvalidState { .. })
        ));
        dbscan.cleanup();
        assert!(!dbscan.is_trained());
        assert!(dbscan.train(&toy(), MeasureKind::Distance).is_ok());
    }

    #[test]
    fn online_classification_is_not_implemented() {
        let dbscan = DistanceDbscan::new(DbscanParams {
            min_pts: 2,
            epsilon: 2.5,
        })
        .unwrap();
        assert!(matches!(
            dbscan.classify(&[0.0, 1.0]),
            Err(ClusterError::NotImplemented { .. })
        ));
    }
}
