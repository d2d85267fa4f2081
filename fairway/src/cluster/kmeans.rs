use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::Labels;
use crate::error::ClusterError;

/// A clusterer over plain point samples, used internally by the spectral
/// engine.
pub trait PointClusterer {
    fn train_points(&mut self, samples: &[Vec<f64>]) -> Result<Labels, ClusterError>;
    fn method_name(&self) -> &'static str;
    fn cleanup(&mut self);
}

/// Parameters of [`Kmeans`].
#[derive(Clone, Copy, Debug)]
pub struct KmeansParams {
    pub k: usize,
    /// Convergence threshold on the largest centroid movement.
    pub epsilon: f64,
    pub max_iterations: usize,
    /// Independent restarts; the run with the lowest inertia wins.
    pub restarts: usize,
    /// Seed of the deterministic k-means++ initialisation.
    pub seed: u64,
}

impl Default for KmeansParams {
    fn default() -> Self {
        KmeansParams {
            k: 2,
            epsilon: 1e-6,
            max_iterations: 100,
            restarts: 8,
            seed: 0x5eed,
        }
    }
}

/// Lloyd's k-means with k-means++ seeding.
///
/// The assignment step runs in parallel; seeding draws from a seeded
/// generator, so a fixed parameter set always reproduces the same
/// labelling. Several independent restarts are run and the lowest-inertia
/// result is kept.
#[derive(Clone, Debug)]
pub struct Kmeans {
    params: KmeansParams,
    centroids: Option<Vec<Vec<f64>>>,
    labels: Option<Labels>,
}

impl Kmeans {
    pub fn new(params: KmeansParams) -> Result<Self, ClusterError> {
        if params.k == 0 {
            return Err(ClusterError::invalid_input("Kmeans", "k must be at least 1"));
        }
        if !(params.epsilon > 0.0) {
            return Err(ClusterError::invalid_input(
                "Kmeans",
                format!("epsilon must be positive, got {}", params.epsilon),
            ));
        }
        if params.max_iterations == 0 || params.restarts == 0 {
            return Err(ClusterError::invalid_input(
                "Kmeans",
                "max_iterations and restarts must be at least 1",
            ));
        }
        Ok(Kmeans {
            params,
            centroids: None,
            labels: None,
        })
    }

    pub fn params(&self) -> KmeansParams {
        self.params
    }

    pub fn is_trained(&self) -> bool {
        self.centroids.is_some()
    }

    pub fn labels(&self) -> Option<&Labels> {
        self.labels.as_ref()
    }

    pub fn centroids(&self) -> Option<&[Vec<f64>]> {
        self.centroids.as_deref()
    }

    /// Nearest-centroid label of a new sample. Requires a trained model.
    pub fn classify(&self, sample: &[f64]) -> Result<usize, ClusterError> {
        let centroids = self.centroids.as_ref().ok_or_else(|| {
            ClusterError::invalid_state("Kmeans", "classify called before train")
        })?;
        if sample.len() != centroids[0].len() {
            return Err(ClusterError::invalid_input(
                "Kmeans",
                format!(
                    "sample has {} dimensions, model has {}",
                    sample.len(),
                    centroids[0].len()
                ),
            ));
        }
        Ok(nearest(centroids, sample).0)
    }

    fn lloyd(&self, samples: &[Vec<f64>], rng: &mut StdRng) -> (f64, Labels, Vec<Vec<f64>>) {
        let k = self.params.k;
        let dims = samples[0].len();
        let mut centroids = seed_centroids(samples, k, rng);

        for _ in 0..self.params.max_iterations {
            let assignment: Vec<(usize, f64)> = samples
                .par_iter()
                .map(|s| nearest(&centroids, s))
                .collect();

            let mut sums = vec![vec![0.0f64; dims]; k];
            let mut counts = vec![0usize; k];
            for (s, &(c, _)) in samples.iter().zip(&assignment) {
                counts[c] += 1;
                for (acc, &v) in sums[c].iter_mut().zip(s) {
                    *acc += v;
                }
            }

            let mut movement: f64 = 0.0;
            for c in 0..k {
                if counts[c] == 0 {
                    continue; // an emptied cluster keeps its centroid
                }
                let new: Vec<f64> = sums[c].iter().map(|&v| v / counts[c] as f64).collect();
                movement = movement.max(squared_distance(&centroids[c], &new).sqrt());
                centroids[c] = new;
            }
            if movement < self.params.epsilon {
                break;
            }
        }

        let assignment: Vec<(usize, f64)> = samples
            .par_iter()
            .map(|s| nearest(&centroids, s))
            .collect();
        let inertia = assignment.iter().map(|&(_, d)| d).sum();
        let labels = assignment.into_iter().map(|(c, _)| c).collect();
        (inertia, labels, centroids)
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(centroids: &[Vec<f64>], sample: &[f64]) -> (usize, f64) {
    let mut best = (0usize, f64::INFINITY);
    for (c, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(centroid, sample);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

/// k-means++: each further centroid is drawn with probability proportional
/// to the squared distance from the nearest centroid chosen so far.
fn seed_centroids(samples: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(samples[rng.gen_range(0..samples.len())].clone());
    let mut min_sq = vec![f64::INFINITY; samples.len()];
    while centroids.len() < k {
        let latest = centroids.last().unwrap();
        for (slot, s) in min_sq.iter_mut().zip(samples) {
            *slot = (*slot).min(squared_distance(latest, s));
        }
        let total: f64 = min_sq.iter().sum();
        let pick = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = samples.len() - 1;
            for (i, &w) in min_sq.iter().enumerate() {
                target -= w;
                if target <= 0.0 {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            rng.gen_range(0..samples.len())
        };
        centroids.push(samples[pick].clone());
    }
    centroids
}

impl PointClusterer for Kmeans {
    fn train_points(&mut self, samples: &[Vec<f64>]) -> Result<Labels, ClusterError> {
        if samples.is_empty() {
            return Err(ClusterError::invalid_input("Kmeans", "no samples given"));
        }
        let dims = samples[0].len();
        if dims == 0 || samples.iter().any(|s| s.len() != dims) {
            return Err(ClusterError::invalid_input(
                "Kmeans",
                "samples must share one non-zero dimensionality",
            ));
        }
        if samples.len() < self.params.k {
            return Err(ClusterError::invalid_input(
                "Kmeans",
                format!("k = {} exceeds {} samples", self.params.k, samples.len()),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut best: Option<(f64, Labels, Vec<Vec<f64>>)> = None;
        for restart in 0..self.params.restarts {
            let run = self.lloyd(samples, &mut rng);
            log::trace!("Kmeans: restart {restart} inertia {}", run.0);
            if best.as_ref().map_or(true, |b| run.0 < b.0) {
                best = Some(run);
            }
        }
        let (inertia, labels, centroids) = best.unwrap();
        log::debug!(
            "Kmeans: {} samples into {} clusters, inertia {inertia}",
            samples.len(),
            self.params.k
        );
        self.centroids = Some(centroids);
        self.labels = Some(labels.clone());
        Ok(labels)
    }

    fn method_name(&self) -> &'static str {
        "Kmeans"
    }

    fn cleanup(&mut self) {
        self.centroids = None;
        self.labels = None;
    }
}
