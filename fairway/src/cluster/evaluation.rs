//! Evaluation metrics over a labelling and its distance matrix: sorted
//! intra-cluster distance graphs with summary statistics, pseudo-medoids,
//! a pseudo-Davies–Bouldin index and silhouettes.
//!
//! All functions treat label values as plain group identifiers, so the
//! DBSCAN noise group 0 is evaluated like any other group.

use nalgebra::DMatrix;
use rayon::prelude::*;

use super::{validate_labels, validate_square_matrix};
use crate::error::ClusterError;

/// Summary statistics of one distance population.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DistanceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl DistanceStats {
    /// Statistics of an ascending-sorted slice; all zeros when empty.
    fn from_sorted(values: &[f64]) -> Self {
        if values.is_empty() {
            return DistanceStats::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let median = if values.len() % 2 == 1 {
            values[values.len() / 2]
        } else {
            0.5 * (values[values.len() / 2 - 1] + values[values.len() / 2])
        };
        DistanceStats {
            min: values[0],
            max: *values.last().unwrap(),
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
        }
    }
}

/// Per-cluster and pooled statistics of the intra-cluster distances.
#[derive(Clone, Debug, Default)]
pub struct ClusterDistanceAnalysis {
    pub per_cluster: Vec<DistanceStats>,
    pub overall: DistanceStats,
}

fn group_count(labels: &[usize]) -> usize {
    labels.iter().max().map_or(0, |&m| m + 1)
}

/// The ascending-sorted pairwise distances within each cluster.
pub fn sorted_intra_cluster_distances(
    labels: &[usize],
    matrix: &DMatrix<f64>,
) -> Result<Vec<Vec<f64>>, ClusterError> {
    let n = validate_square_matrix(matrix, "SortedDistanceGraph")?;
    validate_labels(labels, n, "SortedDistanceGraph")?;

    let mut groups = vec![Vec::new(); group_count(labels)];
    for i in 0..n {
        for j in i + 1..n {
            if labels[i] == labels[j] {
                groups[labels[i]].push(matrix[(i, j)]);
            }
        }
    }
    for distances in &mut groups {
        distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
    }
    Ok(groups)
}

/// Summary statistics of the intra-cluster distances, per cluster and over
/// their union.
pub fn distance_analysis(
    labels: &[usize],
    matrix: &DMatrix<f64>,
) -> Result<ClusterDistanceAnalysis, ClusterError> {
    let groups = sorted_intra_cluster_distances(labels, matrix)?;
    let mut pooled: Vec<f64> = groups.iter().flatten().copied().collect();
    pooled.sort_by(|a, b| a.partial_cmp(b).unwrap());
    Ok(ClusterDistanceAnalysis {
        per_cluster: groups
            .iter()
            .map(|g| DistanceStats::from_sorted(g))
            .collect(),
        overall: DistanceStats::from_sorted(&pooled),
    })
}

/// Per cluster, the member minimising the summed distance to the other
/// members: a discrete stand-in for the medoid. Empty clusters keep
/// index 0.
pub fn pseudo_medoids(
    labels: &[usize],
    matrix: &DMatrix<f64>,
) -> Result<Vec<usize>, ClusterError> {
    let n = validate_square_matrix(matrix, "PseudoMedoid")?;
    validate_labels(labels, n, "PseudoMedoid")?;

    let clusters = group_count(labels);
    let mut medoids = vec![0usize; clusters];
    let mut best_sums = vec![f64::INFINITY; clusters];
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..n {
            if i != j && labels[i] == labels[j] {
                sum += matrix[(i, j)];
            }
        }
        if sum < best_sums[labels[i]] {
            best_sums[labels[i]] = sum;
            medoids[labels[i]] = i;
        }
    }
    Ok(medoids)
}

/// Pseudo-Davies–Bouldin index per cluster: the root-mean-square distance
/// of the members to their pseudo-medoid; 0 for an empty cluster.
pub fn pseudo_davies_bouldin(
    labels: &[usize],
    matrix: &DMatrix<f64>,
) -> Result<Vec<f64>, ClusterError> {
    let medoids = pseudo_medoids(labels, matrix)?;
    let clusters = medoids.len();
    let mut sums = vec![0.0f64; clusters];
    let mut counts = vec![0usize; clusters];
    for (i, &label) in labels.iter().enumerate() {
        let d = matrix[(i, medoids[label])];
        sums[label] += d * d;
        counts[label] += 1;
    }
    Ok(sums
        .iter()
        .zip(&counts)
        .map(|(&sum, &count)| {
            if count == 0 {
                0.0
            } else {
                (sum / count as f64).sqrt()
            }
        })
        .collect())
}

/// Silhouette of one point: `(b − a) / max(a, b)` with `a` the mean
/// distance to the rest of its own cluster and `b` the smallest mean
/// distance to another non-empty cluster. Points in singleton clusters,
/// and every point when no other cluster exists, score exactly 0.
pub fn silhouette(
    index: usize,
    labels: &[usize],
    matrix: &DMatrix<f64>,
) -> Result<f64, ClusterError> {
    let n = validate_square_matrix(matrix, "Silhouette")?;
    validate_labels(labels, n, "Silhouette")?;
    if index >= n {
        return Err(ClusterError::invalid_input(
            "Silhouette",
            format!("point index {index} out of range for {n} points"),
        ));
    }
    Ok(silhouette_unchecked(index, labels, matrix))
}

fn silhouette_unchecked(index: usize, labels: &[usize], matrix: &DMatrix<f64>) -> f64 {
    let n = labels.len();
    let clusters = group_count(labels);
    let mut sums = vec![0.0f64; clusters];
    let mut counts = vec![0usize; clusters];
    for i in 0..n {
        if i == index {
            continue;
        }
        sums[labels[i]] += matrix[(index, i)];
        counts[labels[i]] += 1;
    }

    let own = labels[index];
    if counts[own] == 0 {
        return 0.0; // singleton cluster
    }
    let a = sums[own] / counts[own] as f64;
    let mut b = f64::INFINITY;
    for c in 0..clusters {
        if c != own && counts[c] > 0 {
            b = b.min(sums[c] / counts[c] as f64);
        }
    }
    if !b.is_finite() {
        return 0.0; // no other cluster to compare against
    }
    (b - a) / a.max(b)
}

/// Silhouette of every point, in parallel.
pub fn silhouettes(labels: &[usize], matrix: &DMatrix<f64>) -> Result<Vec<f64>, ClusterError> {
    let n = validate_square_matrix(matrix, "Silhouette")?;
    validate_labels(labels, n, "Silhouette")?;
    Ok((0..n)
        .into_par_iter()
        .map(|i| silhouette_unchecked(i, labels, matrix))
        .collect())
}
