use nalgebra::{DMatrix, SymmetricEigen};

use super::{validate_square_matrix, ClusterEngine, Kmeans, KmeansParams, Labels, PointClusterer};
use crate::error::ClusterError;
use crate::measure::MeasureKind;

/// Parameters of [`Njw`].
#[derive(Clone, Copy, Debug)]
pub struct NjwParams {
    /// Sigma of the Gaussian distance→similarity conversion.
    pub similarity_sigma: f64,
    /// Number of clusters, and dimensionality of the spectral embedding.
    pub k: usize,
}

/// Ng–Jordan–Weiss spectral clustering over a pairwise matrix.
///
/// A distance matrix is converted to the affinity `exp(−d²/2σ²)` with a
/// zero diagonal; the rows of the normalised affinity's top-`k` eigenvector
/// matrix are renormalised to unit length and handed to an internal
/// point clusterer (k-means by default). Labels are `0..k`, no noise class.
///
/// Deterministic up to the internal clusterer; the default k-means is
/// seeded, so the whole engine reproduces exactly for fixed parameters.
///
/// Ng, A., Jordan, M., & Weiss, Y. (2001). *On spectral clustering:
/// analysis and an algorithm.* NIPS 14.
#[derive(Clone, Debug)]
pub struct Njw<C: PointClusterer = Kmeans> {
    params: NjwParams,
    inner: C,
    embedding: Option<DMatrix<f64>>,
    labels: Option<Labels>,
}

impl Njw<Kmeans> {
    /// An NJW engine with an internal k-means; `kmeans.k` is overridden by
    /// `params.k`.
    pub fn new(params: NjwParams, kmeans: KmeansParams) -> Result<Self, ClusterError> {
        let inner = Kmeans::new(KmeansParams {
            k: params.k,
            ..kmeans
        })?;
        Self::with_clusterer(params, inner)
    }
}

impl<C: PointClusterer> Njw<C> {
    /// An NJW engine around an arbitrary internal point clusterer, which
    /// must produce `params.k` clusters labelled `0..k`.
    pub fn with_clusterer(params: NjwParams, inner: C) -> Result<Self, ClusterError> {
        if params.k == 0 {
            return Err(ClusterError::invalid_input("NJW", "k must be at least 1"));
        }
        if !(params.similarity_sigma > 0.0) {
            return Err(ClusterError::invalid_input(
                "NJW",
                format!(
                    "similarity_sigma must be positive, got {}",
                    params.similarity_sigma
                ),
            ));
        }
        Ok(Njw {
            params,
            inner,
            embedding: None,
            labels: None,
        })
    }

    pub fn params(&self) -> NjwParams {
        self.params
    }

    /// The row-normalised `N×k` spectral embedding of the training run.
    pub fn embedding(&self) -> Option<&DMatrix<f64>> {
        self.embedding.as_ref()
    }

    pub fn labels(&self) -> Option<&Labels> {
        self.labels.as_ref()
    }

    /// Classifying new points against a trained model is future work.
    pub fn classify(&self, _distances_to_training: &[f64]) -> Result<usize, ClusterError> {
        Err(ClusterError::NotImplemented {
            component: "NJW",
            operation: "online classification",
        })
    }

    fn affinity(&self, matrix: &DMatrix<f64>, kind: MeasureKind) -> DMatrix<f64> {
        let sigma_sq2 = 2.0 * self.params.similarity_sigma * self.params.similarity_sigma;
        DMatrix::from_fn(matrix.nrows(), matrix.ncols(), |i, j| {
            if i == j {
                0.0
            } else {
                match kind {
                    MeasureKind::Distance => {
                        let d = matrix[(i, j)];
                        (-d * d / sigma_sq2).exp()
                    }
                    MeasureKind::Similarity => matrix[(i, j)],
                }
            }
        })
    }
}

impl<C: PointClusterer> ClusterEngine for Njw<C> {
    fn train(&mut self, matrix: &DMatrix<f64>, kind: MeasureKind) -> Result<Labels, ClusterError> {
        if self.is_trained() {
            return Err(ClusterError::invalid_state(
                "NJW",
                "train called twice without cleanup",
            ));
        }
        let n = validate_square_matrix(matrix, "NJW")?;
        if self.params.k > n {
            return Err(ClusterError::invalid_input(
                "NJW",
                format!("k = {} exceeds {n} points", self.params.k),
            ));
        }

        let affinity = self.affinity(matrix, kind);
        log::debug!("NJW: affinity matrix over {n} points finished");

        // L = D^{-1/2} A D^{-1/2}; an isolated point's row stays zero
        let inv_sqrt_degree: Vec<f64> = (0..n)
            .map(|i| {
                let degree: f64 = affinity.row(i).sum();
                if degree > 0.0 {
                    1.0 / degree.sqrt()
                } else {
                    0.0
                }
            })
            .collect();
        let normalised = DMatrix::from_fn(n, n, |i, j| {
            inv_sqrt_degree[i] * affinity[(i, j)] * inv_sqrt_degree[j]
        });

        let eigen = SymmetricEigen::new(normalised);
        // nalgebra leaves the eigenpairs unsorted
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&p, &q| {
            eigen.eigenvalues[q]
                .partial_cmp(&eigen.eigenvalues[p])
                .unwrap()
        });
        log::debug!("NJW: eigen analysis finished");

        // top-k eigenvectors, rows renormalised to the unit sphere
        let k = self.params.k;
        let mut embedding =
            DMatrix::from_fn(n, k, |i, t| eigen.eigenvectors[(i, order[t])]);
        for mut row in embedding.row_iter_mut() {
            let norm = row.norm();
            if norm > 0.0 {
                row /= norm;
            }
        }

        let samples: Vec<Vec<f64>> = (0..n)
            .map(|i| embedding.row(i).iter().copied().collect())
            .collect();
        let labels = self.inner.train_points(&samples)?;
        log::debug!(
            "NJW: internal clusterer ({}) finished",
            self.inner.method_name()
        );

        self.embedding = Some(embedding);
        self.labels = Some(labels.clone());
        Ok(labels)
    }

    fn num_clusters(&self) -> usize {
        self.params.k
    }

    fn method_name(&self) -> &'static str {
        "NJW"
    }

    fn is_trained(&self) -> bool {
        self.labels.is_some()
    }

    fn cleanup(&mut self) {
        self.embedding = None;
        self.labels = None;
        self.inner.cleanup();
    }
}
