//! End-to-end run of the analytics pipeline: synthetic voyages are
//! resampled, measured into a distance matrix, clustered, and evaluated.
//! The whole binary shares one Cartesian registry configuration.

use fairway::cluster::evaluation::{pseudo_davies_bouldin, pseudo_medoids, silhouettes};
use fairway::cluster::{ClusterEngine, DbscanParams, DistanceDbscan, KmeansParams, Njw, NjwParams};
use fairway::geodesy::{self, CoordSysKind};
use fairway::matrix::{pairwise_distance_matrix_with_progress, Progress};
use fairway::measure::MeasureKind;
use fairway::trajectory::uniform_length_resample;
use fairway::xtd::DtwXtd;
use fairway_types::{Position, Xtd, XyXtd, XyXtdList};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn configure_geodesy() {
    geodesy::set_base_location(Position::new(0.0, 37.0)).unwrap();
    geodesy::set_default_coord_sys(CoordSysKind::Cartesian).unwrap();
}

/// A voyage along a lane at the given latitude offset, with slight
/// waypoint jitter per voyage.
fn voyage(lat: f64, wobble: f64, waypoints: usize) -> XyXtdList {
    (0..waypoints)
        .map(|i| {
            XyXtd::new(
                Position::new(0.01 * i as f64, lat + wobble * (i % 3) as f64),
                Xtd::new(900.0, 1100.0),
            )
        })
        .collect()
}

#[test]
fn voyages_cluster_by_lane() {
    configure_geodesy();

    // two lanes, four voyages each, with different raw waypoint counts
    let mut voyages = Vec::new();
    for v in 0..4 {
        voyages.push(voyage(37.0 + 0.0004 * v as f64, 0.0001, 6 + v));
    }
    for v in 0..4 {
        voyages.push(voyage(37.3 + 0.0004 * v as f64, 0.0001, 5 + v));
    }

    let resampled = uniform_length_resample(&voyages, 8);
    assert!(resampled.iter().all(|t| t.len() == 8));

    let progress = Progress::new();
    let matrix =
        pairwise_distance_matrix_with_progress(&DtwXtd::default(), &resampled, &progress)
            .unwrap();
    assert_eq!(progress.fraction(), 1.0);

    // symmetry, zero diagonal, non-negativity
    for i in 0..8 {
        assert_eq!(matrix[(i, i)], 0.0);
        for j in 0..8 {
            assert_eq!(matrix[(i, j)], matrix[(j, i)]);
            assert!(matrix[(i, j)] >= 0.0);
        }
    }

    let mut dbscan = DistanceDbscan::new(DbscanParams {
        min_pts: 2,
        epsilon: 2_000.0,
    })
    .unwrap();
    let labels = dbscan.train(&matrix, MeasureKind::Distance).unwrap();
    assert_eq!(dbscan.num_clusters(), 2);
    assert_eq!(labels[..4], [labels[0]; 4]);
    assert_eq!(labels[4..], [labels[4]; 4]);
    assert_ne!(labels[0], labels[4]);
    assert!(labels.iter().all(|&l| l > 0), "no voyage is noise here");

    let medoids = pseudo_medoids(&labels, &matrix).unwrap();
    assert!(labels[medoids[labels[0]]] == labels[0]);
    let dbi = pseudo_davies_bouldin(&labels, &matrix).unwrap();
    assert!(dbi.iter().all(|&v| v >= 0.0));
}

/// Two well-separated Gaussian blobs of 50 points each; NJW with k = 2
/// recovers the ground truth, and the silhouette confirms the separation.
#[test]
fn spectral_clustering_recovers_gaussian_blobs() {
    configure_geodesy();

    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 0.1).unwrap();
    let mut points: Vec<(f64, f64)> = Vec::new();
    for _ in 0..50 {
        points.push((noise.sample(&mut rng), noise.sample(&mut rng)));
    }
    for _ in 0..50 {
        points.push((5.0 + noise.sample(&mut rng), 5.0 + noise.sample(&mut rng)));
    }

    let matrix = DMatrix::from_fn(100, 100, |i, j| {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        (xi - xj).hypot(yi - yj)
    });

    let mut njw = Njw::new(
        NjwParams {
            similarity_sigma: 1.0,
            k: 2,
        },
        KmeansParams::default(),
    )
    .unwrap();
    let labels = njw.train(&matrix, MeasureKind::Distance).unwrap();
    assert_eq!(njw.num_clusters(), 2);

    // accuracy up to label permutation
    let matches = labels[..50].iter().filter(|&&l| l == labels[0]).count()
        + labels[50..].iter().filter(|&&l| l == labels[50]).count();
    assert_ne!(labels[0], labels[50]);
    assert!(matches >= 98, "expected >= 98 matches, got {matches}");

    // the embedding rows are unit norm
    let embedding = njw.embedding().unwrap();
    for row in embedding.row_iter() {
        assert!((row.norm() - 1.0).abs() < 1e-9);
    }

    // separated blobs score a high mean silhouette
    let scores = silhouettes(&labels, &matrix).unwrap();
    assert!(scores.iter().all(|&s| (-1.0..=1.0).contains(&s)));
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    assert!(mean > 0.7, "mean silhouette {mean}");

    // a single merged cluster collapses the score
    let merged = vec![0usize; 100];
    let merged_scores = silhouettes(&merged, &matrix).unwrap();
    let merged_mean = merged_scores.iter().sum::<f64>() / merged_scores.len() as f64;
    assert!(merged_mean <= 0.1, "merged silhouette {merged_mean}");
}
