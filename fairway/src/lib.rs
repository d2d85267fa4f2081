//! The `fairway` crate provides maritime trajectory analytics: geodesic
//! primitives, trajectory dissimilarity measures with cross-track-error
//! uncertainty envelopes, a parallel distance-matrix builder, and
//! distance-matrix clustering with an evaluation suite.
//!
//! # Types
//!
//! The waypoint value types ([`Position`], [`Xtd`], [`XyXtd`], [`XyList`],
//! [`XyXtdList`]) are reexported from the [`fairway-types`] crate.
//!
//! # Geodesy
//!
//! - **[`geodesy::Cartesian`]** / **[`geodesy::Haversine`]**: distance,
//!   bearing, point projection, signed cross-track and on-track distances
//!   under an equirectangular or great-circle model
//! - **[`geodesy::set_default_coord_sys`]** /
//!   **[`geodesy::set_base_location`]**: the write-once process registry
//!   behind [`geodesy::active`]
//!
//! # Trajectories
//!
//! - **[`trajectory::ArcLength`]**: cumulative geodesic arc length
//! - **[`trajectory::LengthSample`]**: arc-length resampling;
//!   [`trajectory::uniform_length_resample`] runs a whole fleet in parallel
//!
//! # Distance measures
//!
//! All measures implement [`measure::TrajectoryMeasure`] and plug into
//! [`matrix::pairwise_distance_matrix`]:
//!
//! - **[`measure::Hausdorff`]**, **[`measure::Euclidean`]**,
//!   **[`measure::Merge`]**, **[`measure::Lcss`]**,
//!   **[`measure::DynamicTimeWarping`]**,
//!   **[`measure::ModifiedHausdorff`]**, **[`measure::ProjectedPca`]** over
//!   bare position sequences
//! - **[`xtd::DtwXtd`]**, **[`xtd::DtwXtdJs`]**,
//!   **[`xtd::DtwXtdWasserstein`]**, **[`xtd::DtwXtdBlended`]** over
//!   envelope waypoints, built on the pointwise kernels
//!   [`xtd::js_divergence_distance`], [`xtd::wasserstein_distance`] and
//!   [`xtd::potential_field_distance`]
//!
//! # Clustering
//!
//! - **[`cluster::DistanceDbscan`]**: density clustering with a noise class
//! - **[`cluster::Njw`]**: spectral clustering with an internal
//!   [`cluster::Kmeans`]
//! - **[`cluster::evaluation`]**: sorted distance graphs, pseudo-medoids,
//!   pseudo-Davies–Bouldin, silhouettes
//!
//! # Example
//!
//! ```
//! use fairway::cluster::{ClusterEngine, DbscanParams, DistanceDbscan};
//! use fairway::geodesy::{self, CoordSysKind};
//! use fairway::matrix::pairwise_distance_matrix;
//! use fairway::measure::{DynamicTimeWarping, MeasureKind};
//! use fairway_types::{Position, XyList};
//!
//! geodesy::set_default_coord_sys(CoordSysKind::Haversine).unwrap();
//!
//! // two shipping lanes, three voyages each
//! let voyages: Vec<XyList> = [0.0, 0.001, 0.002, 0.5, 0.501, 0.502]
//!     .iter()
//!     .map(|&lat| (0..5).map(|i| Position::new(0.02 * i as f64, lat)).collect())
//!     .collect();
//!
//! let matrix = pairwise_distance_matrix(&DynamicTimeWarping::default(), &voyages)?;
//! let mut dbscan = DistanceDbscan::new(DbscanParams {
//!     min_pts: 2,
//!     epsilon: 500.0,
//! })?;
//! let labels = dbscan.train(&matrix, MeasureKind::Distance)?;
//! assert_eq!(labels, vec![1, 1, 1, 2, 2, 2]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`fairway-types`]: fairway_types

pub mod cluster;
pub mod error;
pub mod geodesy;
pub mod matrix;
pub mod measure;
pub mod trajectory;
pub mod xtd;

pub use error::{ClusterError, GeodesyError, MeasureError};
pub use fairway_types::{Position, Xtd, XyList, XyXtd, XyXtdList};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::geodesy::{self, CoordSysKind};

    /// Unit tests share one registry configuration per test binary; the
    /// great-circle model needs no base location.
    pub fn use_haversine() {
        geodesy::set_default_coord_sys(CoordSysKind::Haversine)
            .expect("test binary must configure a single coordinate system");
    }
}
