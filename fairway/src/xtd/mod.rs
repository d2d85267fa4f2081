//! Pointwise distances between waypoints carrying cross-track error
//! envelopes, and the DTW drivers composing them into full-trajectory
//! measures.
//!
//! Each waypoint's envelope induces a bivariate normal density in a local
//! frame spanned by the heading axis and the portside/starboard axis. The
//! probabilistic kernels ([`js_divergence_distance`],
//! [`wasserstein_distance`]) integrate over that density with a shared
//! Monte-Carlo sample lattice; [`potential_field_distance`] is a closed
//! form. The [`DtwXtd`]-family measures plug the kernels into the common
//! warp recurrence.

mod dtw;
mod grid;
mod js_divergence;
mod potential_field;
mod transport;
mod wasserstein;

pub use dtw::{DtwXtd, DtwXtdBlended, DtwXtdJs, DtwXtdWasserstein};
pub use grid::MonteCarloParams;
pub use js_divergence::js_divergence_distance;
pub use potential_field::potential_field_distance;
pub use wasserstein::wasserstein_distance;
