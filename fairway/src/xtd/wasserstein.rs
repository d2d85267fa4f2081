use super::grid::{waypoint_samples, MonteCarloParams};
use super::transport;
use crate::error::MeasureError;
use crate::geodesy;
use fairway_types::XyXtd;

/// 2-Wasserstein (earth-mover) distance between the envelope densities of
/// two waypoints.
///
/// Both densities are sampled on the shared lattice with unit total mass;
/// the ground cost between two samples is the **squared** distance under the
/// active coordinate system, and the transportation problem is solved
/// exactly. A solver that fails to converge surfaces as
/// [`MeasureError::Unavailable`], so the caller may fall back to another
/// measure; a partial result is never returned.
pub fn wasserstein_distance(
    a: XyXtd,
    a_heading: f64,
    b: XyXtd,
    b_heading: f64,
    params: &MonteCarloParams,
) -> Result<f64, MeasureError> {
    params.validate("WassersteinDistance")?;
    let cs = geodesy::active();
    let samples_a = waypoint_samples(&cs, a, a_heading, params);
    let samples_b = waypoint_samples(&cs, b, b_heading, params);

    let n = samples_a.positions.len();
    let m = samples_b.positions.len();
    let mut cost = Vec::with_capacity(n * m);
    for &pa in &samples_a.positions {
        for &pb in &samples_b.positions {
            let d = cs.distance(pa, pb);
            cost.push(d * d);
        }
    }

    transport::minimum_cost(&samples_a.weights, &samples_b.weights, &cost)
        .map(|total| total.max(0.0))
        .map_err(|e| MeasureError::unavailable("WassersteinDistance", e.to_string()))
}
