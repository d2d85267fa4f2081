use super::grid::{std_bvn_pdf, waypoint_samples, MonteCarloParams, WaypointSamples};
use crate::geodesy::{self, CoordSys};
use fairway_types::XyXtd;

/// Jensen–Shannon divergence between the envelope densities of two
/// waypoints, estimated on the shared Monte-Carlo lattice.
///
/// Each waypoint's density is sampled in its own frame; the cross terms
/// re-project every sample into the other waypoint's frame, pick the
/// portside/starboard sigma by the sign of the cross-track coordinate
/// (`|s| < error_epsilon` counts as on-axis) and weight by the ratio of the
/// two lattices' area elements. Negative accumulations from rounding are
/// clamped, so the result is always `≥ 0`. Symmetric in its arguments by
/// construction.
///
/// Waypoints with a fully degenerate (zero-width) envelope yield 0.
///
/// # Panics
///
/// Panics if `params.step_size` or `params.domain_size` is not positive.
pub fn js_divergence_distance(
    a: XyXtd,
    a_heading: f64,
    b: XyXtd,
    b_heading: f64,
    params: &MonteCarloParams,
) -> f64 {
    assert!(
        params.step_size > 0.0 && params.domain_size > 0.0,
        "Monte Carlo parameters must be positive"
    );
    let cs = geodesy::active();
    let samples_a = waypoint_samples(&cs, a, a_heading, params);
    let samples_b = waypoint_samples(&cs, b, b_heading, params);
    if samples_a.sigmas.heading == 0.0 || samples_b.sigmas.heading == 0.0 {
        return 0.0;
    }

    let kl_am = kl_against_mid(&cs, &samples_a, &samples_b, b, b_heading, params);
    let kl_bm = kl_against_mid(&cs, &samples_b, &samples_a, a, a_heading, params);
    (0.5 * (kl_am.max(0.0) + kl_bm.max(0.0))).max(0.0)
}

/// `KL(p ‖ m)` with `m = (p + q)/2`, accumulated over `own`'s samples; `q`
/// is `other`'s density re-projected onto those samples.
fn kl_against_mid(
    cs: &CoordSys,
    own: &WaypointSamples,
    other: &WaypointSamples,
    other_wp: XyXtd,
    other_heading: f64,
    params: &MonteCarloParams,
) -> f64 {
    let ahead = cs.move_point(other_wp.pos, 1000.0, other_heading);
    let mut kl = 0.0;
    for (idx, (&pos, &p_own)) in own.positions.iter().zip(&own.weights).enumerate() {
        let along = cs.on_track_distance(pos, other_wp.pos, ahead);
        let cross = cs.cross_track_distance(pos, other_wp.pos, ahead);
        let side_sigma = other.sigmas.side(cross, params.error_epsilon);

        let p_other = if side_sigma == 0.0 {
            0.0
        } else {
            let z_along = along / other.sigmas.heading;
            let z_cross = if cross.abs() < params.error_epsilon {
                0.0
            } else {
                cross / side_sigma
            };
            let density = std_bvn_pdf(z_along, z_cross) / other.normaliser;
            let area_ratio = (own.sigmas.heading * own.side_sigmas[idx])
                / (other.sigmas.heading * side_sigma);
            density * area_ratio
        };

        let mid = 0.5 * (p_own + p_other);
        kl += p_own * (p_own.ln() - mid.ln());
    }
    kl
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::use_haversine;
    use approx::assert_relative_eq;
    use fairway_types::{Position, Xtd};

    #[test]
    fn symmetric_in_its_arguments() {
        use_haversine();
        let a = XyXtd::new(Position::new(0.0, 0.0), Xtd::new(1000.0, 2000.0));
        let b = XyXtd::new(Position::new(0.0, 0.001), Xtd::new(1500.0, 1500.0));
        let params = MonteCarloParams::default();
        let ab = js_divergence_distance(a, 0.0, b, 0.0, &params);
        let ba = js_divergence_distance(b, 0.0, a, 0.0, &params);
        assert_relative_eq!(ab, ba, epsilon = 1e-6);
        assert!(ab >= 0.0 && ab.is_finite());
    }

    #[test]
    fn coincident_waypoints_diverge_negligibly() {
        use_haversine();
        let a = XyXtd::new(Position::new(3.0, 45.0), Xtd::new(1200.0, 1200.0));
        let d = js_divergence_distance(a, 30.0, a, 30.0, &MonteCarloParams::default());
        assert!(d >= 0.0 && d < 1e-6, "self-divergence should vanish, got {d}");
    }

    #[test]
    fn grows_with_separation() {
        use_haversine();
        let params = MonteCarloParams::default();
        let xtd = Xtd::new(1000.0, 1000.0);
        let a = XyXtd::new(Position::new(0.0, 0.0), xtd);
        let near = XyXtd::new(Position::new(0.0, 0.005), xtd);
        let far = XyXtd::new(Position::new(0.0, 0.05), xtd);
        let d_near = js_divergence_distance(a, 0.0, near, 0.0, &params);
        let d_far = js_divergence_distance(a, 0.0, far, 0.0, &params);
        assert!(d_far > d_near, "{d_far} vs {d_near}");
        assert!(d_near > 0.0);
    }

    #[test]
    fn degenerate_envelope_yields_zero() {
        use_haversine();
        let a = XyXtd::new(Position::new(0.0, 0.0), Xtd::new(0.0, 0.0));
        let b = XyXtd::new(Position::new(0.0, 0.001), Xtd::new(1000.0, 1000.0));
        assert_eq!(
            js_divergence_distance(a, 0.0, b, 0.0, &MonteCarloParams::default()),
            0.0
        );
    }
}
