use crate::geodesy::{self, normalize_bearing};
use fairway_types::{Position, XyXtd};

/// Potential-field distance: the geodesic distance between two waypoints,
/// weighted by the bearing-dependent magnitudes of their envelopes.
///
/// The envelope magnitude seen from `a` towards `b` blends the mean
/// half-width (along-track component) with the half-width of the side the
/// bearing leans to; `xtd_sigma_ratio` scales envelope widths to sigmas.
///
/// Coincident positions, a zero ratio, or a vanishing envelope product all
/// yield 0; division by zero is handled internally, never propagated.
pub fn potential_field_distance(
    a: XyXtd,
    a_heading: f64,
    b: XyXtd,
    b_heading: f64,
    xtd_sigma_ratio: f64,
) -> f64 {
    if a.pos == b.pos || xtd_sigma_ratio == 0.0 {
        return 0.0;
    }
    let cs = geodesy::active();

    let field_sigma = |wp: XyXtd, heading: f64, toward: Position| -> f64 {
        let phi = normalize_bearing(cs.bearing(wp.pos, toward) - heading).to_radians();
        let mean_half = 0.5 * (wp.xtd.portside + wp.xtd.starboard);
        let side = if phi < 0.0 {
            wp.xtd.starboard
        } else {
            wp.xtd.portside
        };
        ((mean_half * phi.cos()).powi(2) + (side * phi.sin()).powi(2)).sqrt() * xtd_sigma_ratio
    };

    let sigma_a = field_sigma(a, a_heading, b.pos);
    let sigma_b = field_sigma(b, b_heading, a.pos);
    if sigma_a * sigma_b == 0.0 {
        return 0.0;
    }
    cs.distance(a.pos, b.pos) * (sigma_a + sigma_b) / (2.0 * sigma_a * sigma_b)
}
