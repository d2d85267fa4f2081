use super::grid::MonteCarloParams;
use super::{js_divergence_distance, potential_field_distance, wasserstein_distance};
use crate::error::MeasureError;
use crate::geodesy::{self, CoordSys};
use crate::measure::{dtw_mean_normalized, TrajectoryMeasure};
use fairway_types::XyXtdList;

/// Heading at each waypoint: the bearing towards the next waypoint, and at
/// the final waypoint the bearing of the last leg.
fn waypoint_headings(cs: &CoordSys, list: &XyXtdList) -> Vec<f64> {
    let n = list.len();
    (0..n)
        .map(|i| {
            if i + 1 < n {
                cs.bearing(list[i].pos, list[i + 1].pos)
            } else {
                cs.bearing(list[n - 2].pos, list[n - 1].pos)
            }
        })
        .collect()
}

/// DTW over the plain geodesic distance between envelope waypoints. The
/// envelopes are ignored; this is the baseline the probabilistic drivers
/// are compared against.
#[derive(Clone, Copy, Debug, Default)]
pub struct DtwXtd {
    pub reversed_sequence: bool,
}

impl TrajectoryMeasure<XyXtdList> for DtwXtd {
    fn measure_core(&self, a: &XyXtdList, b: &XyXtdList) -> Result<f64, MeasureError> {
        let cs = geodesy::active();
        dtw_mean_normalized(a.len(), b.len(), |i, j| Ok(cs.distance(a[i].pos, b[j].pos)))
    }

    fn name(&self) -> &'static str {
        "DtwXtd"
    }

    fn reversed_sequence(&self) -> bool {
        self.reversed_sequence
    }
}

/// DTW over the pointwise Jensen–Shannon divergence of the envelope
/// densities.
#[derive(Clone, Copy, Debug, Default)]
pub struct DtwXtdJs {
    pub monte_carlo: MonteCarloParams,
    pub reversed_sequence: bool,
}

impl TrajectoryMeasure<XyXtdList> for DtwXtdJs {
    fn measure_core(&self, a: &XyXtdList, b: &XyXtdList) -> Result<f64, MeasureError> {
        self.monte_carlo.validate(self.name())?;
        let cs = geodesy::active();
        let headings_a = waypoint_headings(&cs, a);
        let headings_b = waypoint_headings(&cs, b);
        dtw_mean_normalized(a.len(), b.len(), |i, j| {
            Ok(js_divergence_distance(
                a[i],
                headings_a[i],
                b[j],
                headings_b[j],
                &self.monte_carlo,
            ))
        })
    }

    fn name(&self) -> &'static str {
        "DtwXtdJsDivergence"
    }

    fn reversed_sequence(&self) -> bool {
        self.reversed_sequence
    }
}

/// DTW over the pointwise 2-Wasserstein distance of the envelope densities.
/// Solver failures abort the whole evaluation with
/// [`MeasureError::Unavailable`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DtwXtdWasserstein {
    pub monte_carlo: MonteCarloParams,
    pub reversed_sequence: bool,
}

impl TrajectoryMeasure<XyXtdList> for DtwXtdWasserstein {
    fn measure_core(&self, a: &XyXtdList, b: &XyXtdList) -> Result<f64, MeasureError> {
        self.monte_carlo.validate(self.name())?;
        let cs = geodesy::active();
        let headings_a = waypoint_headings(&cs, a);
        let headings_b = waypoint_headings(&cs, b);
        dtw_mean_normalized(a.len(), b.len(), |i, j| {
            wasserstein_distance(a[i], headings_a[i], b[j], headings_b[j], &self.monte_carlo)
        })
    }

    fn name(&self) -> &'static str {
        "DtwXtdWasserstein"
    }

    fn reversed_sequence(&self) -> bool {
        self.reversed_sequence
    }
}

/// DTW over a non-negative linear blend of the pointwise kernels. A zero
/// coefficient skips its kernel entirely, so the expensive terms only run
/// when they participate.
#[derive(Clone, Copy, Debug)]
pub struct DtwXtdBlended {
    pub monte_carlo: MonteCarloParams,
    /// Sigma-per-envelope-width ratio of the potential-field term.
    pub pf_sigma_ratio: f64,
    pub coeff_euclidean: f64,
    pub coeff_js: f64,
    pub coeff_wasserstein: f64,
    pub coeff_pf: f64,
    pub reversed_sequence: bool,
}

impl Default for DtwXtdBlended {
    fn default() -> Self {
        DtwXtdBlended {
            monte_carlo: MonteCarloParams::default(),
            pf_sigma_ratio: 3.0,
            coeff_euclidean: 1.0,
            coeff_js: 1.0,
            coeff_wasserstein: 0.0,
            coeff_pf: 1.0,
            reversed_sequence: false,
        }
    }
}

impl TrajectoryMeasure<XyXtdList> for DtwXtdBlended {
    fn measure_core(&self, a: &XyXtdList, b: &XyXtdList) -> Result<f64, MeasureError> {
        self.monte_carlo.validate(self.name())?;
        let coeffs = [
            self.coeff_euclidean,
            self.coeff_js,
            self.coeff_wasserstein,
            self.coeff_pf,
        ];
        if coeffs.iter().any(|&c| c < 0.0 || !c.is_finite()) {
            return Err(MeasureError::invalid_input(
                self.name(),
                "blend coefficients must be finite and non-negative",
            ));
        }
        let cs = geodesy::active();
        let headings_a = waypoint_headings(&cs, a);
        let headings_b = waypoint_headings(&cs, b);
        dtw_mean_normalized(a.len(), b.len(), |i, j| {
            let mut d = 0.0;
            if self.coeff_euclidean > 0.0 {
                d += self.coeff_euclidean * cs.distance(a[i].pos, b[j].pos);
            }
            if self.coeff_js > 0.0 {
                d += self.coeff_js
                    * js_divergence_distance(
                        a[i],
                        headings_a[i],
                        b[j],
                        headings_b[j],
                        &self.monte_carlo,
                    );
            }
            if self.coeff_pf > 0.0 {
                d += self.coeff_pf
                    * potential_field_distance(
                        a[i],
                        headings_a[i],
                        b[j],
                        headings_b[j],
                        self.pf_sigma_ratio,
                    );
            }
            if self.coeff_wasserstein > 0.0 {
                d += self.coeff_wasserstein
                    * wasserstein_distance(
                        a[i],
                        headings_a[i],
                        b[j],
                        headings_b[j],
                        &self.monte_carlo,
                    )?;
            }
            Ok(d)
        })
    }

    fn name(&self) -> &'static str {
        "DtwXtdBlended"
    }

    fn reversed_sequence(&self) -> bool {
        self.reversed_sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::use_haversine;
    use approx::assert_relative_eq;
    use fairway_types::{Position, Xtd, XyXtd};

    fn leg(offset_lat: f64) -> XyXtdList {
        (0..4)
            .map(|i| {
                XyXtd::new(
                    Position::new(0.01 * i as f64, offset_lat),
                    Xtd::new(800.0, 1200.0),
                )
            })
            .collect()
    }

    #[test]
    fn identical_trajectories_are_at_zero() {
        use_haversine();
        let a = leg(0.0);
        assert_eq!(DtwXtd::default().measure(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn js_driver_vanishes_on_identical_input() {
        use_haversine();
        let a = leg(0.0);
        let d = DtwXtdJs::default().measure(&a, &a).unwrap();
        assert!(d < 1e-6, "got {d}");
    }

    #[test]
    fn js_driver_separates_parallel_tracks() {
        use_haversine();
        let js = DtwXtdJs::default();
        let a = leg(0.0);
        let near = js.measure(&a, &leg(0.01)).unwrap();
        let far = js.measure(&a, &leg(0.05)).unwrap();
        assert!(near > 0.0);
        assert!(far > near);
    }

    #[test]
    fn euclidean_only_blend_matches_the_baseline() {
        use_haversine();
        let blend = DtwXtdBlended {
            coeff_euclidean: 1.0,
            coeff_js: 0.0,
            coeff_wasserstein: 0.0,
            coeff_pf: 0.0,
            ..DtwXtdBlended::default()
        };
        let a = leg(0.0);
        let b = leg(0.02);
        assert_relative_eq!(
            blend.measure(&a, &b).unwrap(),
            DtwXtd::default().measure(&a, &b).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn negative_coefficients_are_rejected() {
        use_haversine();
        let blend = DtwXtdBlended {
            coeff_pf: -1.0,
            ..DtwXtdBlended::default()
        };
        let a = leg(0.0);
        assert!(matches!(
            blend.measure(&a, &a),
            Err(MeasureError::InvalidInput { .. })
        ));
    }

    #[test]
    fn reversed_option_swaps_envelopes_consistently() {
        use_haversine();
        // an asymmetric-envelope track measured against its own reverse:
        // with the reversed option the minimum over orientations is taken,
        // and the envelope swap makes the reversed copy line up exactly
        let a: XyXtdList = (0..4)
            .map(|i| {
                XyXtd::new(
                    Position::new(0.01 * i as f64, 0.0),
                    Xtd::new(300.0, 2000.0),
                )
            })
            .collect();
        let js = DtwXtdJs {
            reversed_sequence: true,
            ..DtwXtdJs::default()
        };
        let d = js.measure(&a.reversed(), &a).unwrap();
        assert!(d < 1e-6, "reversed copy should align, got {d}");
    }
}
