use std::f64::consts::PI;
use std::sync::{Arc, RwLock};

use crate::error::MeasureError;
use crate::geodesy::CoordSys;
use fairway_types::{Position, XyXtd};

/// Parameters of the Monte-Carlo sample lattice shared by the probabilistic
/// XTD kernels. Both sizes are in units of sigma.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonteCarloParams {
    /// Lattice spacing, in units of sigma.
    pub step_size: f64,
    /// Half-extent of the sampled domain, in units of sigma. The envelope
    /// half-widths are mapped to `domain_size` sigmas.
    pub domain_size: f64,
    /// Tolerance below which a cross-track coordinate counts as on-axis.
    pub error_epsilon: f64,
}

impl Default for MonteCarloParams {
    fn default() -> Self {
        MonteCarloParams {
            step_size: 1.0,
            domain_size: 3.0,
            error_epsilon: 1e-6,
        }
    }
}

impl MonteCarloParams {
    /// `k = ⌊domain_size / step_size⌋`; the lattice spans `(2k+1)²` samples.
    pub fn grid_half_extent(&self) -> usize {
        (self.domain_size / self.step_size).floor() as usize
    }

    /// Exact number of samples generated per waypoint.
    pub fn samples_per_waypoint(&self) -> usize {
        let side = 2 * self.grid_half_extent() + 1;
        side * side
    }

    pub(crate) fn validate(&self, measure: &'static str) -> Result<(), MeasureError> {
        if self.step_size > 0.0 && self.domain_size > 0.0 {
            Ok(())
        } else {
            Err(MeasureError::invalid_input(
                measure,
                format!(
                    "step_size and domain_size must be positive, got ({}, {})",
                    self.step_size, self.domain_size
                ),
            ))
        }
    }
}

/// The standard bivariate normal PDF at `(z1, z2)`.
pub(crate) fn std_bvn_pdf(z1: f64, z2: f64) -> f64 {
    (-(z1 * z1 + z2 * z2) / 2.0).exp() / (2.0 * PI)
}

/// The unit-variance bivariate normal density evaluated on the integer
/// lattice `[-k, k]²`. Built once per `k` and shared process-wide.
pub(crate) struct StandardGrid {
    pub k: usize,
    pub pdf: Vec<f64>,
    pub total: f64,
}

impl StandardGrid {
    fn build(k: usize) -> Self {
        let side = 2 * k + 1;
        let mut pdf = Vec::with_capacity(side * side);
        let mut total = 0.0;
        let half = k as isize;
        for i in -half..=half {
            for j in -half..=half {
                let value = std_bvn_pdf(i as f64, j as f64);
                pdf.push(value);
                total += value;
            }
        }
        StandardGrid { k, pdf, total }
    }

    pub fn value(&self, i: isize, j: isize) -> f64 {
        let half = self.k as isize;
        let side = 2 * half + 1;
        self.pdf[((i + half) * side + (j + half)) as usize]
    }
}

/// Readers snapshot the current table through the lock; a parameter change
/// publishes a freshly built immutable table.
static STANDARD_GRID: RwLock<Option<Arc<StandardGrid>>> = RwLock::new(None);

pub(crate) fn standard_grid(k: usize) -> Arc<StandardGrid> {
    if let Some(grid) = STANDARD_GRID.read().unwrap().as_ref() {
        if grid.k == k {
            return Arc::clone(grid);
        }
    }
    let mut slot = STANDARD_GRID.write().unwrap();
    if let Some(grid) = slot.as_ref() {
        if grid.k == k {
            return Arc::clone(grid);
        }
    }
    let grid = Arc::new(StandardGrid::build(k));
    *slot = Some(Arc::clone(&grid));
    grid
}

/// Per-waypoint sigmas of the envelope density, in metres.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EnvelopeSigmas {
    pub portside: f64,
    pub starboard: f64,
    pub heading: f64,
}

impl EnvelopeSigmas {
    pub fn of(wp: XyXtd, domain_size: f64) -> Self {
        let portside = wp.xtd.portside / domain_size;
        let starboard = wp.xtd.starboard / domain_size;
        EnvelopeSigmas {
            portside,
            starboard,
            heading: (portside + starboard) / 2.0,
        }
    }

    /// The sigma governing a cross-track coordinate `s` (portside positive):
    /// `σ_P` portside, `σ_S` starboard, `σ_H` when on-axis within `epsilon`.
    pub fn side(&self, s: f64, epsilon: f64) -> f64 {
        if s > epsilon {
            self.portside
        } else if s < -epsilon {
            self.starboard
        } else {
            self.heading
        }
    }
}

/// The sample cloud of one waypoint: positions, unit-mass weights, and the
/// per-sample cross-axis sigma of the lattice cell (for area elements).
pub(crate) struct WaypointSamples {
    pub positions: Vec<Position>,
    pub weights: Vec<f64>,
    pub side_sigmas: Vec<f64>,
    pub sigmas: EnvelopeSigmas,
    /// Normaliser of the underlying lattice (sum of raw PDF values).
    pub normaliser: f64,
}

/// Samples the waypoint's envelope density on the shared lattice.
///
/// The frame is spanned by the heading axis (spacing `σ_H·step`) and the
/// heading+90° axis; the portside half-plane is scaled by `σ_P`, the
/// starboard one by `σ_S`. Weights are normalised to sum to 1.
pub(crate) fn waypoint_samples(
    cs: &CoordSys,
    wp: XyXtd,
    heading: f64,
    params: &MonteCarloParams,
) -> WaypointSamples {
    let sigmas = EnvelopeSigmas::of(wp, params.domain_size);
    let half = params.grid_half_extent() as isize;
    let grid = standard_grid(params.grid_half_extent());
    let starboard_axis = heading + 90.0;

    let count = params.samples_per_waypoint();
    let mut positions = Vec::with_capacity(count);
    let mut weights = Vec::with_capacity(count);
    let mut side_sigmas = Vec::with_capacity(count);
    for i in -half..=half {
        // negative offsets along the starboard axis are the portside cells
        let (cross, side_sigma) = match i.cmp(&0) {
            std::cmp::Ordering::Less => (
                sigmas.portside * params.step_size * i as f64,
                sigmas.portside,
            ),
            std::cmp::Ordering::Equal => (0.0, sigmas.heading),
            std::cmp::Ordering::Greater => (
                sigmas.starboard * params.step_size * i as f64,
                sigmas.starboard,
            ),
        };
        let off_axis = cs.move_point(wp.pos, cross, starboard_axis);
        for j in -half..=half {
            let along = sigmas.heading * params.step_size * j as f64;
            positions.push(cs.move_point(off_axis, along, heading));
            weights.push(grid.value(i, j) / grid.total);
            side_sigmas.push(side_sigma);
        }
    }

    WaypointSamples {
        positions,
        weights,
        side_sigmas,
        sigmas,
        normaliser: grid.total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::Haversine;
    use approx::assert_relative_eq;
    use fairway_types::Xtd;

    #[test]
    fn cache_serves_identical_tables() {
        let a = standard_grid(3);
        let b = standard_grid(3);
        assert!(Arc::ptr_eq(&a, &b));
        // weights are bit-for-bit identical for independent callers
        assert_eq!(a.pdf, b.pdf);
    }

    #[test]
    fn cache_rebuilds_on_parameter_change() {
        let a = standard_grid(3);
        let b = standard_grid(2);
        assert_eq!(a.pdf.len(), 49);
        assert_eq!(b.pdf.len(), 25);
        let c = standard_grid(3);
        assert_eq!(c.pdf, a.pdf);
    }

    #[test]
    fn sample_count_matches_contract() {
        let params = MonteCarloParams::default();
        assert_eq!(params.grid_half_extent(), 3);
        assert_eq!(params.samples_per_waypoint(), 49);
        let cs = CoordSys::Haversine(Haversine::default());
        let wp = XyXtd::new(Position::new(0.0, 0.0), Xtd::new(1000.0, 2000.0));
        let samples = waypoint_samples(&cs, wp, 0.0, &params);
        assert_eq!(samples.positions.len(), 49);
        assert_eq!(samples.weights.len(), 49);
    }

    #[test]
    fn weights_sum_to_one() {
        let cs = CoordSys::Haversine(Haversine::default());
        let wp = XyXtd::new(Position::new(5.0, 50.0), Xtd::new(800.0, 1200.0));
        let samples = waypoint_samples(&cs, wp, 37.0, &MonteCarloParams::default());
        let total: f64 = samples.weights.iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn asymmetric_envelope_skews_the_cloud() {
        let cs = CoordSys::Haversine(Haversine::default());
        let wp = XyXtd::new(Position::new(0.0, 0.0), Xtd::new(300.0, 3000.0));
        // heading north: portside is west, starboard is east
        let samples = waypoint_samples(&cs, wp, 0.0, &MonteCarloParams::default());
        let west = samples.positions.iter().map(|p| p.lon).fold(f64::INFINITY, f64::min);
        let east = samples
            .positions
            .iter()
            .map(|p| p.lon)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(east > west.abs() * 5.0, "starboard reach {east} vs portside {west}");
    }
}
