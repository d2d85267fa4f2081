//! Arc-length parameterisation and length-based resampling of waypoint
//! sequences, under the registry's active coordinate system.

use rayon::prelude::*;

use crate::geodesy::{self, CoordSys};
use fairway_types::{Position, XyList, XyXtd, XyXtdList};

/// Cumulative arc length along a waypoint sequence.
pub trait ArcLength {
    /// The running arc length at every waypoint; starts at 0, monotone
    /// non-decreasing, `len()` entries.
    fn cumulative_lengths(&self) -> Vec<f64>;

    /// Arc length of the sub-sequence `[start, end]` (end clamped to the
    /// last index).
    fn arc_length_between(&self, start: usize, end: usize) -> f64;

    /// Total arc length of the sequence.
    fn arc_length(&self) -> f64 {
        self.cumulative_lengths().last().copied().unwrap_or(0.0)
    }
}

/// Resampling a waypoint sequence at arc-length parameters.
pub trait LengthSample: Sized {
    /// Resamples at a monotone non-decreasing sequence of arc-length
    /// parameters. Positions are interpolated geodesically along the source
    /// leg containing each parameter; parameters at or beyond the total
    /// length yield the final waypoint unchanged.
    fn length_sampled(&self, params: &[f64]) -> Self;

    /// Resamples to exactly `n` waypoints evenly spaced in arc length. The
    /// first and last waypoints of the source are preserved exactly.
    ///
    /// # Panics
    ///
    /// Panics if `n < 2`.
    fn uniform_length_sampled(&self, n: usize) -> Self;
}

fn cumulative_of(cs: &CoordSys, positions: &[Position]) -> Vec<f64> {
    if positions.is_empty() {
        return Vec::new();
    }
    let mut lengths = Vec::with_capacity(positions.len());
    lengths.push(0.0);
    for pair in positions.windows(2) {
        lengths.push(lengths.last().unwrap() + cs.distance(pair[0], pair[1]));
    }
    lengths
}

fn span_of(lengths: &[f64], start: usize, end: usize) -> f64 {
    assert!(start < lengths.len(), "start index out of range");
    let end = end.min(lengths.len() - 1);
    assert!(start <= end, "start index beyond end index");
    lengths[end] - lengths[start]
}

fn uniform_params(total: f64, n: usize) -> Vec<f64> {
    assert!(n >= 2, "uniform resampling needs at least two waypoints");
    let step = total / (n - 1) as f64;
    let mut params: Vec<f64> = (0..n - 1).map(|v| v as f64 * step).collect();
    params.push(total);
    params
}

/// One resampled waypoint: either a source waypoint taken verbatim, or a
/// point `offset` metres into the source leg starting at `leg`.
enum SampleSpot {
    Copy(usize),
    Interpolate { leg: usize, offset: f64 },
}

/// Walks the cumulative-length table and plans, for each parameter, where
/// the resampled waypoint comes from. Parameters at or past the total
/// length copy the final waypoint, so endpoints survive exactly.
fn walk_params(lengths: &[f64], params: &[f64]) -> Vec<SampleSpot> {
    let total = *lengths.last().unwrap();
    let mut plan = Vec::with_capacity(params.len());
    let mut i = 0usize;
    for (idx, &u) in params.iter().enumerate() {
        debug_assert!(idx == 0 || params[idx - 1] <= u, "parameters must be monotone");
        if u >= total {
            plan.push(SampleSpot::Copy(lengths.len() - 1));
            continue;
        }
        while i + 1 < lengths.len() && u > lengths[i + 1] {
            i += 1;
        }
        if u <= lengths[i] || i + 1 >= lengths.len() {
            plan.push(SampleSpot::Copy(i));
        } else {
            plan.push(SampleSpot::Interpolate {
                leg: i,
                offset: u - lengths[i],
            });
        }
    }
    plan
}

impl ArcLength for XyList {
    fn cumulative_lengths(&self) -> Vec<f64> {
        cumulative_of(&geodesy::active(), self.as_slice())
    }

    fn arc_length_between(&self, start: usize, end: usize) -> f64 {
        span_of(&self.cumulative_lengths(), start, end)
    }
}

impl ArcLength for XyXtdList {
    fn cumulative_lengths(&self) -> Vec<f64> {
        let positions: Vec<Position> = self.iter().map(|wp| wp.pos).collect();
        cumulative_of(&geodesy::active(), &positions)
    }

    fn arc_length_between(&self, start: usize, end: usize) -> f64 {
        span_of(&self.cumulative_lengths(), start, end)
    }
}

impl LengthSample for XyList {
    fn length_sampled(&self, params: &[f64]) -> Self {
        if params.is_empty() || self.is_empty() {
            return XyList::default();
        }
        let cs = geodesy::active();
        let lengths = cumulative_of(&cs, self.as_slice());
        let out = walk_params(&lengths, params)
            .into_iter()
            .map(|spot| match spot {
                SampleSpot::Copy(i) => self[i],
                SampleSpot::Interpolate { leg, offset } => {
                    let bearing = cs.bearing(self[leg], self[leg + 1]);
                    cs.move_point(self[leg], offset, bearing)
                }
            })
            .collect();
        XyList(out)
    }

    fn uniform_length_sampled(&self, n: usize) -> Self {
        self.length_sampled(&uniform_params(self.arc_length(), n))
    }
}

impl LengthSample for XyXtdList {
    fn length_sampled(&self, params: &[f64]) -> Self {
        if params.is_empty() || self.is_empty() {
            return XyXtdList::default();
        }
        let cs = geodesy::active();
        let positions: Vec<Position> = self.iter().map(|wp| wp.pos).collect();
        let lengths = cumulative_of(&cs, &positions);
        let out = walk_params(&lengths, params)
            .into_iter()
            .map(|spot| match spot {
                SampleSpot::Copy(i) => self[i],
                SampleSpot::Interpolate { leg, offset } => {
                    let bearing = cs.bearing(self[leg].pos, self[leg + 1].pos);
                    let pos = cs.move_point(self[leg].pos, offset, bearing);
                    // the envelope is projected from the nearer leg endpoint
                    let span = lengths[leg + 1] - lengths[leg];
                    let xtd = if offset <= span - offset {
                        self[leg].xtd
                    } else {
                        self[leg + 1].xtd
                    };
                    XyXtd::new(pos, xtd)
                }
            })
            .collect();
        XyXtdList(out)
    }

    fn uniform_length_sampled(&self, n: usize) -> Self {
        self.length_sampled(&uniform_params(self.arc_length(), n))
    }
}

/// Resamples every trajectory to `n` evenly spaced waypoints, in parallel.
pub fn uniform_length_resample<T>(trajectories: &[T], n: usize) -> Vec<T>
where
    T: LengthSample + Sync + Send,
{
    trajectories
        .par_iter()
        .map(|t| t.uniform_length_sampled(n))
        .collect()
}
