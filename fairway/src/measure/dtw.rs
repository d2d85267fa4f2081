use super::TrajectoryMeasure;
use crate::error::MeasureError;
use crate::geodesy;
use fairway_types::XyList;

/// Dynamic Time Warping of the pointwise geodesic distance, normalised by
/// the summed sequence lengths.
///
/// `W[0,0] = 0`; every other cell adds the pointwise distance to the best
/// predecessor; the result is `W[n-1,m-1] / (n + m)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DynamicTimeWarping {
    pub reversed_sequence: bool,
}

impl TrajectoryMeasure<XyList> for DynamicTimeWarping {
    fn measure_core(&self, a: &XyList, b: &XyList) -> Result<f64, MeasureError> {
        let cs = geodesy::active();
        dtw_mean_normalized(a.len(), b.len(), |i, j| Ok(cs.distance(a[i], b[j])))
    }

    fn name(&self) -> &'static str {
        "DynamicTimeWarping"
    }

    fn reversed_sequence(&self) -> bool {
        self.reversed_sequence
    }
}

/// The shared warp recurrence: a flat row-major table, `W[0,0] = 0`,
/// out-of-range predecessors treated as +∞, result normalised by `n + m`.
/// The XTD drivers reuse this with their own pointwise kernels.
pub(crate) fn dtw_mean_normalized<F>(n: usize, m: usize, mut cell: F) -> Result<f64, MeasureError>
where
    F: FnMut(usize, usize) -> Result<f64, MeasureError>,
{
    let mut warp = vec![0.0f64; n * m];
    for i in 0..n {
        for j in 0..m {
            if i == 0 && j == 0 {
                continue;
            }
            let mut best = f64::INFINITY;
            if i >= 1 {
                best = best.min(warp[(i - 1) * m + j]);
            }
            if j >= 1 {
                best = best.min(warp[i * m + j - 1]);
            }
            if i >= 1 && j >= 1 {
                best = best.min(warp[(i - 1) * m + j - 1]);
            }
            let cost = cell(i, j)? + best;
            debug_assert!(cost >= 0.0 && !cost.is_nan());
            warp[i * m + j] = cost;
        }
    }
    Ok(warp[n * m - 1] / (n + m) as f64)
}
