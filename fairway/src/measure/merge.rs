use super::TrajectoryMeasure;
use crate::error::MeasureError;
use crate::geodesy::{self, CoordSys};
use fairway_types::{Position, XyList};

/// Merge distance.
///
/// The length of the shortest interleaving ("merge") of the two sequences,
/// normalised against the summed trajectory lengths:
/// `2·merge/(len_a + len_b) − 1`, which is 0 when the trajectories coincide.
///
/// Ismail, A., & Vigneron, A. (2015). *A New Trajectory Similarity Measure
/// for GPS Data.* IWGS'15. <http://dx.doi.org/10.1145/2833165.2833173>
#[derive(Clone, Copy, Debug, Default)]
pub struct Merge {
    pub reversed_sequence: bool,
}

fn cumulative(cs: &CoordSys, pts: &[Position]) -> Vec<f64> {
    let mut out = Vec::with_capacity(pts.len());
    out.push(0.0);
    for pair in pts.windows(2) {
        out.push(out.last().unwrap() + cs.distance(pair[0], pair[1]));
    }
    out
}

impl TrajectoryMeasure<XyList> for Merge {
    fn measure_core(&self, a: &XyList, b: &XyList) -> Result<f64, MeasureError> {
        let cs = geodesy::active();
        let (n, m) = (a.len(), b.len());
        let cum_a = cumulative(&cs, a.as_slice());
        let cum_b = cumulative(&cs, b.as_slice());

        // merge_a: shortest merge ending on a[i]; merge_b: ending on b[j]
        let mut merge_a = vec![0.0f64; n * m];
        let mut merge_b = vec![0.0f64; n * m];
        for i in 0..n {
            for j in 0..m {
                merge_a[i * m + j] = if i == 0 {
                    cum_b[j] + cs.distance(b[j], a[0])
                } else {
                    let stay = merge_a[(i - 1) * m + j] + cs.distance(a[i - 1], a[i]);
                    let cross = merge_b[(i - 1) * m + j] + cs.distance(b[j], a[i]);
                    stay.min(cross)
                };
                merge_b[i * m + j] = if j == 0 {
                    cum_a[i] + cs.distance(a[i], b[0])
                } else {
                    let cross = merge_a[i * m + j - 1] + cs.distance(a[i], b[j]);
                    let stay = merge_b[i * m + j - 1] + cs.distance(b[j - 1], b[j]);
                    cross.min(stay)
                };
            }
        }

        let total = cum_a[n - 1] + cum_b[m - 1];
        if total == 0.0 {
            return Ok(0.0);
        }
        let best = merge_a[n * m - 1].min(merge_b[n * m - 1]);
        Ok((2.0 * best / total - 1.0).max(0.0))
    }

    fn name(&self) -> &'static str {
        "Merge"
    }

    fn reversed_sequence(&self) -> bool {
        self.reversed_sequence
    }
}
