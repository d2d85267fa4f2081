use super::{MeasureKind, TrajectoryMeasure};
use crate::error::MeasureError;
use crate::geodesy;
use fairway_types::XyList;

/// Longest Common Subsequence similarity.
///
/// Two waypoints match when they are within `epsilon` metres and their index
/// difference is at most `delta`. The match count is normalised by
/// `min(|a|, |b|) + 1`, so the value lies in `[0, 1)` and larger means more
/// alike: this is a **similarity**, not a distance.
///
/// Vlachos, M., Kollios, G., & Gunopulos, D. (2002). *Discovering similar
/// multidimensional trajectories.* ICDE 2002.
/// <https://doi.org/10.1109/ICDE.2002.994784>
#[derive(Clone, Copy, Debug)]
pub struct Lcss {
    /// Match radius in metres.
    pub epsilon: f64,
    /// Maximum index difference of matching waypoints.
    pub delta: f64,
    pub reversed_sequence: bool,
}

impl Default for Lcss {
    fn default() -> Self {
        Lcss {
            epsilon: 100.0,
            delta: 5.0,
            reversed_sequence: false,
        }
    }
}

impl TrajectoryMeasure<XyList> for Lcss {
    fn measure_core(&self, a: &XyList, b: &XyList) -> Result<f64, MeasureError> {
        if self.epsilon <= 0.0 {
            return Err(MeasureError::invalid_input(
                self.name(),
                format!("epsilon must be positive, got {}", self.epsilon),
            ));
        }
        let cs = geodesy::active();
        let (n, m) = (a.len(), b.len());
        let width = m + 1;
        let mut table = vec![0.0f64; (n + 1) * width];
        for ai in 1..=n {
            for bi in 1..=m {
                let index_gap = ai.abs_diff(bi) as f64;
                table[ai * width + bi] = if cs.distance(a[ai - 1], b[bi - 1]) < self.epsilon
                    && index_gap <= self.delta
                {
                    1.0 + table[(ai - 1) * width + bi - 1]
                } else {
                    table[(ai - 1) * width + bi].max(table[ai * width + bi - 1])
                };
            }
        }
        Ok(table[n * width + m] / (n.min(m) + 1) as f64)
    }

    fn kind(&self) -> MeasureKind {
        MeasureKind::Similarity
    }

    fn name(&self) -> &'static str {
        "LCSS"
    }

    fn reversed_sequence(&self) -> bool {
        self.reversed_sequence
    }
}
