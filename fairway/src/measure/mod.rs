//! Trajectory dissimilarity measures.
//!
//! Every measure is a small config struct implementing
//! [`TrajectoryMeasure`]: `measure` evaluates the dissimilarity between two
//! waypoint sequences, `kind` says whether the value is a distance or a
//! similarity, and `name` identifies the method. The provided `measure`
//! wrapper applies the reversed-sequence option and the shared input
//! contract, so implementations only supply `measure_core`.

mod dtw;
mod euclidean;
mod hausdorff;
mod lcss;
mod merge;
mod modified_hausdorff;
mod projected_pca;

pub use dtw::DynamicTimeWarping;
pub use euclidean::Euclidean;
pub use hausdorff::Hausdorff;
pub use lcss::Lcss;
pub use merge::Merge;
pub use modified_hausdorff::ModifiedHausdorff;
pub use projected_pca::ProjectedPca;

pub(crate) use dtw::dtw_mean_normalized;

use crate::error::MeasureError;
use fairway_types::{XyList, XyXtdList};

/// Whether a measure reports a distance (small = alike) or a similarity
/// (large = alike). Consumers such as the clustering engines use this to
/// decide whether a conversion is needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasureKind {
    Distance,
    Similarity,
}

/// The minimal view of a waypoint sequence the measure driver needs.
pub trait Trajectory {
    fn waypoint_count(&self) -> usize;
    fn reversed(&self) -> Self;
}

impl Trajectory for XyList {
    fn waypoint_count(&self) -> usize {
        self.len()
    }

    fn reversed(&self) -> Self {
        XyList::reversed(self)
    }
}

impl Trajectory for XyXtdList {
    fn waypoint_count(&self) -> usize {
        self.len()
    }

    fn reversed(&self) -> Self {
        XyXtdList::reversed(self)
    }
}

/// A trajectory dissimilarity measure over sequences of type `T`.
///
/// # Examples
///
/// ```
/// use fairway::geodesy::{self, CoordSysKind};
/// use fairway::measure::{DynamicTimeWarping, TrajectoryMeasure};
/// use fairway_types::{Position, XyList};
///
/// geodesy::set_default_coord_sys(CoordSysKind::Haversine).unwrap();
///
/// let a = XyList::new(vec![
///     Position::new(0.0, 0.0),
///     Position::new(0.01, 0.0),
///     Position::new(0.02, 0.0),
/// ]);
/// let dtw = DynamicTimeWarping::default();
/// assert_eq!(dtw.measure(&a, &a).unwrap(), 0.0);
/// ```
pub trait TrajectoryMeasure<T: Trajectory> {
    /// Evaluates the measure on the sequences as given.
    fn measure_core(&self, a: &T, b: &T) -> Result<f64, MeasureError>;

    fn kind(&self) -> MeasureKind {
        MeasureKind::Distance
    }

    fn name(&self) -> &'static str;

    /// Whether [`TrajectoryMeasure::measure`] also evaluates against the
    /// reversed first sequence and keeps the minimum, making the measure
    /// invariant to the direction of travel.
    fn reversed_sequence(&self) -> bool {
        false
    }

    /// Evaluates the measure, applying the input contract (both sequences
    /// need at least two waypoints) and the reversed-sequence option.
    fn measure(&self, a: &T, b: &T) -> Result<f64, MeasureError> {
        if a.waypoint_count() < 2 || b.waypoint_count() < 2 {
            return Err(MeasureError::invalid_input(
                self.name(),
                "trajectories need at least two waypoints",
            ));
        }
        let value = if self.reversed_sequence() {
            let forward = self.measure_core(a, b)?;
            let reversed = self.measure_core(&a.reversed(), b)?;
            forward.min(reversed)
        } else {
            self.measure_core(a, b)?
        };
        debug_assert!(
            value.is_finite() && value >= 0.0,
            "{} produced an invalid value {value}",
            self.name()
        );
        Ok(value)
    }
}
