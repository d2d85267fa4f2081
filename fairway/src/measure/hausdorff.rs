use rayon::prelude::*;

use super::TrajectoryMeasure;
use crate::error::MeasureError;
use crate::geodesy;
use fairway_types::XyList;

/// Directed Hausdorff distance: the largest distance from a waypoint of `a`
/// to its nearest waypoint of `b`.
///
/// The measure is invariant to the direction of travel already, so the
/// reversed-sequence option stays off.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hausdorff;

impl TrajectoryMeasure<XyList> for Hausdorff {
    fn measure_core(&self, a: &XyList, b: &XyList) -> Result<f64, MeasureError> {
        let cs = geodesy::active();
        let d = (0..a.len())
            .into_par_iter()
            .map(|i| {
                b.iter()
                    .map(|&q| cs.distance(a[i], q))
                    .fold(f64::INFINITY, f64::min)
            })
            .reduce(|| 0.0, f64::max);
        Ok(d)
    }

    fn name(&self) -> &'static str {
        "Hausdorff"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::use_haversine;
    use approx::assert_relative_eq;
    use fairway_types::Position;

    #[test]
    fn identity_of_indiscernibles() {
        use_haversine();
        let a = XyList::new(vec![
            Position::new(0.0, 0.0),
            Position::new(0.01, 0.005),
            Position::new(0.02, 0.0),
        ]);
        assert_eq!(Hausdorff.measure(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn farthest_waypoint_dominates() {
        use_haversine();
        let cs = geodesy::active();
        let a = XyList::new(vec![
            Position::new(0.0, 0.0),
            Position::new(0.01, 0.0),
            Position::new(0.02, 0.05),
        ]);
        let b = XyList::new(vec![Position::new(0.0, 0.0), Position::new(0.01, 0.0)]);
        let expected = cs.distance(a[2], b[1]);
        assert_relative_eq!(Hausdorff.measure(&a, &b).unwrap(), expected, epsilon = 1e-9);
    }
}
