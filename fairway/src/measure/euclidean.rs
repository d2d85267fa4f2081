use super::TrajectoryMeasure;
use crate::error::MeasureError;
use crate::geodesy;
use fairway_types::XyList;

/// Index-aligned mean pointwise distance. The shorter sequence repeats its
/// final waypoint, so the measure is defined for unequal lengths.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean {
    pub reversed_sequence: bool,
}

impl TrajectoryMeasure<XyList> for Euclidean {
    fn measure_core(&self, a: &XyList, b: &XyList) -> Result<f64, MeasureError> {
        let cs = geodesy::active();
        let n = a.len().max(b.len());
        let sum: f64 = (0..n)
            .map(|i| cs.distance(a[i.min(a.len() - 1)], b[i.min(b.len() - 1)]))
            .sum();
        Ok(sum / n as f64)
    }

    fn name(&self) -> &'static str {
        "Euclidean"
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
    use fairway_types::Position;

    #[test]
    fn identity_of_indiscernibles() {
        use_haversine();
        let a = XyList::new(vec![
            Position::new(0.0, 0.0),
            Position::new(0.01, 0.0),
            Position::new(0.02, 0.01),
        ]);
        assert_eq!(Euclidean::default().measure(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn unequal_lengths_clamp_the_tail() {
        use_haversine();
        let cs = geodesy::active();
        let a = XyList::new(vec![Position::new(0.0, 0.0), Position::new(0.01, 0.0)]);
        let b = XyList::new(vec![
            Position::new(0.0, 0.0),
            Position::new(0.01, 0.0),
            Position::new(0.02, 0.0),
        ]);
        let expected = cs.distance(a[1], b[2]) / 3.0;
        assert_relative_eq!(
            Euclidean::default().measure(&a, &b).unwrap(),
            expected,
            epsilon = 1e-9
        );
    }
}
