use std::f64::consts::PI;

use super::{normalize_bearing, EARTH_RADIUS};
use fairway_types::Position;

/// An equirectangular projection around a base latitude.
///
/// Longitude and latitude degrees are scaled to metres with fixed unit
/// lengths; the longitude unit is `cos(base_lat)` times the latitude unit,
/// so the approximation is accurate near the base latitude and degrades
/// away from it. Cheap, and exact enough for the harbour-scale work the
/// trajectory measures do.
///
/// Reference: <https://www.movable-type.co.uk/scripts/latlong.html>
///
/// # Examples
///
/// ```
/// use fairway::geodesy::Cartesian;
/// use fairway_types::Position;
///
/// let cs = Cartesian::new(Position::new(0.0, 37.0));
/// let a = Position::new(0.0, 37.0);
/// let b = Position::new(0.0, 37.01);
/// let d = cs.distance(a, b);
/// assert!((d - 1_111.0).abs() < 1.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Cartesian {
    lon_unit: f64,
    lat_unit: f64,
}

impl Cartesian {
    /// A projection centred on `base`, on a sphere of [`EARTH_RADIUS`].
    pub fn new(base: Position) -> Self {
        Self::with_radius(base, EARTH_RADIUS)
    }

    /// A projection centred on `base`, on a sphere of the given radius in
    /// metres.
    pub fn with_radius(base: Position, radius: f64) -> Self {
        let lat_unit = PI / 180.0 * radius;
        Cartesian {
            lon_unit: base.lat.to_radians().cos() * lat_unit,
            lat_unit,
        }
    }

    /// Metres per degree of longitude at the base latitude.
    pub fn lon_unit(&self) -> f64 {
        self.lon_unit
    }

    /// Metres per degree of latitude.
    pub fn lat_unit(&self) -> f64 {
        self.lat_unit
    }

    fn project(&self, p: Position) -> (f64, f64) {
        (p.lon * self.lon_unit, p.lat * self.lat_unit)
    }

    pub fn distance(&self, a: Position, b: Position) -> f64 {
        let (ax, ay) = self.project(a);
        let (bx, by) = self.project(b);
        (bx - ax).hypot(by - ay)
    }

    pub fn bearing(&self, a: Position, b: Position) -> f64 {
        let (ax, ay) = self.project(a);
        let (bx, by) = self.project(b);
        normalize_bearing((bx - ax).atan2(by - ay).to_degrees())
    }

    pub fn move_point(&self, a: Position, distance: f64, bearing: f64) -> Position {
        let rad = bearing.to_radians();
        Position::new(
            a.lon + distance * rad.sin() / self.lon_unit,
            a.lat + distance * rad.cos() / self.lat_unit,
        )
    }

    pub fn cross_track_distance(&self, p: Position, s: Position, e: Position) -> f64 {
        let (px, py) = self.project(p);
        let (sx, sy) = self.project(s);
        let (ex, ey) = self.project(e);
        let track = (ex - sx).hypot(ey - sy);
        if track == 0.0 {
            return (px - sx).hypot(py - sy);
        }
        // z-component of (e - s) × (p - s): positive when p is portside
        ((ex - sx) * (py - sy) - (ey - sy) * (px - sx)) / track
    }

    pub fn on_track_distance(&self, p: Position, s: Position, e: Position) -> f64 {
        let (px, py) = self.project(p);
        let (sx, sy) = self.project(s);
        let (ex, ey) = self.project(e);
        let track = (ex - sx).hypot(ey - sy);
        if track == 0.0 {
            return 0.0;
        }
        ((ex - sx) * (px - sx) + (ey - sy) * (py - sy)) / track
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn base37() -> Cartesian {
        Cartesian::new(Position::new(0.0, 37.0))
    }

    #[test]
    fn meridian_distance_and_bearing() {
        let cs = base37();
        let a = Position::new(0.0, 37.0);
        let b = Position::new(0.0, 37.01);
        let d = cs.distance(a, b);
        assert_relative_eq!(d, 1_111.0, epsilon = 1.0);
        assert_relative_eq!(cs.bearing(a, b), 0.0, epsilon = 0.01);
    }

    #[test]
    fn move_point_round_trips() {
        let cs = base37();
        let a = Position::new(0.0, 37.0);
        let b = Position::new(0.0, 37.01);
        let d = cs.distance(a, b);
        let moved = cs.move_point(a, d, 0.0);
        assert_abs_diff_eq!(moved, b, epsilon = 1e-6);
        // the move_point contract along an arbitrary bearing
        let p = cs.move_point(a, 523.0, 114.0);
        assert_relative_eq!(cs.distance(a, p), 523.0, epsilon = 1e-9);
    }

    #[test]
    fn cross_track_sign_is_portside_positive() {
        let cs = base37();
        let s = Position::new(0.0, 37.0);
        let e = Position::new(0.1, 37.0); // track heads east
        let north = Position::new(0.05, 37.01); // north of an eastbound track is portside
        let south = Position::new(0.05, 36.99);
        assert!(cs.cross_track_distance(north, s, e) > 0.0);
        assert!(cs.cross_track_distance(south, s, e) < 0.0);
    }

    #[test]
    fn on_track_projection() {
        let cs = base37();
        let s = Position::new(0.0, 37.0);
        let e = Position::new(0.1, 37.0);
        let p = Position::new(0.05, 37.01);
        let expected = cs.distance(s, Position::new(0.05, 37.0));
        assert_relative_eq!(cs.on_track_distance(p, s, e), expected, epsilon = 1e-9);
        let behind = Position::new(-0.01, 37.0);
        assert!(cs.on_track_distance(behind, s, e) < 0.0);
    }
}
