use super::{normalize_bearing, EARTH_RADIUS};
use fairway_types::Position;

/// Great-circle measurements on a spherical earth using the [haversine
/// formula].
///
/// Distances are in metres on a sphere of configurable radius (default
/// [`EARTH_RADIUS`]).
///
/// Reference: <https://www.movable-type.co.uk/scripts/latlong.html>
///
/// [haversine formula]: https://en.wikipedia.org/wiki/Haversine_formula
#[derive(Clone, Copy, Debug)]
pub struct Haversine {
    radius: f64,
}

impl Default for Haversine {
    fn default() -> Self {
        Haversine {
            radius: EARTH_RADIUS,
        }
    }
}

impl Haversine {
    /// A spherical earth of the given radius in metres.
    pub fn new(radius: f64) -> Self {
        Haversine { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn distance(&self, a: Position, b: Position) -> f64 {
        let lat_a = a.lat.to_radians();
        let lat_b = b.lat.to_radians();
        let half_dlat = ((b.lat - a.lat) / 2.0).to_radians();
        let half_dlon = ((b.lon - a.lon) / 2.0).to_radians();
        let h = half_dlat.sin().powi(2) + lat_a.cos() * lat_b.cos() * half_dlon.sin().powi(2);
        2.0 * h.sqrt().atan2((1.0 - h).sqrt()) * self.radius
    }

    pub fn bearing(&self, a: Position, b: Position) -> f64 {
        let lat_a = a.lat.to_radians();
        let lat_b = b.lat.to_radians();
        let dlon = (b.lon - a.lon).to_radians();
        let y = dlon.sin() * lat_b.cos();
        let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * dlon.cos();
        normalize_bearing(y.atan2(x).to_degrees())
    }

    pub fn move_point(&self, a: Position, distance: f64, bearing: f64) -> Position {
        let delta = distance / self.radius;
        let lat_a = a.lat.to_radians();
        let brg = bearing.to_radians();
        let lat = (lat_a.sin() * delta.cos() + lat_a.cos() * delta.sin() * brg.cos()).asin();
        let lon = a.lon.to_radians()
            + (brg.sin() * delta.sin() * lat_a.cos()).atan2(delta.cos() - lat_a.sin() * lat.sin());
        Position::new(lon.to_degrees(), lat.to_degrees())
    }

    pub fn cross_track_distance(&self, p: Position, s: Position, e: Position) -> f64 {
        // angular distance s→p and the bearing difference off the track
        let delta_sp = self.distance(s, p) / self.radius;
        let dtheta = normalize_bearing(self.bearing(s, p) - self.bearing(s, e)).to_radians();
        // a point portside of the track has a negative bearing difference
        -(delta_sp.sin() * dtheta.sin()).clamp(-1.0, 1.0).asin() * self.radius
    }

    pub fn on_track_distance(&self, p: Position, s: Position, e: Position) -> f64 {
        let delta_sp = self.distance(s, p) / self.radius;
        let delta_xt = self.cross_track_distance(p, s, e) / self.radius;
        let along = (delta_sp.cos() / delta_xt.cos()).clamp(-1.0, 1.0).acos() * self.radius;
        let dtheta = normalize_bearing(self.bearing(s, p) - self.bearing(s, e)).to_radians();
        if dtheta.cos() >= 0.0 {
            along
        } else {
            -along
        }
    }
}
