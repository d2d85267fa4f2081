//! Coordinate systems for geodesic measurements: an equirectangular
//! [`Cartesian`] approximation and great-circle [`Haversine`], behind the
//! [`CoordSys`] enum, plus the process-wide registry selecting the default.
//!
//! Every operation takes positions in lon/lat degrees and returns metres
//! (distances) or degrees (bearings). Bearings are in `[-180, 180)`, with 0°
//! north and 90° east. Cross-track distances are signed: **positive when the
//! point lies to the portside (left) of the start→end track**, negative to
//! starboard.

mod cartesian;
mod haversine;

pub use cartesian::Cartesian;
pub use haversine::Haversine;

use once_cell::sync::OnceCell;

use crate::error::GeodesyError;
use fairway_types::Position;

/// Mean earth radius in metres, spherical model.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Selects one of the concrete coordinate systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordSysKind {
    /// Equirectangular approximation around a fixed base latitude.
    Cartesian,
    /// Great-circle distances on a spherical earth.
    Haversine,
}

/// Speed and direction of travel between two fixes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocity {
    /// Metres per second.
    pub speed: f64,
    /// Degrees in `[-180, 180)`.
    pub bearing: f64,
}

/// A concrete coordinate system. The two variants are plain `Copy`
/// structs, so a `CoordSys` can be freely captured by parallel workers.
#[derive(Clone, Copy, Debug)]
pub enum CoordSys {
    Cartesian(Cartesian),
    Haversine(Haversine),
}

impl CoordSys {
    /// Geodesic distance in metres. Non-negative, symmetric, zero iff the
    /// positions coincide.
    pub fn distance(&self, a: Position, b: Position) -> f64 {
        match self {
            CoordSys::Cartesian(cs) => cs.distance(a, b),
            CoordSys::Haversine(cs) => cs.distance(a, b),
        }
    }

    /// Bearing from `a` to `b`, degrees in `[-180, 180)`.
    pub fn bearing(&self, a: Position, b: Position) -> f64 {
        match self {
            CoordSys::Cartesian(cs) => cs.bearing(a, b),
            CoordSys::Haversine(cs) => cs.bearing(a, b),
        }
    }

    /// The angle ∠APB seen from `p`, degrees in `[-180, 180)`.
    pub fn angle_at(&self, a: Position, b: Position, p: Position) -> f64 {
        normalize_bearing(self.bearing(p, b) - self.bearing(p, a))
    }

    /// The position reached by travelling `distance` metres from `a` along
    /// `bearing`. Satisfies `distance(a, move_point(a, d, α)) == d` within
    /// numerical tolerance.
    pub fn move_point(&self, a: Position, distance: f64, bearing: f64) -> Position {
        match self {
            CoordSys::Cartesian(cs) => cs.move_point(a, distance, bearing),
            CoordSys::Haversine(cs) => cs.move_point(a, distance, bearing),
        }
    }

    /// Signed cross-track distance of `p` from the track `s`→`e`, metres.
    /// Positive on the portside (left) of the track.
    pub fn cross_track_distance(&self, p: Position, s: Position, e: Position) -> f64 {
        match self {
            CoordSys::Cartesian(cs) => cs.cross_track_distance(p, s, e),
            CoordSys::Haversine(cs) => cs.cross_track_distance(p, s, e),
        }
    }

    /// Signed along-track distance of `p` projected onto the track `s`→`e`,
    /// metres. Negative behind `s`.
    pub fn on_track_distance(&self, p: Position, s: Position, e: Position) -> f64 {
        match self {
            CoordSys::Cartesian(cs) => cs.on_track_distance(p, s, e),
            CoordSys::Haversine(cs) => cs.on_track_distance(p, s, e),
        }
    }

    /// Mean speed between two fixes `elapsed_seconds` apart, m/s.
    pub fn speed(&self, a: Position, b: Position, elapsed_seconds: f64) -> f64 {
        self.distance(a, b) / elapsed_seconds
    }

    /// Mean velocity between two fixes `elapsed_seconds` apart.
    pub fn velocity(&self, a: Position, b: Position, elapsed_seconds: f64) -> Velocity {
        Velocity {
            speed: self.speed(a, b, elapsed_seconds),
            bearing: self.bearing(a, b),
        }
    }
}

/// Normalises an angle in degrees into `[-180, 180)`.
pub(crate) fn normalize_bearing(degrees: f64) -> f64 {
    let d = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if d >= 180.0 {
        d - 360.0
    } else {
        d
    }
}

static DEFAULT_KIND: OnceCell<CoordSysKind> = OnceCell::new();
static CARTESIAN_BASE: OnceCell<Position> = OnceCell::new();

/// Fixes the base location of the process-wide [`Cartesian`] coordinate
/// system (its metres-per-degree-of-longitude depend on the base latitude).
///
/// Must be called before [`Cartesian`] is used through the registry.
/// Calling again with the same base is a no-op; a conflicting base is
/// rejected, since the registry is configured once, before any parallel
/// work.
pub fn set_base_location(base: Position) -> Result<(), GeodesyError> {
    let stored = CARTESIAN_BASE.get_or_init(|| base);
    if *stored == base {
        Ok(())
    } else {
        Err(GeodesyError::AlreadyConfigured {
            setting: "base location",
        })
    }
}

/// Selects the process-wide default coordinate system returned by
/// [`active`]. Same once-only contract as [`set_base_location`].
pub fn set_default_coord_sys(kind: CoordSysKind) -> Result<(), GeodesyError> {
    let stored = DEFAULT_KIND.get_or_init(|| kind);
    if *stored == kind {
        Ok(())
    } else {
        Err(GeodesyError::AlreadyConfigured {
            setting: "default coordinate system",
        })
    }
}

/// Resolves a [`CoordSysKind`] against the registry.
///
/// # Panics
///
/// Panics if `Cartesian` is requested without a configured base location.
/// That is a programming error: the registry must be wired before use.
pub fn coord_sys(kind: CoordSysKind) -> CoordSys {
    match kind {
        CoordSysKind::Haversine => CoordSys::Haversine(Haversine::default()),
        CoordSysKind::Cartesian => {
            let base = CARTESIAN_BASE
                .get()
                .expect("Cartesian base location is not configured; call set_base_location first");
            CoordSys::Cartesian(Cartesian::new(*base))
        }
    }
}

/// The configured default coordinate system.
///
/// # Panics
///
/// Panics if [`set_default_coord_sys`] has not been called, or the default is
/// `Cartesian` without a base location.
pub fn active() -> CoordSys {
    let kind = DEFAULT_KIND
        .get()
        .expect("default coordinate system is not configured; call set_default_coord_sys first");
    coord_sys(*kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_bearing_range() {
        assert_relative_eq!(normalize_bearing(0.0), 0.0);
        assert_relative_eq!(normalize_bearing(190.0), -170.0);
        assert_relative_eq!(normalize_bearing(-190.0), 170.0);
        assert_relative_eq!(normalize_bearing(360.0), 0.0);
        assert_eq!(normalize_bearing(180.0), -180.0);
    }

    #[test]
    fn angle_at_vertex() {
        let cs = CoordSys::Haversine(Haversine::default());
        let p = Position::new(0.0, 0.0);
        let a = Position::new(0.0, 1.0);
        let b = Position::new(1.0, 0.0);
        // north to east, seen from the origin
        assert_relative_eq!(cs.angle_at(a, b, p), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn velocity_between_fixes() {
        let cs = CoordSys::Haversine(Haversine::default());
        let a = Position::new(0.0, 0.0);
        let b = Position::new(0.0, 0.01);
        let v = cs.velocity(a, b, 60.0);
        assert_relative_eq!(v.speed, cs.distance(a, b) / 60.0);
        assert_relative_eq!(v.bearing, 0.0, epsilon = 1e-9);
    }
}
