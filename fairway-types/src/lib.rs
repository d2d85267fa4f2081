//! The `fairway-types` crate provides the primitive value types of the
//! `fairway` maritime-trajectory analytics workspace.
//!
//! # Types
//!
//! - **[`Position`]**: a geographic coordinate in decimal degrees
//! - **[`Xtd`]**: the asymmetric cross-track error envelope of a waypoint
//! - **[`XyXtd`]**: a waypoint, a [`Position`] together with its [`Xtd`]
//! - **[`XyList`]**: an ordered sequence of [`Position`]s
//! - **[`XyXtdList`]**: an ordered sequence of [`XyXtd`] waypoints
//!
//! All value types are constructed-then-immutable plain data; every geodesic
//! operation on them (lengths, resampling, distances) lives in the `fairway`
//! crate, which depends on this one.
//!
//! # Features
//!
//! - `serde`: enables `Serialize`/`Deserialize` derives on all types.

mod list;
mod position;
mod xtd;

pub use list::{XyList, XyXtdList};
pub use position::Position;
pub use xtd::{Xtd, XyXtd};
