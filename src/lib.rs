//! Complex-logarithm world map projection and its terminal rendering shell.
//!
//! The projection composes an azimuthal base projection with a complex
//! logarithm: radial distance from the view center becomes one axis, bearing
//! the other. The `projection` module holds the forward/inverse math, the
//! branch-cut clip polygon, and the rotation machinery; `map`, `braille` and
//! `data` are the rendering shell around it.

pub mod braille;
pub mod data;
pub mod geo;
pub mod map;
pub mod projection;
