mod azimuthal;
mod clip;
mod complex;
mod complog;
mod rotation;
mod transition;

pub use azimuthal::AzimuthalKind;
pub use clip::{ClipError, ClipPolygon, PlaneRect};
pub use complog::{Projection, DEFAULT_SAMPLES_PER_EDGE};
pub use rotation::Rotation;
pub use transition::Transition;
