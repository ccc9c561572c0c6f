mod geometry;
mod renderer;

pub use renderer::{Lod, LineString, MapLayers, MapRenderer};
