use glam::DVec3;
use rayon::prelude::*;

use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_line, draw_marker};
use crate::projection::Projection;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for map data
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional
}

impl Lod {
    /// Select LOD based on zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 2.0 {
            Lod::Low
        } else if zoom < 8.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }
}

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_coastlines: bool,
    pub show_graticule: bool,
    pub show_clip_outline: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_coastlines: true,
            show_graticule: true,
            show_clip_outline: false,
        }
    }
}

/// Rasterized layers for one display, drawn back to front with distinct
/// colors by the UI.
pub struct MapLayers {
    pub graticule: BrailleCanvas,
    pub coastlines: BrailleCanvas,
    pub clip_outline: BrailleCanvas,
    pub marker: BrailleCanvas,
}

/// Map renderer with multi-resolution coastline data, shared by all
/// displays; per-display state lives in the `Projection` passed to `render`.
pub struct MapRenderer {
    pub coastlines_low: Vec<LineString>,
    pub coastlines_medium: Vec<LineString>,
    pub coastlines_high: Vec<LineString>,
    graticule: Vec<LineString>,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            coastlines_low: Vec::new(),
            coastlines_medium: Vec::new(),
            coastlines_high: Vec::new(),
            graticule: Vec::new(),
            settings: DisplaySettings::default(),
        }
    }

    /// Get coastlines for the given LOD
    fn get_coastlines(&self, lod: Lod) -> &Vec<LineString> {
        match lod {
            Lod::High => {
                if !self.coastlines_high.is_empty() {
                    &self.coastlines_high
                } else if !self.coastlines_medium.is_empty() {
                    &self.coastlines_medium
                } else {
                    &self.coastlines_low
                }
            }
            Lod::Medium => {
                if !self.coastlines_medium.is_empty() {
                    &self.coastlines_medium
                } else {
                    &self.coastlines_low
                }
            }
            Lod::Low => &self.coastlines_low,
        }
    }

    /// Render all enabled layers through the given projection into braille
    /// canvases of `width` x `height` character cells. `marker` is a
    /// geographic point of interest (the cursor's position on the sphere),
    /// drawn wherever it is visible.
    pub fn render(
        &self,
        width: usize,
        height: usize,
        proj: &Projection,
        marker: Option<(f64, f64)>,
    ) -> MapLayers {
        let mut layers = MapLayers {
            graticule: BrailleCanvas::new(width, height),
            coastlines: BrailleCanvas::new(width, height),
            clip_outline: BrailleCanvas::new(width, height),
            marker: BrailleCanvas::new(width, height),
        };

        if self.settings.show_graticule {
            self.draw_layer(&mut layers.graticule, &self.graticule, proj);
        }

        if self.settings.show_coastlines {
            let lod = Lod::from_zoom(proj.zoom());
            self.draw_layer(&mut layers.coastlines, self.get_coastlines(lod), proj);
        }

        if self.settings.show_clip_outline {
            self.draw_clip_outline(&mut layers.clip_outline, proj);
        }

        if let Some((lon, lat)) = marker {
            if let Some((x, y)) = proj.project_clipped(lon, lat) {
                draw_marker(&mut layers.marker, x.round() as i32, y.round() as i32, 2);
            }
        }

        layers
    }

    /// Project all linestrings of one layer in parallel, then rasterize the
    /// resulting pixel polylines serially. The projection is read-only here,
    /// so per-feature work is embarrassingly parallel.
    fn draw_layer(&self, canvas: &mut BrailleCanvas, lines: &[LineString], proj: &Projection) {
        let max_jump = proj.width() as i32 / 2;
        let polylines: Vec<Vec<(i32, i32)>> = lines
            .par_iter()
            .flat_map_iter(|line| project_linestring(proj, line))
            .collect();

        for polyline in &polylines {
            for pair in polyline.windows(2) {
                let (x0, y0) = pair[0];
                let (x1, y1) = pair[1];
                // A huge pixel jump means the segment straddles the branch
                // cut; the clip should prevent this, drop it if not
                if (x1 - x0).abs() + (y1 - y0).abs() < max_jump {
                    draw_line(canvas, x0, y0, x1, y1);
                }
            }
        }
    }

    /// Trace the installed clip ring. Its vertices lie exactly on the padded
    /// viewport rectangle, so plain projection (no pre-clip) is correct.
    fn draw_clip_outline(&self, canvas: &mut BrailleCanvas, proj: &Projection) {
        let ring = proj.clip_polygon().ring();
        let mut prev: Option<(i32, i32)> = None;
        for &(lon, lat) in ring {
            let (x, y) = proj.project(lon, lat);
            let p = (x.round() as i32, y.round() as i32);
            if let Some((px, py)) = prev {
                draw_line(canvas, px, py, p.0, p.1);
            }
            prev = Some(p);
        }
    }

    /// Add coastline data at a specific LOD
    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
            Lod::High => self.coastlines_high.push(line),
        }
    }

    /// Install graticule lines (generated once at startup)
    pub fn set_graticule(&mut self, lines: Vec<LineString>) {
        self.graticule = lines;
    }

    /// Check if any data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines_low.is_empty()
            || !self.coastlines_medium.is_empty()
            || !self.coastlines_high.is_empty()
    }

    /// Toggle coastlines
    pub fn toggle_coastlines(&mut self) {
        self.settings.show_coastlines = !self.settings.show_coastlines;
    }

    /// Toggle the graticule
    pub fn toggle_graticule(&mut self) {
        self.settings.show_graticule = !self.settings.show_graticule;
    }

    /// Toggle the clip ring outline
    pub fn toggle_clip_outline(&mut self) {
        self.settings.show_clip_outline = !self.settings.show_clip_outline;
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Project one geographic linestring into pixel polylines, splitting where
/// the line leaves the clip region. Segments are subdivided along great
/// circles first: straight lon/lat segments curve strongly under the log
/// projection, especially near the view center.
fn project_linestring(proj: &Projection, line: &LineString) -> Vec<Vec<(i32, i32)>> {
    let mut polylines = Vec::new();
    if line.len() < 2 {
        return polylines;
    }

    let mut current: Vec<(i32, i32)> = Vec::new();

    let mut visit = |lon: f64, lat: f64| match proj.project_clipped(lon, lat) {
        Some((x, y)) => current.push((x.round() as i32, y.round() as i32)),
        None => {
            if current.len() >= 2 {
                polylines.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    };

    visit(line[0].0, line[0].1);
    for pair in line.windows(2) {
        walk_great_circle(pair[0].0, pair[0].1, pair[1].0, pair[1].1, &mut visit);
    }
    drop(visit);

    if current.len() >= 2 {
        polylines.push(current);
    }
    polylines
}

/// Convert lon/lat (degrees) to a unit sphere vector.
#[inline(always)]
fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

/// Interpolate along a great circle arc and call a visitor for each
/// subdivision point (excluding the start point). ~1° segments; no
/// allocation, each point goes straight to the visitor.
#[inline]
fn walk_great_circle(
    lon0: f64,
    lat0: f64,
    lon1: f64,
    lat1: f64,
    mut visitor: impl FnMut(f64, f64),
) {
    let a = lonlat_to_vec3(lon0, lat0);
    let b = lonlat_to_vec3(lon1, lat1);

    let dot = a.dot(b).clamp(-1.0, 1.0);
    let angle = dot.acos(); // angular distance in radians

    // ~1° segments
    let steps = ((angle.to_degrees()).ceil() as usize).max(1);

    let sin_angle = angle.sin();
    if steps == 1 || sin_angle.abs() < 1e-10 {
        // Short segment, or nearly identical/antipodal points
        visitor(lon1, lat1);
        return;
    }

    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let sa = ((1.0 - t) * angle).sin() / sin_angle;
        let sb = (t * angle).sin() / sin_angle;
        let p = a * sa + b * sb;

        let lat = p.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = p.y.atan2(p.x).to_degrees();
        visitor(lon, lat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_great_circle_ends_at_target() {
        let mut last = (0.0, 0.0);
        walk_great_circle(0.0, 0.0, 30.0, 40.0, |lon, lat| last = (lon, lat));
        assert!((last.0 - 30.0).abs() < 1e-9);
        assert!((last.1 - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_walk_great_circle_subdivides_long_arcs() {
        let mut count = 0;
        walk_great_circle(0.0, 0.0, 90.0, 0.0, |_, _| count += 1);
        assert!(count >= 89, "only {count} points for a 90° arc");
    }

    #[test]
    fn test_project_linestring_splits_at_clip_boundary() {
        let proj = Projection::new(900.0, 900.0);
        // Crosses the antimeridian branch cut region (view centered on 0,0)
        let line: LineString = vec![(150.0, 0.0), (-150.0, 0.0)];
        let polylines = project_linestring(&proj, &line);
        // Every returned polyline stays within the viewport
        for polyline in &polylines {
            assert!(polyline.len() >= 2);
            for &(x, y) in polyline {
                assert!((0..=900).contains(&x), "x {x}");
                assert!((0..=900).contains(&y), "y {y}");
            }
        }
    }

    #[test]
    fn test_render_produces_output_for_fallback_world() {
        let mut renderer = MapRenderer::new();
        renderer.add_coastline(vec![(0.0, 0.0), (20.0, 10.0), (40.0, 0.0)], Lod::Low);
        let proj = Projection::new(200.0, 200.0);
        let layers = renderer.render(100, 50, &proj, None);
        let drawn = layers.coastlines.rows().any(|r| r.chars().any(|c| c != '⠀'));
        assert!(drawn, "coastline layer is empty");
    }
}
