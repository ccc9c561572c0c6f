use std::time::Instant;

use complog_map::data;
use complog_map::map::{Lod, MapRenderer};
use complog_map::projection::{AzimuthalKind, Projection, Transition};

/// Duration of an animated recenter, in seconds.
const TRANSITION_SECS: f64 = 1.0;

/// One map panel: an independent projection plus its transition state.
/// Panels share the loaded map data but nothing else; in dual-panel mode
/// each side rotates and zooms on its own.
pub struct Display {
    pub projection: Projection,
    pub transition: Transition,
}

impl Display {
    fn new(pixel_width: usize, pixel_height: usize) -> Self {
        Self {
            projection: Projection::new(pixel_width as f64, pixel_height as f64),
            transition: Transition::Idle,
        }
    }
}

/// Application state
pub struct App {
    pub displays: Vec<Display>,
    pub focused: usize,
    pub renderer: MapRenderer,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for the hover marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Terminal size in characters
    term_width: usize,
    term_height: usize,
    /// Animation clock epoch
    started: Instant,
}

impl App {
    pub fn new(width: usize, height: usize) -> Self {
        let mut renderer = MapRenderer::new();
        renderer.set_graticule(data::graticule());

        let mut app = Self {
            displays: Vec::new(),
            focused: 0,
            renderer,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            term_width: width,
            term_height: height,
            started: Instant::now(),
        };
        let (pw, ph) = app.panel_pixel_size(1);
        app.displays.push(Display::new(pw, ph));
        app
    }

    /// Seconds since the app started; drives rotation transitions.
    pub fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Inner pixel size of one panel when `panels` are shown side by side.
    /// Braille gives 2x4 resolution per character; each panel has its own
    /// border (2 chars) and the bottom row is the status bar.
    fn panel_pixel_size(&self, panels: usize) -> (usize, usize) {
        let panel_chars = self.term_width / panels.max(1);
        let inner_width = panel_chars.saturating_sub(2);
        let inner_height = self.term_height.saturating_sub(3);
        (inner_width * 2, inner_height * 4)
    }

    /// Push the current layout's pixel sizes into every projection.
    fn sync_viewports(&mut self) {
        let (pw, ph) = self.panel_pixel_size(self.displays.len());
        for display in &mut self.displays {
            display.projection.set_viewport(pw as f64, ph as f64);
        }
    }

    /// Update viewport sizes when the terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        self.term_width = width;
        self.term_height = height;
        self.sync_viewports();
    }

    /// Advance all in-flight rotation transitions one clock tick. Every
    /// intermediate rotation goes through `set_rotation`, so the clip
    /// polygon is rebuilt mid-transition, not only at the end.
    pub fn tick(&mut self) {
        let now = self.now();
        for display in &mut self.displays {
            if let Some((lon, lat)) = display.transition.step(now) {
                display.projection.set_rotation(lon, lat);
            }
        }
    }

    pub fn focused_display(&self) -> &Display {
        &self.displays[self.focused]
    }

    fn focused_mut(&mut self) -> &mut Display {
        &mut self.displays[self.focused]
    }

    /// Rotate the focused panel by a degree delta, immediately. Supersedes
    /// any running transition on that panel.
    pub fn rotate_by(&mut self, dlon: f64, dlat: f64) {
        let display = self.focused_mut();
        display.transition.cancel();
        let (lon, lat) = display.projection.rotation();
        display.projection.set_rotation(lon + dlon, lat + dlat);
    }

    /// Zoom the focused panel in
    pub fn zoom_in(&mut self) {
        self.focused_mut().projection.zoom_by(1.5);
    }

    /// Zoom the focused panel out
    pub fn zoom_out(&mut self) {
        self.focused_mut().projection.zoom_by(1.0 / 1.5);
    }

    /// Which panel a terminal column falls into.
    fn panel_at(&self, col: u16) -> usize {
        if self.displays.len() == 2 && (col as usize) >= self.term_width / 2 {
            1
        } else {
            0
        }
    }

    /// Convert terminal coords to braille pixel coords within a panel.
    /// Each terminal cell is 2 braille pixels wide, 4 tall; the panel border
    /// is 1 cell on each side.
    fn panel_pixel(&self, panel: usize, col: u16, row: u16) -> (f64, f64) {
        let panel_chars = self.term_width / self.displays.len().max(1);
        let col_in_panel = (col as usize).saturating_sub(panel * panel_chars);
        let px = col_in_panel.saturating_sub(1) * 2;
        let py = (row as usize).saturating_sub(1) * 4;
        (px as f64, py as f64)
    }

    /// Animated recenter of the clicked panel on the clicked point.
    pub fn recenter_at(&mut self, col: u16, row: u16) {
        let panel = self.panel_at(col);
        let (px, py) = self.panel_pixel(panel, col, row);
        self.focused = panel;
        let now = self.now();
        let display = &mut self.displays[panel];
        let target = display.projection.invert(px, py);
        let from = display.projection.rotation();
        display
            .transition
            .start(from, target, now, TRANSITION_SECS);
    }

    /// Handle mouse drag - rotates the focused panel
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as f64 - x as f64;
            let dy = y as f64 - last_y as f64;
            // Less sensitive when zoomed in
            let zoom = self.focused_display().projection.zoom();
            let step = 3.0 / zoom;
            self.rotate_by(dx * step, dy * step);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Geographic point under the mouse cursor, if it falls inside the clip
    /// region of the panel it hovers over. Rendered as a marker in every
    /// panel, which links the two views of the same sphere.
    pub fn hover_point(&self) -> Option<(f64, f64)> {
        let (col, row) = self.mouse_pos?;
        let panel = self.panel_at(col);
        let (px, py) = self.panel_pixel(panel, col, row);
        let proj = &self.displays[panel].projection;
        let (lon, lat) = proj.invert(px, py);
        proj.clip_contains(lon, lat).then_some((lon, lat))
    }

    /// Switch between single and dual panel mode. The new panel starts as an
    /// independent copy of the focused view.
    pub fn toggle_dual_panel(&mut self) {
        if self.displays.len() == 2 {
            self.displays.truncate(1);
            self.focused = 0;
        } else {
            let (pw, ph) = self.panel_pixel_size(2);
            let (lon, lat) = self.focused_display().projection.rotation();
            let mut display = Display::new(pw, ph);
            display.projection.set_rotation(lon, lat);
            self.displays.push(display);
        }
        self.sync_viewports();
    }

    /// Move focus to the next panel
    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % self.displays.len();
    }

    /// Toggle the focused panel's base azimuthal projection
    pub fn toggle_kind(&mut self) {
        let display = self.focused_mut();
        let kind = match display.projection.kind() {
            AzimuthalKind::Equidistant => AzimuthalKind::EqualArea,
            AzimuthalKind::EqualArea => AzimuthalKind::Equidistant,
        };
        display.projection.set_kind(kind);
    }

    /// Reset the focused panel's view
    pub fn reset_view(&mut self) {
        let (pw, ph) = self.panel_pixel_size(self.displays.len());
        *self.focused_mut() = Display::new(pw, ph);
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get the focused zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.focused_display().projection.zoom())
    }

    /// Get the focused rotation center as a string
    pub fn center_coords(&self) -> String {
        let (lon, lat) = self.focused_display().projection.rotation();
        format!(
            "{:.1}°{}, {:.1}°{}",
            lat.abs(),
            if lat >= 0.0 { "N" } else { "S" },
            lon.abs(),
            if lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Get the focused LOD level as a string
    pub fn lod_level(&self) -> &'static str {
        match Lod::from_zoom(self.focused_display().projection.zoom()) {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }

    /// Clip ring health for the status bar: vertex count, plus how many
    /// rebuilds were rejected and kept the previous ring.
    pub fn clip_status(&self) -> String {
        let proj = &self.focused_display().projection;
        let n = proj.clip_polygon().ring().len();
        let fallbacks = proj.clip_fallbacks();
        if fallbacks == 0 {
            format!("clip:{n}")
        } else {
            format!("clip:{n} (!{fallbacks})")
        }
    }

    /// Base projection name for the status bar
    pub fn kind_label(&self) -> &'static str {
        match self.focused_display().projection.kind() {
            AzimuthalKind::Equidistant => "equidistant",
            AzimuthalKind::EqualArea => "equal-area",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_panel_by_default() {
        let app = App::new(120, 40);
        assert_eq!(app.displays.len(), 1);
        assert_eq!(app.focused, 0);
    }

    #[test]
    fn test_toggle_dual_panel_resizes_viewports() {
        let mut app = App::new(120, 40);
        app.toggle_dual_panel();
        assert_eq!(app.displays.len(), 2);
        let w0 = app.displays[0].projection.width();
        let w1 = app.displays[1].projection.width();
        assert_eq!(w0, w1);
        assert!(w0 <= ((120 / 2 - 2) * 2) as f64);

        app.toggle_dual_panel();
        assert_eq!(app.displays.len(), 1);
    }

    #[test]
    fn test_rotate_by_moves_center() {
        let mut app = App::new(120, 40);
        app.rotate_by(10.0, 5.0);
        let (lon, lat) = app.focused_display().projection.rotation();
        assert_eq!(lon, 10.0);
        assert_eq!(lat, 5.0);
    }

    #[test]
    fn test_rotate_cancels_transition() {
        let mut app = App::new(120, 40);
        let now = app.now();
        app.displays[0]
            .transition
            .start((0.0, 0.0), (90.0, 0.0), now, 10.0);
        app.rotate_by(1.0, 0.0);
        assert!(!app.displays[0].transition.is_active());
    }

    #[test]
    fn test_transition_step_rebuilds_clip() {
        let mut proj = Projection::new(900.0, 900.0);
        let before = proj.clip_polygon().clone();
        let mut tr = Transition::Idle;
        tr.start((0.0, 0.0), (90.0, 0.0), 0.0, 1.0);
        let (lon, lat) = tr.step(0.5).unwrap();
        proj.set_rotation(lon, lat);
        assert_ne!(before.ring(), proj.clip_polygon().ring());
    }

    #[test]
    fn test_panels_rotate_independently() {
        let mut app = App::new(120, 40);
        app.toggle_dual_panel();
        app.focused = 1;
        app.rotate_by(30.0, 0.0);
        assert_eq!(app.displays[0].projection.rotation(), (0.0, 0.0));
        assert_eq!(app.displays[1].projection.rotation(), (30.0, 0.0));
    }
}
