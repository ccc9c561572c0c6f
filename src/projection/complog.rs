use std::f64::consts::PI;

use crate::geo::{clamp_latitude, wrap_longitude};
use crate::projection::azimuthal::{self, AzimuthalKind};
use crate::projection::clip::{ClipError, ClipPolygon, PlaneRect};
use crate::projection::complex::{Complex, AXIS_TILT, AXIS_TILT_INV};
use crate::projection::rotation::Rotation;

/// Offset added to both plane components before the log, pushing the
/// projection center away from the log's singularity at the origin.
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Samples per viewport-rectangle edge when back-mapping the clip polygon.
/// Larger values follow the curved preimage of the rectangle more closely;
/// smaller values show straight-edge artifacts but are cheaper.
pub const DEFAULT_SAMPLES_PER_EDGE: usize = 24;

/// Complex-logarithm map projection.
///
/// Forward pipeline: spherical rotation -> azimuthal raw projection ->
/// -90° axis alignment (complex multiplication) -> epsilon offset ->
/// complex log -> scale and translate. Radial distance from the view center
/// becomes the horizontal axis, bearing becomes the vertical axis, and the
/// branch cut of the log runs vertically through the view.
///
/// The inverse runs the exact same steps in reverse, so
/// `invert(project(p)) == p` for every point inside the clip region.
///
/// Each display owns one instance; rotation changes go through
/// `set_rotation`, which atomically updates the rotation and rebuilds the
/// clip polygon so renderers never observe a mismatched pair.
#[derive(Clone, Debug)]
pub struct Projection {
    kind: AzimuthalKind,
    epsilon: f64,
    rotate_lon: f64,
    rotate_lat: f64,
    gamma: f64,
    rotation: Rotation,
    zoom: f64,
    scale: f64,
    translate: (f64, f64),
    width: f64,
    height: f64,
    samples_per_edge: usize,
    clip: ClipPolygon,
    clip_rect: PlaneRect,
    clip_fallbacks: u64,
}

impl Projection {
    /// Build a projection fitted to a pixel viewport, centered on (0°, 0°).
    pub fn new(width: f64, height: f64) -> Self {
        let mut proj = Self {
            kind: AzimuthalKind::default(),
            epsilon: DEFAULT_EPSILON,
            rotate_lon: 0.0,
            rotate_lat: 0.0,
            gamma: 0.0,
            rotation: Rotation::identity(),
            zoom: 1.0,
            scale: 1.0,
            translate: (0.0, 0.0),
            width,
            height,
            samples_per_edge: DEFAULT_SAMPLES_PER_EDGE,
            // Seed with the static wedge so there is always a valid
            // last-known-good polygon before the first back-mapped build.
            clip: ClipPolygon::antipodal_wedge(0.0, 0.0, 1.0),
            clip_rect: PlaneRect::padded(width, height, 1.0),
            clip_fallbacks: 0,
        };
        proj.fit();
        proj.rebuild_clip();
        proj
    }

    /// Project (lon, lat) degrees to pixel coordinates.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (lambda, phi) = self
            .rotation
            .forward(lon.to_radians(), lat.to_radians());
        let (x, y) = self.raw_project(lambda, phi);
        (
            self.translate.0 + self.scale * x,
            self.translate.1 + self.scale * y,
        )
    }

    /// Project with the pre-clip applied: `None` when the point falls
    /// outside the renderable clip region.
    pub fn project_clipped(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (x, y) = self.project(lon, lat);
        if self.clip_rect.contains(x, y) {
            Some((x, y))
        } else {
            None
        }
    }

    /// Invert pixel coordinates back to (lon, lat) degrees.
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        let (lambda, phi) = self.raw_invert(
            (x - self.translate.0) / self.scale,
            (y - self.translate.1) / self.scale,
        );
        let (lon, lat) = self.rotation.invert(lambda, phi);
        (wrap_longitude(lon.to_degrees()), lat.to_degrees())
    }

    /// Rotation-free core transform: view-frame (lambda, phi) radians to the
    /// log plane. Exposed to the clip builder and benchmarks.
    pub(crate) fn raw_project(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let (re, im) = azimuthal::forward(self.kind, lambda, phi);
        let w = Complex::new(re, im)
            .mul(AXIS_TILT)
            .add_scalar(self.epsilon)
            .ln();
        (w.re, w.im)
    }

    /// Exact reverse of `raw_project`.
    pub(crate) fn raw_invert(&self, x: f64, y: f64) -> (f64, f64) {
        let z = Complex::new(x, y)
            .exp()
            .add_scalar(-self.epsilon)
            .mul(AXIS_TILT_INV);
        azimuthal::invert(self.kind, z.re, z.im)
    }

    /// Recenter the view on (lon0, lat0) degrees.
    ///
    /// One atomic step: store the rotation, refit scale/translate, rebuild
    /// the clip polygon in the new frame. Callers observing the projection
    /// between any two renders always see a matching rotation/clip pair.
    pub fn set_rotation(&mut self, lon0: f64, lat0: f64) {
        self.rotate_lon = wrap_longitude(lon0);
        self.rotate_lat = clamp_latitude(lat0);
        self.rotation = Rotation::centered_on(self.rotate_lon, self.rotate_lat, self.gamma);
        self.fit();
        self.rebuild_clip();
    }

    /// Current rotation center (lon0, lat0) in degrees.
    pub fn rotation(&self) -> (f64, f64) {
        (self.rotate_lon, self.rotate_lat)
    }

    /// Build a fresh back-mapped clip polygon for the current state without
    /// installing it.
    pub fn build_clip_polygon(&self) -> Result<ClipPolygon, ClipError> {
        ClipPolygon::backmapped(self, self.padded_rect(), self.samples_per_edge)
    }

    /// The installed clip polygon.
    pub fn clip_polygon(&self) -> &ClipPolygon {
        &self.clip
    }

    /// How many rebuilds were rejected and fell back to the previous ring.
    pub fn clip_fallbacks(&self) -> u64 {
        self.clip_fallbacks
    }

    /// Whether a point lies inside the renderable clip region.
    ///
    /// The installed ring is exactly the preimage of the padded viewport
    /// rectangle and the forward map is single-valued, so membership reduces
    /// to projecting and testing against that rectangle.
    pub fn clip_contains(&self, lon: f64, lat: f64) -> bool {
        let (x, y) = self.project(lon, lat);
        self.clip_rect.contains(x, y)
    }

    pub fn kind(&self) -> AzimuthalKind {
        self.kind
    }

    /// Switch the base azimuthal projection; refits and rebuilds the clip.
    pub fn set_kind(&mut self, kind: AzimuthalKind) {
        self.kind = kind;
        self.fit();
        self.rebuild_clip();
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Multiply the zoom factor. The lower bound stays at 1: below that the
    /// viewport would span more than one 2*pi period of the bearing axis and
    /// the back-mapped clip ring would cross the branch cut.
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(1.0, 64.0);
        self.fit();
        self.rebuild_clip();
    }

    /// Resize the pixel viewport.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.fit();
        self.rebuild_clip();
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Number of clip samples taken along each viewport edge.
    pub fn samples_per_edge(&self) -> usize {
        self.samples_per_edge
    }

    pub fn set_samples_per_edge(&mut self, n: usize) {
        self.samples_per_edge = n.max(1);
        self.rebuild_clip();
    }

    /// Derive scale and translate from viewport and zoom. The bearing axis
    /// (vertical) spans 2*pi log-plane units at zoom 1; the horizontal axis
    /// is anchored so the antipodal radius sits at the right viewport edge.
    fn fit(&mut self) {
        self.scale = self.zoom * self.height / (2.0 * PI);
        let max_rho: f64 = match self.kind {
            AzimuthalKind::Equidistant => PI,
            AzimuthalKind::EqualArea => 2.0,
        };
        self.translate = (
            self.width - self.scale * max_rho.ln(),
            self.height / 2.0,
        );
    }

    /// Viewport rectangle padded inward so the clip boundary never touches
    /// the viewport edge. 1 pixel per 900-pixel viewport, scaled.
    fn padded_rect(&self) -> PlaneRect {
        let padding = (self.width.min(self.height) / 900.0).max(0.5);
        PlaneRect::padded(self.width, self.height, padding)
    }

    /// Install a freshly back-mapped clip ring, keeping the previous ring if
    /// the candidate is degenerate.
    fn rebuild_clip(&mut self) {
        let rect = self.padded_rect();
        match ClipPolygon::backmapped(&*self, rect, self.samples_per_edge) {
            Ok(ring) => {
                self.clip = ring;
                self.clip_rect = rect;
            }
            Err(_) => {
                self.clip_fallbacks += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compare two angles after the periodic reduction `a mod pi`, allowing
    /// the wrap at the interval boundary.
    fn assert_angle_eq(a: f64, b: f64, tol: f64) {
        let d = (a.rem_euclid(PI) - b.rem_euclid(PI)).abs();
        assert!(d < tol || (PI - d) < tol, "{a} vs {b} (reduced delta {d})");
    }

    #[test]
    fn test_raw_round_trip() {
        let proj = Projection::new(900.0, 900.0);
        for &(lambda, phi) in &[
            (0.0, 0.0),
            (0.1, 0.2),
            (PI, 0.0),
            (0.0, PI),
            (PI, PI),
        ] {
            let (x, y) = proj.raw_project(lambda, phi);
            assert!(x.is_finite() && y.is_finite(), "({lambda}, {phi})");
            let (l2, p2) = proj.raw_invert(x, y);
            assert_angle_eq(lambda, l2, 1e-5);
            assert_angle_eq(phi, p2, 1e-5);
        }
    }

    #[test]
    fn test_raw_round_trip_equal_area() {
        let mut proj = Projection::new(900.0, 900.0);
        proj.set_kind(AzimuthalKind::EqualArea);
        for &(lambda, phi) in &[(0.0, 0.0), (0.1, 0.2), (-1.5, 0.8)] {
            let (x, y) = proj.raw_project(lambda, phi);
            let (l2, p2) = proj.raw_invert(x, y);
            assert_angle_eq(lambda, l2, 1e-5);
            assert_angle_eq(phi, p2, 1e-5);
        }
    }

    #[test]
    fn test_degrees_round_trip() {
        let proj = Projection::new(900.0, 900.0);
        let (x, y) = proj.project(10.0, 20.0);
        let (lon, lat) = proj.invert(x, y);
        assert!((lon - 10.0).abs() < 1e-5, "lon {lon}");
        assert!((lat - 20.0).abs() < 1e-5, "lat {lat}");
    }

    #[test]
    fn test_round_trip_with_rotation() {
        let mut proj = Projection::new(900.0, 900.0);
        proj.set_rotation(-73.5, 40.2);
        for &(lon, lat) in &[(10.0, 20.0), (-74.0, 40.7), (139.7, 35.7)] {
            let (x, y) = proj.project(lon, lat);
            let (lon2, lat2) = proj.invert(x, y);
            assert!((crate::geo::lon_delta(lon, lon2)).abs() < 1e-5);
            assert!((lat2 - lat).abs() < 1e-5);
        }
    }

    #[test]
    fn test_center_is_finite() {
        // The rotated center maps through the log singularity; the epsilon
        // offset must keep the output finite.
        let mut proj = Projection::new(900.0, 900.0);
        for &(lon0, lat0) in &[(0.0, 0.0), (12.5, -33.0)] {
            proj.set_rotation(lon0, lat0);
            let (x, y) = proj.project(lon0, lat0);
            assert!(x.is_finite() && y.is_finite(), "center ({lon0}, {lat0})");
        }
    }

    #[test]
    fn test_invert_far_from_origin_is_finite() {
        let proj = Projection::new(900.0, 900.0);
        for &x in &[-10.0, -5.0, 0.0, 5.0, 10.0] {
            let px = proj.translate.0 + proj.scale * x;
            let (lon, lat) = proj.invert(px, proj.translate.1 + 1.0);
            assert!(lon.is_finite() && lat.is_finite(), "log-plane x {x}");
        }
    }

    #[test]
    fn test_set_rotation_is_idempotent() {
        let mut a = Projection::new(900.0, 900.0);
        a.set_rotation(45.0, -20.0);
        let first = a.clip_polygon().clone();
        a.set_rotation(45.0, -20.0);
        assert_eq!(first.ring(), a.clip_polygon().ring());
    }

    #[test]
    fn test_clip_ring_valid_across_rotations() {
        let mut proj = Projection::new(900.0, 900.0);
        for &lon0 in &[0.0, 45.0, 90.0, 180.0, 270.0] {
            proj.set_rotation(lon0, 0.0);
            let ring = proj.clip_polygon().ring();
            assert_eq!(ring.first(), ring.last(), "rotation {lon0}");
            for pair in ring.windows(2) {
                assert_ne!(pair[0], pair[1], "adjacent duplicate at rotation {lon0}");
            }
        }
    }

    #[test]
    fn test_clip_ring_sample_count() {
        let proj = Projection::new(900.0, 900.0);
        let ring = proj.build_clip_polygon().unwrap();
        assert_eq!(ring.ring().len(), 4 * proj.samples_per_edge() + 1);
    }

    #[test]
    fn test_clip_contains_center_excludes_antipode() {
        let mut proj = Projection::new(900.0, 900.0);
        proj.set_rotation(10.0, 20.0);
        // A point a little east of the center is well inside the band
        assert!(proj.clip_contains(40.0, 20.0));
        // The antipode lands outside the padded rectangle
        assert!(!proj.clip_contains(-170.0, -20.0));
    }

    #[test]
    fn test_zoom_changes_scale() {
        let mut proj = Projection::new(900.0, 900.0);
        let s = proj.scale();
        proj.zoom_by(2.0);
        assert!((proj.scale() - 2.0 * s).abs() < 1e-12);
    }
}
