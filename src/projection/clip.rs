use std::fmt;

use glam::DVec3;

use crate::geo::{clamp_latitude, wrap_longitude};
use crate::projection::complog::Projection;

/// Axis-aligned rectangle in pixel coordinates. The padded viewport
/// rectangle is the generator of the back-mapped clip polygon and doubles as
/// its membership test in the projected plane.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PlaneRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PlaneRect {
    /// Viewport rectangle inset by `padding` pixels on every side.
    pub fn padded(width: f64, height: f64, padding: f64) -> Self {
        Self {
            x0: padding,
            y0: padding,
            x1: width - padding,
            y1: height - padding,
        }
    }

    #[inline(always)]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// Why a candidate clip ring was rejected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClipError {
    /// Fewer than 3 distinct vertices.
    TooFewPoints,
    /// Two consecutive vertices coincide.
    AdjacentDuplicate,
    /// Ring not closed (first point != last point).
    NotClosed,
    /// Two non-adjacent edges cross.
    SelfIntersecting,
}

impl fmt::Display for ClipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipError::TooFewPoints => write!(f, "clip ring has fewer than 3 distinct points"),
            ClipError::AdjacentDuplicate => write!(f, "clip ring has adjacent duplicate points"),
            ClipError::NotClosed => write!(f, "clip ring is not closed"),
            ClipError::SelfIntersecting => write!(f, "clip ring intersects itself"),
        }
    }
}

impl std::error::Error for ClipError {}

/// Closed spherical ring of (lon, lat) degree pairs demarcating the
/// renderable region of a complex-log projection.
///
/// Invariants (enforced by `validate`): first point equals last point, at
/// least 3 distinct vertices, no adjacent duplicates, no self-intersection.
/// Winding is clockwise as seen from outside the sphere; the kept region is
/// the one on the clockwise side.
#[derive(Clone, PartialEq, Debug)]
pub struct ClipPolygon {
    ring: Vec<(f64, f64)>,
}

impl ClipPolygon {
    /// The closed vertex ring, `ring[0] == ring[last]`.
    pub fn ring(&self) -> &[(f64, f64)] {
        &self.ring
    }

    /// Static wedge strategy: a small diamond straddling the antipode of the
    /// projection center, expressed directly in degrees. Rotation-independent
    /// and always valid, so it serves as the seed before the first
    /// back-mapped build. Wound so that the kept region is the complement of
    /// the diamond.
    pub fn antipodal_wedge(center_lon: f64, center_lat: f64, pad_deg: f64) -> Self {
        let alon = wrap_longitude(center_lon + 180.0);
        let alat = -center_lat;
        let ring = vec![
            (wrap_longitude(alon - pad_deg), alat),
            (alon, clamp_latitude(alat + pad_deg)),
            (wrap_longitude(alon + pad_deg), alat),
            (alon, clamp_latitude(alat - pad_deg)),
            (wrap_longitude(alon - pad_deg), alat),
        ];
        Self { ring }
    }

    /// Back-mapping strategy: sample `samples_per_edge` points along each
    /// edge of the padded viewport rectangle, invert each through the full
    /// projection (which re-expresses them in the unrotated data frame), and
    /// close the ring. Produces `4 * samples_per_edge + 1` points.
    ///
    /// The resulting ring is the exact preimage of the rectangle boundary;
    /// it hugs the branch cut at the padding distance, so geometry clipped
    /// to it never projects onto both sides of the cut.
    pub fn backmapped(
        proj: &Projection,
        rect: PlaneRect,
        samples_per_edge: usize,
    ) -> Result<Self, ClipError> {
        let n = samples_per_edge.max(1);
        let corners = [
            (rect.x0, rect.y0),
            (rect.x1, rect.y0),
            (rect.x1, rect.y1),
            (rect.x0, rect.y1),
        ];

        let mut ring = Vec::with_capacity(4 * n + 1);
        for e in 0..4 {
            let (ax, ay) = corners[e];
            let (bx, by) = corners[(e + 1) % 4];
            for i in 0..n {
                let t = i as f64 / n as f64;
                let (lon, lat) = proj.invert(ax + (bx - ax) * t, ay + (by - ay) * t);
                ring.push((lon, lat));
            }
        }
        ring.push(ring[0]);

        Self::validate(&ring)?;
        Ok(Self { ring })
    }

    /// Reject degenerate rings before they reach a renderer.
    fn validate(ring: &[(f64, f64)]) -> Result<(), ClipError> {
        if ring.len() < 4 {
            return Err(ClipError::TooFewPoints);
        }
        if ring.first() != ring.last() {
            return Err(ClipError::NotClosed);
        }
        for pair in ring.windows(2) {
            if pair[0] == pair[1] {
                return Err(ClipError::AdjacentDuplicate);
            }
        }

        let distinct = ring.len() - 1;
        if distinct < 3 {
            return Err(ClipError::TooFewPoints);
        }

        if ring_self_intersects(ring) {
            return Err(ClipError::SelfIntersecting);
        }
        Ok(())
    }
}

#[inline(always)]
fn to_unit_vec(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

/// `p` lies strictly within the minor great-circle arc from `a` to `b`,
/// where `n = a x b`. Sign tests only, no inverse trig.
#[inline(always)]
fn arc_contains(a: DVec3, b: DVec3, n: DVec3, p: DVec3) -> bool {
    a.cross(p).dot(n) > 1e-15 && p.cross(b).dot(n) > 1e-15
}

/// Pairwise great-circle arc crossing test over all non-adjacent edge pairs.
/// O(n^2) on ~100 edges, only run when a ring is (re)built.
fn ring_self_intersects(ring: &[(f64, f64)]) -> bool {
    let pts: Vec<DVec3> = ring.iter().map(|&(lon, lat)| to_unit_vec(lon, lat)).collect();
    let m = pts.len() - 1; // edge count; last point repeats the first

    for i in 0..m {
        let (a, b) = (pts[i], pts[i + 1]);
        let n1 = a.cross(b);
        if n1.length_squared() < 1e-30 {
            continue;
        }
        for j in (i + 2)..m {
            // The closing edge is adjacent to the first
            if i == 0 && j == m - 1 {
                continue;
            }
            let (c, d) = (pts[j], pts[j + 1]);
            let n2 = c.cross(d);
            if n2.length_squared() < 1e-30 {
                continue;
            }
            let t = n1.cross(n2);
            if t.length_squared() < 1e-30 {
                // Arcs on the same great circle; distinct-vertex and
                // adjacency checks already bound this case
                continue;
            }
            let p = t.normalize();
            for cand in [p, -p] {
                if arc_contains(a, b, n1, cand) && arc_contains(c, d, n2, cand) {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wedge_is_closed_and_valid() {
        let wedge = ClipPolygon::antipodal_wedge(0.0, 0.0, 1.0);
        let ring = wedge.ring();
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.len(), 5);
        assert!(ClipPolygon::validate(ring).is_ok());
    }

    #[test]
    fn test_wedge_straddles_antipode() {
        let wedge = ClipPolygon::antipodal_wedge(10.0, 20.0, 2.0);
        // Antipode of (10, 20) is (-170, -20); every vertex stays within the
        // padding of it
        for &(lon, lat) in &wedge.ring()[..4] {
            assert!((crate::geo::lon_delta(-170.0, lon)).abs() <= 2.0 + 1e-9);
            assert!((lat - -20.0).abs() <= 2.0 + 1e-9);
        }
    }

    #[test]
    fn test_validate_rejects_open_ring() {
        let ring = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert_eq!(ClipPolygon::validate(&ring), Err(ClipError::NotClosed));
    }

    #[test]
    fn test_validate_rejects_adjacent_duplicates() {
        let ring = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)];
        assert_eq!(
            ClipPolygon::validate(&ring),
            Err(ClipError::AdjacentDuplicate)
        );
    }

    #[test]
    fn test_validate_rejects_too_few_points() {
        let ring = vec![(0.0, 0.0), (10.0, 0.0), (0.0, 0.0)];
        assert_eq!(ClipPolygon::validate(&ring), Err(ClipError::TooFewPoints));
    }

    #[test]
    fn test_validate_rejects_bowtie() {
        // Edges (0,0)-(10,10) and (10,0)-(0,10) cross
        let ring = vec![
            (0.0, 0.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ];
        assert_eq!(
            ClipPolygon::validate(&ring),
            Err(ClipError::SelfIntersecting)
        );
    }

    #[test]
    fn test_validate_accepts_simple_quad() {
        let ring = vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ];
        assert!(ClipPolygon::validate(&ring).is_ok());
    }

    #[test]
    fn test_plane_rect_contains() {
        let rect = PlaneRect::padded(900.0, 900.0, 1.0);
        assert!(rect.contains(450.0, 450.0));
        assert!(rect.contains(1.0, 1.0));
        assert!(!rect.contains(0.5, 450.0));
        assert!(!rect.contains(450.0, 899.5));
    }
}
