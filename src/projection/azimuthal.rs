use std::f64::consts::PI;

/// Which azimuthal raw projection feeds the complex logarithm.
///
/// Equidistant preserves angular distance from the center (radius equals the
/// great-circle angle), equal-area preserves area. Both share the same
/// closed-form shape and differ only in the radial scaling of the
/// angular distance `c` from the projection center.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AzimuthalKind {
    #[default]
    Equidistant,
    EqualArea,
}

/// Raw azimuthal forward: (lambda, phi) in radians to plane coordinates.
/// The projection center is (0, 0); rotation happens before this step.
pub fn forward(kind: AzimuthalKind, lambda: f64, phi: f64) -> (f64, f64) {
    let cos_phi = phi.cos();
    // Cosine of the angular distance from the projection center
    let cos_c = (cos_phi * lambda.cos()).clamp(-1.0, 1.0);

    let k = match kind {
        AzimuthalKind::Equidistant => {
            let c = cos_c.acos();
            let sin_c = c.sin();
            // c -> 0 and c -> pi both degenerate; the limit at 0 is 1 and the
            // antipode is excluded by the clip region, so a finite value is fine.
            if sin_c.abs() < 1e-12 {
                1.0
            } else {
                c / sin_c
            }
        }
        AzimuthalKind::EqualArea => (2.0 / (1.0 + cos_c).max(1e-12)).sqrt(),
    };

    (k * cos_phi * lambda.sin(), k * phi.sin())
}

/// Raw azimuthal inverse: plane coordinates back to (lambda, phi) in radians.
pub fn invert(kind: AzimuthalKind, x: f64, y: f64) -> (f64, f64) {
    let rho = x.hypot(y);
    if rho < 1e-15 {
        return (0.0, 0.0);
    }

    let c = match kind {
        AzimuthalKind::Equidistant => rho.min(PI),
        // Valid equal-area radii are <= 2; clamp so out-of-range pixels from
        // the unbounded log plane fold onto the antipode instead of NaN.
        AzimuthalKind::EqualArea => 2.0 * (rho / 2.0).clamp(-1.0, 1.0).asin(),
    };

    let (sin_c, cos_c) = c.sin_cos();
    let lambda = (x * sin_c).atan2(rho * cos_c);
    let phi = (y * sin_c / rho).clamp(-1.0, 1.0).asin();
    (lambda, phi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(kind: AzimuthalKind, lambda: f64, phi: f64) {
        let (x, y) = forward(kind, lambda, phi);
        let (l2, p2) = invert(kind, x, y);
        assert!(
            (l2 - lambda).abs() < 1e-9 && (p2 - phi).abs() < 1e-9,
            "{kind:?} ({lambda}, {phi}) -> ({x}, {y}) -> ({l2}, {p2})"
        );
    }

    #[test]
    fn test_round_trip_equidistant() {
        round_trip(AzimuthalKind::Equidistant, 0.0, 0.0);
        round_trip(AzimuthalKind::Equidistant, 0.1, 0.2);
        round_trip(AzimuthalKind::Equidistant, -1.2, 0.7);
        round_trip(AzimuthalKind::Equidistant, 2.5, -1.1);
    }

    #[test]
    fn test_round_trip_equal_area() {
        round_trip(AzimuthalKind::EqualArea, 0.0, 0.0);
        round_trip(AzimuthalKind::EqualArea, 0.1, 0.2);
        round_trip(AzimuthalKind::EqualArea, -1.2, 0.7);
        round_trip(AzimuthalKind::EqualArea, 2.5, -1.1);
    }

    #[test]
    fn test_center_maps_to_origin() {
        for kind in [AzimuthalKind::Equidistant, AzimuthalKind::EqualArea] {
            let (x, y) = forward(kind, 0.0, 0.0);
            assert_eq!(x, 0.0);
            assert_eq!(y, 0.0);
        }
    }

    #[test]
    fn test_equidistant_radius_is_angular_distance() {
        // A point 90° away along the equator projects at radius pi/2
        let (x, y) = forward(AzimuthalKind::Equidistant, PI / 2.0, 0.0);
        assert!((x.hypot(y) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_forward_is_finite_near_antipode() {
        let (x, y) = forward(AzimuthalKind::Equidistant, PI - 1e-9, 0.0);
        assert!(x.is_finite() && y.is_finite());
    }
}
