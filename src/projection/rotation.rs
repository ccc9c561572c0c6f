use std::f64::consts::PI;

/// Three-angle spherical rotation applied to geographic points before the raw
/// projection: a longitude shift, then a combined latitude/roll rotation.
///
/// Built from a view center: `Rotation::centered_on(lon0, lat0, gamma)` moves
/// (lon0, lat0) to the projection center (0, 0). Trig of the fixed angles is
/// cached at construction since the rotation is applied per vertex.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rotation {
    delta_lambda: f64,
    cos_phi: f64,
    sin_phi: f64,
    cos_gamma: f64,
    sin_gamma: f64,
}

/// Wrap an angle in radians to (-pi, pi].
#[inline(always)]
pub fn wrap_angle(a: f64) -> f64 {
    let w = (-a + PI).rem_euclid(2.0 * PI);
    PI - w
}

impl Rotation {
    /// Rotation that re-centers the view on (lon0, lat0) degrees, with an
    /// optional roll `gamma` in degrees around the new center.
    pub fn centered_on(lon0: f64, lat0: f64, gamma: f64) -> Self {
        let delta_phi = -lat0.to_radians();
        let delta_gamma = gamma.to_radians();
        let (sin_phi, cos_phi) = delta_phi.sin_cos();
        let (sin_gamma, cos_gamma) = delta_gamma.sin_cos();
        Self {
            delta_lambda: -lon0.to_radians(),
            cos_phi,
            sin_phi,
            cos_gamma,
            sin_gamma,
        }
    }

    pub fn identity() -> Self {
        Self::centered_on(0.0, 0.0, 0.0)
    }

    /// Rotate (lambda, phi) radians into the view frame.
    pub fn forward(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let lambda = wrap_angle(lambda + self.delta_lambda);
        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();
        let k = z * self.cos_phi + x * self.sin_phi;
        (
            (y * self.cos_gamma - k * self.sin_gamma)
                .atan2(x * self.cos_phi - z * self.sin_phi),
            (k * self.cos_gamma + y * self.sin_gamma).clamp(-1.0, 1.0).asin(),
        )
    }

    /// Rotate a view-frame point back into the data frame.
    pub fn invert(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();
        let k = z * self.cos_gamma - y * self.sin_gamma;
        (
            wrap_angle(
                (y * self.cos_gamma + z * self.sin_gamma)
                    .atan2(x * self.cos_phi + k * self.sin_phi)
                    - self.delta_lambda,
            ),
            (k * self.cos_phi - x * self.sin_phi).clamp(-1.0, 1.0).asin(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(0.0)).abs() < 1e-15);
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(PI + 0.1) - (-PI + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_center_moves_to_origin() {
        let rot = Rotation::centered_on(10.0, 20.0, 0.0);
        let (l, p) = rot.forward(10.0_f64.to_radians(), 20.0_f64.to_radians());
        assert!(l.abs() < 1e-12);
        assert!(p.abs() < 1e-12);
    }

    #[test]
    fn test_forward_invert_round_trip() {
        let rot = Rotation::centered_on(-73.5, 40.2, 15.0);
        for &(lon, lat) in &[(0.0, 0.0), (0.1, 0.2), (-2.8, 1.1), (3.0, -1.4)] {
            let (l, p) = rot.forward(lon, lat);
            let (l2, p2) = rot.invert(l, p);
            assert!((wrap_angle(l2 - lon)).abs() < 1e-10, "{lon} {lat}");
            assert!((p2 - lat).abs() < 1e-10, "{lon} {lat}");
        }
    }

    #[test]
    fn test_identity_is_noop() {
        let rot = Rotation::identity();
        let (l, p) = rot.forward(0.4, -0.9);
        assert!((l - 0.4).abs() < 1e-15);
        assert!((p + 0.9).abs() < 1e-15);
    }
}
