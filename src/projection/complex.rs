/// Minimal complex arithmetic for the log-projection pipeline.
/// Only the operations the forward/inverse transforms need; not exported
/// outside the projection module.
#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) struct Complex {
    pub re: f64,
    pub im: f64,
}

/// Unit complex number rotating the azimuthal plane by -90°, so the
/// branch cut of the log runs along the vertical screen axis.
pub(crate) const AXIS_TILT: Complex = Complex { re: 0.0, im: -1.0 };

/// Conjugate of `AXIS_TILT`; undoes the axis alignment in the inverse.
pub(crate) const AXIS_TILT_INV: Complex = Complex { re: 0.0, im: 1.0 };

impl Complex {
    #[inline(always)]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[inline(always)]
    pub fn mul(self, rhs: Complex) -> Complex {
        Complex {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }

    #[inline(always)]
    pub fn add_scalar(self, s: f64) -> Complex {
        Complex {
            re: self.re + s,
            im: self.im + s,
        }
    }

    /// Principal branch of the complex logarithm.
    /// Imaginary part lands in (-pi, pi].
    #[inline(always)]
    pub fn ln(self) -> Complex {
        Complex {
            re: self.re.hypot(self.im).ln(),
            im: self.im.atan2(self.re),
        }
    }

    /// Complex exponential, the exact inverse of `ln`.
    #[inline(always)]
    pub fn exp(self) -> Complex {
        let r = self.re.exp();
        let (sin_im, cos_im) = self.im.sin_cos();
        Complex {
            re: r * cos_im,
            im: r * sin_im,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ln_exp_round_trip() {
        let z = Complex::new(0.3, -1.2);
        let back = z.ln().exp();
        assert!((back.re - z.re).abs() < 1e-12);
        assert!((back.im - z.im).abs() < 1e-12);
    }

    #[test]
    fn test_axis_tilt_cancels() {
        let z = Complex::new(0.7, 0.4);
        let back = z.mul(AXIS_TILT).mul(AXIS_TILT_INV);
        assert!((back.re - z.re).abs() < 1e-15);
        assert!((back.im - z.im).abs() < 1e-15);
    }

    #[test]
    fn test_ln_branch_range() {
        // Imaginary part of the log stays in (-pi, pi]
        for &(re, im) in &[(1.0, 0.0), (-1.0, 1e-9), (-1.0, -1e-9), (0.0, 1.0)] {
            let w = Complex::new(re, im).ln();
            assert!(w.im > -std::f64::consts::PI - 1e-15);
            assert!(w.im <= std::f64::consts::PI + 1e-15);
        }
    }
}
