/// Wrap a longitude in degrees to (-180, 180]
#[inline(always)]
pub fn wrap_longitude(lon: f64) -> f64 {
    180.0 - (180.0 - lon).rem_euclid(360.0)
}

/// Clamp a latitude in degrees to [-90, 90]
#[inline(always)]
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-90.0, 90.0)
}

/// Shortest signed longitude difference `to - from` in degrees, in (-180, 180]
#[inline(always)]
pub fn lon_delta(from: f64, to: f64) -> f64 {
    wrap_longitude(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(0.0), 0.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(540.0), 180.0);
    }

    #[test]
    fn test_lon_delta_takes_short_way() {
        assert_eq!(lon_delta(170.0, -170.0), 20.0);
        assert_eq!(lon_delta(-170.0, 170.0), -20.0);
        assert_eq!(lon_delta(10.0, 30.0), 20.0);
    }
}
