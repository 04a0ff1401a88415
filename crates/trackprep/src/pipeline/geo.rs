//! Geodesic distance on the WGS-84 ellipsoid.

use tracing::trace;

/// WGS-84 semi-major axis in metres.
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// Mean Earth radius in metres, used by the spherical fallback.
const MEAN_RADIUS_M: f64 = 6_371_008.8;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

/// Geodesic distance in kilometres between two points given in decimal
/// degrees.
///
/// Uses Vincenty's inverse formula. Nearly antipodal points, for which the
/// iteration does not converge, fall back to the haversine distance on a
/// sphere of mean Earth radius.
#[must_use]
pub fn geodesic_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    vincenty_m(lat1, lon1, lat2, lon2).unwrap_or_else(|| {
        trace!("Vincenty did not converge; using haversine");
        haversine_m(lat1, lon1, lat2, lon2)
    }) / 1000.0
}

/// Vincenty inverse solution in metres, or `None` if it fails to converge.
#[must_use]
#[allow(clippy::similar_names, clippy::many_single_char_names)]
pub fn vincenty_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Option<f64> {
    let a = WGS84_A;
    let f = WGS84_F;
    let b = (1.0 - f) * a;

    let l = (lon2 - lon1).to_radians();
    let u1 = ((1.0 - f) * lat1.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * lat2.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha.powi(2);
        // Equatorial line: cos_sq_alpha is zero.
        let cos_2sigma_m = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - previous).abs() < CONVERGENCE {
            let u_sq = cos_sq_alpha * (a.powi(2) - b.powi(2)) / b.powi(2);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return Some(b * big_a * (sigma - delta_sigma));
        }
    }
    None
}

/// Haversine distance in metres on a sphere of mean Earth radius.
#[must_use]
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * MEAN_RADIUS_M * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        assert!(geodesic_km(-62.21, -58.42, -62.21, -58.42).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude_near_equator() {
        // Meridian arc from 0 to 1 degree on WGS-84 is about 110.574 km.
        let d = geodesic_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 110.574).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_one_degree_of_longitude_on_equator() {
        // Equatorial arc of one degree is a * pi / 180.
        let d = geodesic_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.319_49).abs() < 0.001, "got {d}");
    }

    #[test]
    fn test_symmetric() {
        let a = geodesic_km(-62.21, -58.42, -60.5, -55.0);
        let b = geodesic_km(-60.5, -55.0, -62.21, -58.42);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_close_to_haversine() {
        let ellipsoid = geodesic_km(-62.21, -58.42, -61.0, -56.0);
        let sphere = haversine_m(-62.21, -58.42, -61.0, -56.0) / 1000.0;
        // The two models differ by well under one percent at this range.
        assert!((ellipsoid - sphere).abs() / sphere < 0.01);
    }

    #[test]
    fn test_nearly_antipodal_is_finite() {
        let d = geodesic_km(0.0, 0.0, 0.5, 179.7);
        assert!(d > 19_000.0 && d < 20_100.0, "got {d}");
    }
}
