//! Geodesic distance and the proximity transform.
//!
//! Distances are computed on the WGS84 ellipsoid with Vincenty's inverse
//! formula, matching the ellipsoidal results the rest of the system was
//! tuned against; a spherical great-circle approximation is only used as a
//! fallback for the rare near-antipodal pair where Vincenty's iteration does
//! not converge.

use crate::domain::location::GeoPoint;

// WGS84 ellipsoid.
const SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;
const SEMI_MINOR_AXIS_M: f64 = (1.0 - FLATTENING) * SEMI_MAJOR_AXIS_M;

const MEAN_EARTH_RADIUS_KM: f64 = 6_371.008_8;

const CONVERGENCE_THRESHOLD: f64 = 1e-12;
const MAX_ITERATIONS: usize = 200;

/// Distance below which a doctor counts as "right here" and receives the
/// full proximity score.
const NEAR_FIELD_KM: f64 = 1.0;

/// Geodesic distance between two points in kilometers.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    vincenty_km(a, b).unwrap_or_else(|| haversine_km(a, b))
}

/// Proximity score in (0, 1]: the full 1.0 inside the near field (including
/// zero distance), hyperbolic `1/d` decay beyond it. Deliberately non-linear
/// so very-local matches dominate without a hard cutoff.
pub fn proximity_score(distance_km: f64) -> f64 {
    if distance_km < NEAR_FIELD_KM {
        1.0
    } else {
        1.0 / distance_km
    }
}

/// Vincenty's inverse formula on WGS84. `None` when the iteration fails to
/// converge (essentially antipodal points).
fn vincenty_km(a: GeoPoint, b: GeoPoint) -> Option<f64> {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let reduced_lat1 = ((1.0 - FLATTENING) * lat1.tan()).atan();
    let reduced_lat2 = ((1.0 - FLATTENING) * lat2.tan()).atan();
    let (sin_u1, cos_u1) = reduced_lat1.sin_cos();
    let (sin_u2, cos_u2) = reduced_lat2.sin_cos();

    let mut lambda = delta_lon;
    let mut sin_sigma;
    let mut cos_sigma;
    let mut sigma;
    let mut cos_sq_alpha;
    let mut cos_2sigma_m;

    let mut iterations = 0;
    loop {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points.
            return Some(0.0);
        }
        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        cos_2sigma_m = if cos_sq_alpha == 0.0 {
            // Equatorial line.
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };

        let c = FLATTENING / 16.0 * cos_sq_alpha * (4.0 + FLATTENING * (4.0 - 3.0 * cos_sq_alpha));
        let next_lambda = delta_lon
            + (1.0 - c)
                * FLATTENING
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        let delta = (next_lambda - lambda).abs();
        lambda = next_lambda;
        iterations += 1;
        if delta < CONVERGENCE_THRESHOLD {
            break;
        }
        if iterations >= MAX_ITERATIONS {
            return None;
        }
    }

    let u_sq = cos_sq_alpha
        * (SEMI_MAJOR_AXIS_M * SEMI_MAJOR_AXIS_M - SEMI_MINOR_AXIS_M * SEMI_MINOR_AXIS_M)
        / (SEMI_MINOR_AXIS_M * SEMI_MINOR_AXIS_M);
    let a_term = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b_term = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = b_term
        * sin_sigma
        * (cos_2sigma_m
            + b_term / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - b_term / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

    let meters = SEMI_MINOR_AXIS_M * a_term * (sigma - delta_sigma);
    Some(meters / 1000.0)
}

/// Spherical great-circle fallback.
fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    MEAN_EARTH_RADIUS_KM * c
}
