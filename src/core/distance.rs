use crate::domain::model::Coordinates;
use crate::utils::error::{GroundPlacesError, Result};

/// Maximum distance between a StopGroup and any of its StopCluster parents,
/// and between two StopGroup exchanging SegmentProviderStop.
pub const MAX_DISTANCE_KM: f64 = 70.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers (haversine), rounded to two decimals.
pub fn distance_km(first: Coordinates, second: Coordinates) -> f64 {
    let lat1 = first.latitude.to_radians();
    let lat2 = second.latitude.to_radians();
    let d_lat = (second.latitude - first.latitude).to_radians();
    let d_long = (second.longitude - first.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_long / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to_hundredth(EARTH_RADIUS_KM * c)
}

fn round_to_hundredth(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fails with `DistanceExceeded` when the rounded distance is above the limit.
pub fn ensure_within_limit(
    from_id: &str,
    from: Coordinates,
    to_id: &str,
    to: Coordinates,
) -> Result<f64> {
    let distance = distance_km(from, to);
    // NaN never satisfies the bound
    if !(distance <= MAX_DISTANCE_KM) {
        tracing::debug!(
            "Distance check failed: {} -> {} = {}km (limit {}km)",
            from_id,
            to_id,
            distance,
            MAX_DISTANCE_KM
        );
        return Err(GroundPlacesError::DistanceExceeded {
            from: from_id.to_string(),
            to: to_id.to_string(),
            distance,
            limit: MAX_DISTANCE_KM,
        });
    }
    Ok(distance)
}
