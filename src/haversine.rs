//! Haversine travel-time provider (fallback when OSRM is unavailable).
//!
//! Uses great-circle distance to estimate travel time.
//! Less accurate than OSRM (ignores roads) but always available.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matrix::TravelTimeMatrix;
use crate::traits::TravelTimeProvider;

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based travel-time provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HaversineMatrix {
    /// Assumed average speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Convert distance in km to travel time in seconds.
    fn km_to_seconds(&self, km: f64) -> f64 {
        (km / self.speed_kmh * 3600.0).round()
    }
}

/// Great-circle distance between two (lat, lng) points in kilometers.
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

impl TravelTimeProvider for HaversineMatrix {
    fn durations_for(&self, locations: &[(f64, f64)]) -> Result<TravelTimeMatrix> {
        let rows = locations
            .iter()
            .enumerate()
            .map(|(i, from)| {
                locations
                    .iter()
                    .enumerate()
                    .map(|(j, to)| if i == j { 0.0 } else { self.km_to_seconds(distance_km(*from, *to)) })
                    .collect()
            })
            .collect();

        TravelTimeMatrix::from_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let dist = distance_km((38.7223, -9.1393), (38.7223, -9.1393));
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Lisbon (38.72, -9.14) to Madrid (40.42, -3.70), roughly 500 km
        let dist = distance_km((38.7223, -9.1393), (40.4168, -3.7038));
        assert!(dist > 480.0 && dist < 520.0, "Lisbon to Madrid should be ~500km, got {}", dist);
    }

    #[test]
    fn test_matrix_diagonal_is_zero() {
        let provider = HaversineMatrix::default();
        let locations = vec![(38.71, -9.13), (38.69, -9.21), (38.80, -9.38)];
        let matrix = provider.durations_for(&locations).unwrap();

        for i in 0..locations.len() {
            assert_eq!(matrix.seconds(i, i), Some(0.0), "Diagonal should be zero");
        }
    }

    #[test]
    fn test_matrix_symmetric() {
        let provider = HaversineMatrix::default();
        let matrix = provider.durations_for(&[(38.71, -9.13), (38.69, -9.21)]).unwrap();
        assert_eq!(matrix.seconds(0, 1), matrix.seconds(1, 0));
    }

    #[test]
    fn test_reasonable_travel_time() {
        let provider = HaversineMatrix::new(40.0);
        // 10 km at 40 km/h = 15 minutes
        assert_eq!(provider.km_to_seconds(10.0), 900.0);
    }
}
