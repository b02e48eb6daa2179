//! Seeded ground station placement

use crate::{GroundStation, Result, StationError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validate latitude is in valid range
fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && lat.is_finite()
}

/// Validate longitude is in valid range
fn is_valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon) && lon.is_finite()
}

/// Closed latitude/longitude box stations are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self {
            min_latitude: -90.0,
            max_latitude: 90.0,
            min_longitude: -180.0,
            max_longitude: 180.0,
        }
    }
}

impl GeoBounds {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_latitude(self.min_latitude) || !is_valid_latitude(self.max_latitude) {
            return Err(StationError::InvalidConfiguration(format!(
                "latitude bounds [{}, {}] outside [-90, 90]",
                self.min_latitude, self.max_latitude
            )));
        }
        if !is_valid_longitude(self.min_longitude) || !is_valid_longitude(self.max_longitude) {
            return Err(StationError::InvalidConfiguration(format!(
                "longitude bounds [{}, {}] outside [-180, 180]",
                self.min_longitude, self.max_longitude
            )));
        }
        if self.min_latitude > self.max_latitude || self.min_longitude > self.max_longitude {
            return Err(StationError::InvalidConfiguration(
                "bounds minimum exceeds maximum".to_string(),
            ));
        }
        Ok(())
    }

    pub fn contains(&self, station: &GroundStation) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&station.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&station.longitude)
    }
}

/// Precision of sampled coordinates.
///
/// `Truncated` cuts each draw toward zero to a whole degree. Scenario files
/// produced before full precision existed were written this way, so it stays
/// the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateMode {
    #[default]
    Truncated,
    FullPrecision,
}

impl CoordinateMode {
    fn apply(&self, value: f64) -> f64 {
        match self {
            // + 0.0 folds -0.0 into 0.0
            Self::Truncated => value.trunc() + 0.0,
            Self::FullPrecision => value,
        }
    }
}

/// Draw `count` stations uniformly inside `bounds`.
///
/// Each station consumes two draws from `rng`, latitude first. The same seed
/// and call sequence give the same stations bit for bit.
pub fn sample<R: Rng>(
    count: u32,
    altitude_km: f64,
    bounds: &GeoBounds,
    mode: CoordinateMode,
    rng: &mut R,
) -> Result<Vec<GroundStation>> {
    bounds.validate()?;

    let stations: Vec<GroundStation> = (0..count)
        .map(|_| {
            let latitude = rng.gen_range(bounds.min_latitude..=bounds.max_latitude);
            let longitude = rng.gen_range(bounds.min_longitude..=bounds.max_longitude);
            GroundStation {
                latitude: mode.apply(latitude),
                longitude: mode.apply(longitude),
                altitude: altitude_km,
            }
        })
        .collect();

    debug!("Sampled {} ground stations ({:?})", stations.len(), mode);

    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;

    fn sample_globe(count: u32, mode: CoordinateMode, seed: u64) -> Vec<GroundStation> {
        sample(count, 0.0, &GeoBounds::default(), mode, &mut seeded_rng(seed)).unwrap()
    }

    #[test]
    fn test_same_seed_reproduces_stations() {
        let a = sample_globe(50, CoordinateMode::FullPrecision, 42);
        let b = sample_globe(50, CoordinateMode::FullPrecision, 42);
        assert_eq!(a, b);

        let c = sample_globe(50, CoordinateMode::FullPrecision, 43);
        assert_ne!(a, c);
    }

    #[test]
    fn test_samples_within_globe() {
        let bounds = GeoBounds::default();
        let mut rng = seeded_rng(7);
        for mode in [CoordinateMode::Truncated, CoordinateMode::FullPrecision] {
            let stations = sample(500, 0.2, &bounds, mode, &mut rng).unwrap();
            assert_eq!(stations.len(), 500);
            for s in &stations {
                assert!((-90.0..=90.0).contains(&s.latitude));
                assert!((-180.0..=180.0).contains(&s.longitude));
                assert_eq!(s.altitude, 0.2);
            }
        }
    }

    #[test]
    fn test_truncated_coordinates_are_whole_degrees() {
        let stations = sample(
            100,
            0.0,
            &GeoBounds::default(),
            CoordinateMode::Truncated,
            &mut seeded_rng(1),
        )
        .unwrap();
        assert!(stations
            .iter()
            .all(|s| s.latitude.fract() == 0.0 && s.longitude.fract() == 0.0));
    }

    #[test]
    fn test_truncation_matches_full_precision_stream() {
        let full = sample_globe(30, CoordinateMode::FullPrecision, 5);
        let cut = sample_globe(30, CoordinateMode::Truncated, 5);
        for (f, c) in full.iter().zip(&cut) {
            assert_eq!(f.latitude.trunc(), c.latitude);
            assert_eq!(f.longitude.trunc(), c.longitude);
        }
    }

    #[test]
    fn test_restricted_bounds() {
        let bounds = GeoBounds {
            min_latitude: 30.0,
            max_latitude: 60.0,
            min_longitude: -10.0,
            max_longitude: 40.0,
        };
        let stations =
            sample(200, 0.0, &bounds, CoordinateMode::FullPrecision, &mut seeded_rng(11)).unwrap();
        assert!(stations.iter().all(|s| bounds.contains(s)));
    }

    #[test]
    fn test_zero_count_is_empty() {
        let stations = sample(
            0,
            0.0,
            &GeoBounds::default(),
            CoordinateMode::Truncated,
            &mut seeded_rng(0),
        )
        .unwrap();
        assert!(stations.is_empty());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let inverted = GeoBounds {
            min_latitude: 10.0,
            max_latitude: -10.0,
            ..GeoBounds::default()
        };
        assert!(inverted.validate().is_err());

        let outside = GeoBounds {
            max_longitude: 200.0,
            ..GeoBounds::default()
        };
        let result = sample(1, 0.0, &outside, CoordinateMode::Truncated, &mut seeded_rng(0));
        assert!(matches!(result, Err(StationError::InvalidConfiguration(_))));
    }
}
