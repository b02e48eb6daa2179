//! Constellation Geometry Library
//!
//! Derives the classical orbital elements of every satellite in a multi-plane
//! constellation from a single seed orbit and a geometric pattern
//! (Walker Star, Walker Delta, Equatorial).
//!
//! Elements are produced at epoch only. Nothing here propagates orbits or
//! converts between frames.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod engine;
pub mod pattern;

pub use engine::{generate, GeometryEngine};
pub use pattern::{ConstellationPattern, PatternRule, ValidationPolicy};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Unknown constellation type: {0}")]
    UnknownPattern(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// Classical orbital elements at epoch. Angles in degrees, axis in km.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    /// Semi-major axis (or altitude, depending on the consumer) in km
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    /// Right ascension of the ascending node
    pub raan: f64,
    pub argument_of_perigee: f64,
    pub mean_anomaly: f64,
}

impl Orbit {
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        raan: f64,
        argument_of_perigee: f64,
        mean_anomaly: f64,
    ) -> Self {
        Self {
            semi_major_axis,
            eccentricity,
            inclination,
            raan,
            argument_of_perigee,
            mean_anomaly,
        }
    }

    /// Check the element ranges a seed orbit must satisfy.
    ///
    /// RAAN, argument of perigee and mean anomaly wrap, so only finiteness is
    /// checked for them.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("semi_major_axis", self.semi_major_axis),
            ("eccentricity", self.eccentricity),
            ("inclination", self.inclination),
            ("raan", self.raan),
            ("argument_of_perigee", self.argument_of_perigee),
            ("mean_anomaly", self.mean_anomaly),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(GeometryError::InvalidConfiguration(format!(
                "{} must be finite",
                name
            )));
        }

        if self.semi_major_axis <= 0.0 {
            return Err(GeometryError::InvalidConfiguration(format!(
                "semi_major_axis must be positive, got {}",
                self.semi_major_axis
            )));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(GeometryError::InvalidConfiguration(format!(
                "eccentricity must be in [0, 1), got {}",
                self.eccentricity
            )));
        }
        if !(0.0..=180.0).contains(&self.inclination) {
            return Err(GeometryError::InvalidConfiguration(format!(
                "inclination must be in [0, 180] degrees, got {}",
                self.inclination
            )));
        }
        Ok(())
    }
}

/// Wrap an angle into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// A constellation definition as read from a seed: one reference orbit plus
/// the pattern and counts used to phase it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConstellation {
    pub name: String,
    pub central_body: String,
    pub pattern: ConstellationPattern,
    pub plane_count: u32,
    pub sats_per_plane: u32,
    /// Free-form annotations, passed through to the output untouched
    pub rules: Vec<String>,
    pub reference: Orbit,
}

impl SeedConstellation {
    pub fn total_satellites(&self) -> u64 {
        self.plane_count as u64 * self.sats_per_plane as u64
    }
}

/// A fully phased constellation. Orbits are ordered plane-major,
/// satellite-minor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constellation {
    pub name: String,
    pub central_body: String,
    pub rules: Vec<String>,
    pub orbits: Vec<Orbit>,
}

impl Constellation {
    pub fn len(&self) -> usize {
        self.orbits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(450.0), 90.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
    }

    #[test]
    fn test_validate_accepts_circular_leo() {
        let orbit = Orbit::new(500.0, 0.0, 53.0, 0.0, 0.0, 0.0);
        assert!(orbit.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_elements() {
        assert!(Orbit::new(0.0, 0.0, 45.0, 0.0, 0.0, 0.0).validate().is_err());
        assert!(Orbit::new(500.0, 1.0, 45.0, 0.0, 0.0, 0.0).validate().is_err());
        assert!(Orbit::new(500.0, -0.1, 45.0, 0.0, 0.0, 0.0).validate().is_err());
        assert!(Orbit::new(500.0, 0.0, 181.0, 0.0, 0.0, 0.0).validate().is_err());
        assert!(Orbit::new(500.0, 0.0, 45.0, f64::NAN, 0.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_wrapping_angles_are_not_range_checked() {
        let orbit = Orbit::new(500.0, 0.0, 45.0, 725.0, -30.0, 400.0);
        assert!(orbit.validate().is_ok());
    }
}
