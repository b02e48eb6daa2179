//! Constellation pattern rules
//!
//! Each pattern fixes how planes are spread in RAAN and which reference
//! orbits it accepts. Satellites within a plane are always phased evenly in
//! mean anomaly.
//!
//! | Pattern      | RAAN spread | Strict inclination | Planes |
//! |--------------|-------------|--------------------|--------|
//! | WALKER_STAR  | 180°        | 90°                | any    |
//! | WALKER_DELTA | 360°        | 45°                | any    |
//! | EQUATORIAL   | none        | -                  | 1      |

use crate::{normalize_degrees, GeometryError, Orbit, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclinations are compared against the required value within this margin
const INCLINATION_TOLERANCE_DEG: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstellationPattern {
    WalkerStar,
    WalkerDelta,
    /// Single plane, no RAAN spacing. Older seeds call this `FILL`.
    #[serde(alias = "FILL")]
    Equatorial,
}

impl ConstellationPattern {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WalkerStar => "WALKER_STAR",
            Self::WalkerDelta => "WALKER_DELTA",
            Self::Equatorial => "EQUATORIAL",
        }
    }

    /// Total RAAN arc the planes are spread over, if any
    pub fn raan_spread_deg(&self) -> Option<f64> {
        match self {
            Self::WalkerStar => Some(180.0),
            Self::WalkerDelta => Some(360.0),
            Self::Equatorial => None,
        }
    }

    /// Reference inclination demanded under the strict policy
    pub fn required_inclination_deg(&self) -> Option<f64> {
        match self {
            Self::WalkerStar => Some(90.0),
            Self::WalkerDelta => Some(45.0),
            Self::Equatorial => None,
        }
    }
}

impl fmt::Display for ConstellationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConstellationPattern {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WALKER_STAR" => Ok(Self::WalkerStar),
            "WALKER_DELTA" => Ok(Self::WalkerDelta),
            "EQUATORIAL" | "FILL" => Ok(Self::Equatorial),
            _ => Err(GeometryError::UnknownPattern(s.to_string())),
        }
    }
}

/// How strictly reference inclinations are checked against the pattern.
///
/// `Permissive` drops the inclination checks only. The single-plane rule for
/// equatorial constellations and the positive-count rule always apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    #[default]
    Strict,
    Permissive,
}

/// A pattern resolved against one reference orbit and plane/satellite counts.
///
/// Built once per constellation; `phase` is then a plain arithmetic step for
/// each satellite.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pattern: ConstellationPattern,
    reference: Orbit,
    raan_step_deg: f64,
    mean_anomaly_step_deg: f64,
}

impl PatternRule {
    pub fn resolve(
        pattern: ConstellationPattern,
        reference: &Orbit,
        plane_count: u32,
        sats_per_plane: u32,
        policy: ValidationPolicy,
    ) -> Result<Self> {
        if plane_count == 0 {
            return Err(GeometryError::InvalidConfiguration(
                "plane count must be at least 1".to_string(),
            ));
        }
        if sats_per_plane == 0 {
            return Err(GeometryError::InvalidConfiguration(
                "satellites per plane must be at least 1".to_string(),
            ));
        }
        if pattern == ConstellationPattern::Equatorial && plane_count != 1 {
            return Err(GeometryError::InvalidConfiguration(format!(
                "{} constellation must have a single plane, got {}",
                pattern, plane_count
            )));
        }

        if policy == ValidationPolicy::Strict {
            if let Some(required) = pattern.required_inclination_deg() {
                if (reference.inclination - required).abs() > INCLINATION_TOLERANCE_DEG {
                    return Err(GeometryError::InvalidConfiguration(format!(
                        "{} requires inclination {}°, got {}°",
                        pattern, required, reference.inclination
                    )));
                }
            }
        }

        let raan_step_deg = pattern
            .raan_spread_deg()
            .map(|spread| spread / plane_count as f64)
            .unwrap_or(0.0);

        Ok(Self {
            pattern,
            reference: *reference,
            raan_step_deg,
            mean_anomaly_step_deg: 360.0 / sats_per_plane as f64,
        })
    }

    pub fn pattern(&self) -> ConstellationPattern {
        self.pattern
    }

    pub fn raan_step_deg(&self) -> f64 {
        self.raan_step_deg
    }

    pub fn mean_anomaly_step_deg(&self) -> f64 {
        self.mean_anomaly_step_deg
    }

    /// Orbit of satellite `sat_idx` in plane `plane_idx`.
    pub fn phase(&self, plane_idx: u32, sat_idx: u32) -> Orbit {
        let mut orbit = self.reference;
        orbit.raan = normalize_degrees(plane_idx as f64 * self.raan_step_deg + self.reference.raan);
        orbit.mean_anomaly = normalize_degrees(
            sat_idx as f64 * self.mean_anomaly_step_deg + self.reference.mean_anomaly,
        );
        orbit
    }
}
