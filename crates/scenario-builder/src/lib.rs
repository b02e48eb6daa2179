//! Constellation Scenario Builder
//!
//! Turns seed definitions into node-record files for the downstream
//! simulator:
//!
//! ```text
//! seed file ──► loader ──► GeometryEngine ──► writer ──► <scenario>.csv
//!                   └────► station sampler ───┘
//! ```
//!
//! A sweep repeats this pipeline once per value of a swept source-node count,
//! writing one artifact per step.

use constellation_geometry::{Constellation, GeometryEngine, GeometryError, SeedConstellation};
use ground_stations::{CoordinateMode, GroundStationSet, StationError, StationGroup};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub mod loader;
pub mod sweep;
pub mod writer;

pub use sweep::{SweepConfig, SweepReport};

/// Separator between rules inside the single `rules` column
pub const RULE_SEPARATOR: char = '|';

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Station(#[from] StationError),
    #[error("Malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Sweep step {value} failed: {source}")]
    SweepStep {
        value: u32,
        #[source]
        source: Box<ScenarioError>,
    },
}

impl ScenarioError {
    /// True for every configuration failure, whichever layer raised it.
    pub fn is_invalid_configuration(&self) -> bool {
        match self {
            Self::InvalidConfiguration(_) => true,
            Self::Geometry(GeometryError::InvalidConfiguration(_)) => true,
            Self::Station(StationError::InvalidConfiguration(_)) => true,
            Self::SweepStep { source, .. } => source.is_invalid_configuration(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

/// Parsed seed: constellations to phase plus station groups to sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    pub constellations: Vec<SeedConstellation>,
    pub ground_stations: Vec<StationGroup>,
}

/// Everything that goes into one output artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub constellations: Vec<Constellation>,
    pub ground_stations: Vec<GroundStationSet>,
}

impl Scenario {
    pub fn satellite_count(&self) -> usize {
        self.constellations.iter().map(|c| c.len()).sum()
    }

    pub fn station_count(&self) -> usize {
        self.ground_stations.iter().map(|g| g.len()).sum()
    }
}

/// Phase every seed constellation, then sample every station group.
///
/// Constellations are generated first so a bad seed fails before any random
/// draws are consumed.
pub fn build_scenario<R: Rng>(
    seed: SeedFile,
    engine: &GeometryEngine,
    mode: CoordinateMode,
    rng: &mut R,
) -> Result<Scenario> {
    let constellations = seed
        .constellations
        .into_iter()
        .map(|s| engine.generate_constellation(s))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let ground_stations = seed
        .ground_stations
        .iter()
        .map(|g| g.sample_set(mode, rng))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let scenario = Scenario {
        constellations,
        ground_stations,
    };

    info!(
        "Built scenario: {} constellations, {} satellites, {} ground stations",
        scenario.constellations.len(),
        scenario.satellite_count(),
        scenario.station_count()
    );

    Ok(scenario)
}
