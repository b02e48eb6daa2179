//! Ground Stations Library
//!
//! Ground station records for constellation scenarios, plus a seeded sampler
//! that scatters stations over a geographic box.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod sampler;

pub use sampler::{sample, CoordinateMode, GeoBounds};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, StationError>;

/// Random source used for station placement. ChaCha keeps the stream stable
/// across platforms and crate releases, so scenario files reproduce exactly.
pub type StationRng = ChaCha8Rng;

pub fn seeded_rng(seed: u64) -> StationRng {
    ChaCha8Rng::seed_from_u64(seed)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundStation {
    /// Degrees, -90..=90
    pub latitude: f64,
    /// Degrees, -180..=180
    pub longitude: f64,
    /// km
    pub altitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundStationSet {
    pub name: String,
    pub central_body: String,
    pub stations: Vec<GroundStation>,
}

impl GroundStationSet {
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// A request for `count` randomly placed stations at a common altitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationGroup {
    pub name: String,
    pub central_body: String,
    pub altitude: f64,
    pub count: u32,
}

impl StationGroup {
    /// Sample this group over the whole globe.
    pub fn sample_set<R: rand::Rng>(
        &self,
        mode: CoordinateMode,
        rng: &mut R,
    ) -> Result<GroundStationSet> {
        let stations = sample(self.count, self.altitude, &GeoBounds::default(), mode, rng)?;
        Ok(GroundStationSet {
            name: self.name.clone(),
            central_body: self.central_body.clone(),
            stations,
        })
    }
}
