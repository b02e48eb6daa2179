//! Scenario sweeps
//!
//! A sweep varies the total source-node count over `start..=end` in fixed
//! steps. Each step derives satellites-per-plane for every constellation
//! template, phases them, attaches the same ground station set, and becomes
//! one artifact named `<prefix>_<value>.csv`.
//!
//! All steps are built before anything is written; the first failing step
//! aborts the sweep.

use crate::{writer, Result, Scenario, ScenarioError};
use constellation_geometry::{
    Constellation, ConstellationPattern, GeometryEngine, Orbit, SeedConstellation,
};
use ground_stations::{CoordinateMode, GroundStationSet, StationGroup};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn default_prefix() -> String {
    "scenario".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_prefix")]
    pub output_prefix: String,
    pub sweep: SweepRange,
    pub constellations: Vec<ConstellationTemplate>,
    #[serde(default)]
    pub ground_stations: Option<FixedStations>,
}

/// Inclusive range of swept values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: u32,
    pub end: u32,
    pub step: u32,
}

impl SweepRange {
    pub fn values(&self) -> Result<Vec<u32>> {
        if self.step == 0 {
            return Err(ScenarioError::InvalidConfiguration(
                "sweep step must be positive".to_string(),
            ));
        }
        if self.start > self.end {
            return Err(ScenarioError::InvalidConfiguration(format!(
                "sweep start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok((self.start..=self.end).step_by(self.step as usize).collect())
    }
}

/// How a template's satellites-per-plane follows the swept total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatsPerPlane {
    /// `total / planes`
    PerPlaneShare,
    /// `1 + (total - 1) / bucket`: one satellite per started bucket of sources
    Bucketed(u32),
    Fixed(u32),
}

impl SatsPerPlane {
    pub fn derive(&self, total: u32, planes: u32) -> Result<u32> {
        match *self {
            Self::PerPlaneShare => {
                if planes == 0 {
                    return Err(ScenarioError::InvalidConfiguration(
                        "per-plane share needs at least one plane".to_string(),
                    ));
                }
                Ok(total / planes)
            }
            Self::Bucketed(bucket) => {
                if bucket == 0 {
                    return Err(ScenarioError::InvalidConfiguration(
                        "bucket size must be positive".to_string(),
                    ));
                }
                Ok(if total == 0 { 0 } else { 1 + (total - 1) / bucket })
            }
            Self::Fixed(n) => Ok(n),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstellationTemplate {
    pub name: String,
    pub central_body: String,
    pub pattern: ConstellationPattern,
    pub planes: u32,
    pub sats_per_plane: SatsPerPlane,
    #[serde(default)]
    pub rules: Vec<String>,
    pub orbit: Orbit,
}

impl ConstellationTemplate {
    pub fn instantiate(&self, total: u32) -> Result<SeedConstellation> {
        Ok(SeedConstellation {
            name: self.name.clone(),
            central_body: self.central_body.clone(),
            pattern: self.pattern,
            plane_count: self.planes,
            sats_per_plane: self.sats_per_plane.derive(total, self.planes)?,
            rules: self.rules.clone(),
            reference: self.orbit,
        })
    }
}

/// The ground stations shared by every step: listed explicitly, or sampled
/// once before the first step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixedStations {
    Listed(GroundStationSet),
    Sampled(StationGroup),
}

impl FixedStations {
    pub fn resolve<R: Rng>(&self, mode: CoordinateMode, rng: &mut R) -> Result<GroundStationSet> {
        match self {
            Self::Listed(set) => Ok(set.clone()),
            Self::Sampled(group) => Ok(group.sample_set(mode, rng)?),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepStep {
    pub value: u32,
    pub scenario: Scenario,
}

#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub artifacts: Vec<PathBuf>,
    pub satellites: usize,
}

pub fn artifact_name(prefix: &str, value: u32) -> String {
    format!("{}_{}.csv", prefix, value)
}

pub fn load_sweep_config(path: impl AsRef<Path>) -> Result<SweepConfig> {
    let path = path.as_ref();
    info!("Loading sweep definition from {:?}", path);

    let file = File::open(path)?;
    let config: SweepConfig = serde_json::from_reader(BufReader::new(file))?;
    Ok(config)
}

fn build_step(
    config: &SweepConfig,
    value: u32,
    engine: &GeometryEngine,
    stations: &Option<GroundStationSet>,
) -> Result<Scenario> {
    let constellations = config
        .constellations
        .iter()
        .map(|t| -> Result<Constellation> {
            let seed = t.instantiate(value)?;
            debug!(
                "Step {}: {} -> {} x {}",
                value, seed.name, seed.plane_count, seed.sats_per_plane
            );
            Ok(engine.generate_constellation(seed)?)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Scenario {
        constellations,
        ground_stations: stations.iter().cloned().collect(),
    })
}

/// Build every step in memory.
pub fn plan_sweep<R: Rng>(
    config: &SweepConfig,
    engine: &GeometryEngine,
    mode: CoordinateMode,
    rng: &mut R,
) -> Result<Vec<SweepStep>> {
    if config.constellations.is_empty() {
        return Err(ScenarioError::InvalidConfiguration(
            "sweep defines no constellations".to_string(),
        ));
    }

    let values = config.sweep.values()?;
    let stations = config
        .ground_stations
        .as_ref()
        .map(|s| s.resolve(mode, rng))
        .transpose()?;

    info!(
        "Sweeping {} steps ({}..={} by {})",
        values.len(),
        config.sweep.start,
        config.sweep.end,
        config.sweep.step
    );

    values
        .into_iter()
        .map(|value| {
            build_step(config, value, engine, &stations)
                .map(|scenario| SweepStep { value, scenario })
                .map_err(|e| ScenarioError::SweepStep {
                    value,
                    source: Box::new(e),
                })
        })
        .collect()
}

/// Build every step, then write one artifact per step into `output_dir`.
pub fn run_sweep<R: Rng>(
    config: &SweepConfig,
    engine: &GeometryEngine,
    mode: CoordinateMode,
    rng: &mut R,
    output_dir: impl AsRef<Path>,
) -> Result<SweepReport> {
    let output_dir = output_dir.as_ref();
    let steps = plan_sweep(config, engine, mode, rng)?;

    fs::create_dir_all(output_dir)?;

    let mut report = SweepReport::default();
    for step in &steps {
        let path = output_dir.join(artifact_name(&config.output_prefix, step.value));
        writer::write_scenario(&path, &step.scenario)?;
        report.satellites += step.scenario.satellite_count();
        report.artifacts.push(path);
    }

    info!(
        "Sweep complete: {} artifacts, {} satellites total",
        report.artifacts.len(),
        report.satellites
    );

    Ok(report)
}
