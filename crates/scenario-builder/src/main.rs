//! Constellation Scenario CLI
//!
//! Builds node-record scenario files from one of three inputs.
//!
//! Usage:
//!   build-scenarios seed --file seeds/leo.csv --output scenario.csv
//!   build-scenarios direct --constellation-type WALKER_DELTA --num-planes 4 \
//!                   --num-sats-per-plane 8 --semi-major-axis 550 --inclination 45 \
//!                   --output scenario.csv
//!   build-scenarios --seed 7 sweep --file sweeps/sources.json --output-dir out/

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use constellation_geometry::{
    ConstellationPattern, GeometryEngine, Orbit, SeedConstellation, ValidationPolicy,
};
use ground_stations::{seeded_rng, CoordinateMode};
use scenario_builder::{build_scenario, loader, sweep, writer, SeedFile};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "build-scenarios",
    about = "Generate constellation scenario records for the simulator"
)]
struct Args {
    /// Inclination checks applied to Walker patterns
    #[arg(long, value_enum, default_value_t = PolicyArg::Strict)]
    policy: PolicyArg,

    /// Seed for ground station placement
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Keep sampled coordinates at full precision instead of whole degrees
    #[arg(long)]
    full_precision: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Build one scenario from a seed file
    Seed {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "scenario.csv")]
        output: PathBuf,
    },
    /// Build one constellation from parameters given on the command line
    Direct {
        #[arg(long, default_value = "constellation")]
        name: String,

        #[arg(long, default_value = "Earth")]
        central_object: String,

        /// WALKER_STAR, WALKER_DELTA, EQUATORIAL (or FILL)
        #[arg(long = "constellation-type")]
        pattern: ConstellationPattern,

        #[arg(long)]
        num_planes: u32,

        #[arg(long)]
        num_sats_per_plane: u32,

        /// a, km
        #[arg(long, allow_negative_numbers = true)]
        semi_major_axis: f64,

        /// e
        #[arg(long, default_value_t = 0.0)]
        eccentricity: f64,

        /// i, degrees
        #[arg(long, allow_negative_numbers = true)]
        inclination: f64,

        /// RAAN, degrees
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        raan: f64,

        /// w, degrees
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        argument_of_perigee: f64,

        /// v, degrees
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        mean_anomaly: f64,

        /// Rules, separated by '|'
        #[arg(long, default_value = "")]
        rules: String,

        #[arg(short, long, default_value = "scenario.csv")]
        output: PathBuf,
    },
    /// Run a parameter sweep, one artifact per step
    Sweep {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short = 'd', long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Strict,
    Permissive,
}

impl From<PolicyArg> for ValidationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => ValidationPolicy::Strict,
            PolicyArg::Permissive => ValidationPolicy::Permissive,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let engine = GeometryEngine::new(args.policy.into());
    let mode = if args.full_precision {
        CoordinateMode::FullPrecision
    } else {
        CoordinateMode::Truncated
    };
    let mut rng = seeded_rng(args.seed);

    info!(
        "Policy {:?}, coordinates {:?}, rng seed {}",
        engine.policy(),
        mode,
        args.seed
    );

    match args.mode {
        Mode::Seed { file, output } => {
            let seed = loader::load_seed(&file)?;
            let scenario = build_scenario(seed, &engine, mode, &mut rng)?;
            writer::write_scenario(&output, &scenario)?;
        }
        Mode::Direct {
            name,
            central_object,
            pattern,
            num_planes,
            num_sats_per_plane,
            semi_major_axis,
            eccentricity,
            inclination,
            raan,
            argument_of_perigee,
            mean_anomaly,
            rules,
            output,
        } => {
            let seed = SeedFile {
                constellations: vec![SeedConstellation {
                    name,
                    central_body: central_object,
                    pattern,
                    plane_count: num_planes,
                    sats_per_plane: num_sats_per_plane,
                    rules: loader::parse_rules(&rules),
                    reference: Orbit::new(
                        semi_major_axis,
                        eccentricity,
                        inclination,
                        raan,
                        argument_of_perigee,
                        mean_anomaly,
                    ),
                }],
                ground_stations: vec![],
            };
            let scenario = build_scenario(seed, &engine, mode, &mut rng)?;
            writer::write_scenario(&output, &scenario)?;
        }
        Mode::Sweep { file, output_dir } => {
            let config = sweep::load_sweep_config(&file)?;
            let report = sweep::run_sweep(&config, &engine, mode, &mut rng, &output_dir)?;
            for path in &report.artifacts {
                info!("  {}", path.display());
            }
        }
    }

    info!("Done");

    Ok(())
}
