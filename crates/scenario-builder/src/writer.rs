//! Node-record output
//!
//! One data row per node, grouped under a `#<name>` comment per
//! constellation or ground station set:
//!
//! ```text
//! #node_type,node_name,node_id,central_object,...,rules
//! #starlink
//! SAT,c1o1,1001,Earth,550,0,45,0,0,0,isl|downlink
//! #gs
//! GS,gs1,1,Earth,12,-77,0,,,,
//! ```
//!
//! Satellite IDs are `(constellation + 1) * 1000 + (satellite + 1)`, so a
//! constellation holds at most 999 satellites before its IDs run into the
//! next constellation's block. Ground station IDs count up from 1 across
//! every set in the file.

use crate::{Result, Scenario, RULE_SEPARATOR};
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

pub const HEADER: &str = "#node_type,node_name,node_id,central_object,\
semi_major_axis_or_latitude,eccentricity_or_longitude,inclination_or_altitude,\
raan,argument_of_perigee,mean_anomaly,rules";

pub const SATELLITE_NODE: &str = "SAT";
pub const GROUND_STATION_NODE: &str = "GS";

/// Width of each constellation's node-ID block
pub const NODE_ID_BLOCK: u64 = 1000;

pub fn satellite_node_name(constellation_idx: usize, sat_idx: usize) -> String {
    format!("c{}o{}", constellation_idx + 1, sat_idx + 1)
}

pub fn satellite_node_id(constellation_idx: usize, sat_idx: usize) -> u64 {
    (constellation_idx as u64 + 1) * NODE_ID_BLOCK + sat_idx as u64 + 1
}

pub fn ground_station_node_name(station_idx: usize) -> String {
    format!("gs{}", station_idx + 1)
}

pub fn ground_station_node_id(station_idx: usize) -> u64 {
    station_idx as u64 + 1
}

/// One data row, all 11 columns.
type Record = [String; 11];

/// Write a `#<name>` group line followed by its data rows. Rows go through
/// the CSV writer so commas in names and rules are quoted.
fn write_group<W: Write>(out: &mut W, name: &str, rows: Vec<Record>) -> Result<()> {
    writeln!(out, "#{}", name)?;

    let mut records = WriterBuilder::new()
        .has_headers(false)
        .from_writer(&mut *out);
    for row in &rows {
        records.write_record(row)?;
    }
    records.flush()?;

    Ok(())
}

/// Write all records of `scenario` to `out`.
pub fn write_records<W: Write>(out: &mut W, scenario: &Scenario) -> Result<()> {
    writeln!(out, "{}", HEADER)?;

    for (c_idx, constellation) in scenario.constellations.iter().enumerate() {
        if constellation.len() as u64 >= NODE_ID_BLOCK {
            warn!(
                "Constellation {} has {} satellites; node IDs overlap the next block",
                constellation.name,
                constellation.len()
            );
        }

        let rules = constellation.rules.join(&RULE_SEPARATOR.to_string());
        let rows = constellation
            .orbits
            .iter()
            .enumerate()
            .map(|(s_idx, orbit)| {
                [
                    SATELLITE_NODE.to_string(),
                    satellite_node_name(c_idx, s_idx),
                    satellite_node_id(c_idx, s_idx).to_string(),
                    constellation.central_body.clone(),
                    orbit.semi_major_axis.to_string(),
                    orbit.eccentricity.to_string(),
                    orbit.inclination.to_string(),
                    orbit.raan.to_string(),
                    orbit.argument_of_perigee.to_string(),
                    orbit.mean_anomaly.to_string(),
                    rules.clone(),
                ]
            })
            .collect();
        write_group(out, &constellation.name, rows)?;
    }

    let mut gs_idx = 0;
    for set in &scenario.ground_stations {
        let mut rows = Vec::with_capacity(set.stations.len());
        for station in &set.stations {
            rows.push([
                GROUND_STATION_NODE.to_string(),
                ground_station_node_name(gs_idx),
                ground_station_node_id(gs_idx).to_string(),
                set.central_body.clone(),
                station.latitude.to_string(),
                station.longitude.to_string(),
                station.altitude.to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ]);
            gs_idx += 1;
        }
        write_group(out, &set.name, rows)?;
    }

    Ok(())
}

/// Render a scenario to a string
pub fn render(scenario: &Scenario) -> Result<String> {
    let mut buf = Vec::new();
    write_records(&mut buf, scenario)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a scenario artifact to disk
pub fn write_scenario(path: impl AsRef<Path>, scenario: &Scenario) -> Result<()> {
    let path = path.as_ref();
    info!(
        "Writing {} nodes to {:?}",
        scenario.satellite_count() + scenario.station_count(),
        path
    );

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_records(&mut writer, scenario)?;
    writer.flush()?;

    Ok(())
}
