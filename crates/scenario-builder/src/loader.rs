//! Seed file loading
//!
//! Two comma-separated sections divided by a blank line:
//!
//! ```text
//! name,central_object,rules,constellation_type,num_planes,num_sats_per_plane,a,e,i,raan,w,v
//! starlink,Earth,isl|downlink,WALKER_DELTA,4,8,550,0,45,0,0,0
//!
//! name,central_object,altitude,num_gs
//! gs,Earth,0,12
//! ```
//!
//! Each section may open with a header row (`name,central_object,...`).
//! Lines starting with `#` are comments. Fields follow normal CSV quoting,
//! so names may contain commas. The second section is optional.

use crate::{Result, ScenarioError, SeedFile, RULE_SEPARATOR};
use constellation_geometry::{ConstellationPattern, Orbit, SeedConstellation};
use csv::{ReaderBuilder, StringRecord, Trim};
use ground_stations::StationGroup;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

const CONSTELLATION_FIELDS: usize = 12;
const STATION_FIELDS: usize = 4;

fn malformed(line: usize, reason: impl Into<String>) -> ScenarioError {
    ScenarioError::MalformedInput {
        line,
        reason: reason.into(),
    }
}

fn parse_field<T: FromStr>(value: &str, name: &str, line: usize) -> Result<T> {
    value
        .parse()
        .map_err(|_| malformed(line, format!("cannot parse {} from {:?}", name, value)))
}

/// Counts are read signed so a negative count is reported as a bad
/// configuration rather than a parse failure.
fn parse_count(value: &str, name: &str, line: usize) -> Result<u32> {
    let raw: i64 = parse_field(value, name, line)?;
    if raw < 0 {
        return Err(ScenarioError::InvalidConfiguration(format!(
            "line {}: {} must not be negative, got {}",
            line, name, raw
        )));
    }
    u32::try_from(raw).map_err(|_| {
        ScenarioError::InvalidConfiguration(format!("line {}: {} too large: {}", line, name, raw))
    })
}

pub fn parse_rules(raw: &str) -> Vec<String> {
    raw.split(RULE_SEPARATOR)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lines of one seed section, with the file line number of each.
#[derive(Debug, Default)]
struct Section<'a> {
    lines: Vec<&'a str>,
    line_numbers: Vec<usize>,
}

impl<'a> Section<'a> {
    fn push(&mut self, line: usize, text: &'a str) {
        self.lines.push(text);
        self.line_numbers.push(line);
    }

    /// File line of the record that starts on `section_line` (1-based).
    fn file_line(&self, section_line: u64) -> usize {
        let idx = (section_line as usize).saturating_sub(1);
        self.line_numbers.get(idx).copied().unwrap_or(0)
    }

    /// Read the section as CSV, skipping a leading header row.
    fn records(&self) -> Result<Vec<(usize, StringRecord)>> {
        let text = self.lines.join("\n");
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let mut records = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                let line = e.position().map(|p| self.file_line(p.line())).unwrap_or(0);
                malformed(line, e.to_string())
            })?;
            let line = record
                .position()
                .map(|p| self.file_line(p.line()))
                .unwrap_or(0);
            if i == 0 && is_header(&record) {
                continue;
            }
            records.push((line, record));
        }
        Ok(records)
    }
}

/// Header rows name the first two columns; a constellation called `name`
/// is still read as data.
fn is_header(record: &StringRecord) -> bool {
    record.get(0).is_some_and(|f| f.eq_ignore_ascii_case("name"))
        && record
            .get(1)
            .is_some_and(|f| f.eq_ignore_ascii_case("central_object"))
}

/// Split seed text at the first blank line that follows constellation rows.
/// Comment lines are dropped here; blank lines inside a section are ignored.
fn split_sections(text: &str) -> (Section<'_>, Section<'_>) {
    let mut constellations = Section::default();
    let mut stations = Section::default();
    let mut in_stations = false;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let row = raw.trim();

        if row.is_empty() {
            if !constellations.lines.is_empty() {
                in_stations = true;
            }
            continue;
        }
        if row.starts_with('#') {
            continue;
        }

        if in_stations {
            stations.push(line, row);
        } else {
            constellations.push(line, row);
        }
    }

    (constellations, stations)
}

fn check_width(record: &StringRecord, expected: usize, line: usize) -> Result<()> {
    if record.len() != expected {
        return Err(malformed(
            line,
            format!("expected {} fields, found {}", expected, record.len()),
        ));
    }
    Ok(())
}

fn parse_constellation(record: &StringRecord, line: usize) -> Result<SeedConstellation> {
    check_width(record, CONSTELLATION_FIELDS, line)?;
    let f = |i: usize| &record[i];

    if f(0).is_empty() {
        return Err(malformed(line, "missing constellation name"));
    }
    if f(1).is_empty() {
        return Err(malformed(line, "missing central_object"));
    }

    let pattern = ConstellationPattern::from_str(f(3))
        .map_err(|_| malformed(line, format!("unknown constellation_type {:?}", f(3))))?;

    let reference = Orbit::new(
        parse_field(f(6), "semi_major_axis", line)?,
        parse_field(f(7), "eccentricity", line)?,
        parse_field(f(8), "inclination", line)?,
        parse_field(f(9), "raan", line)?,
        parse_field(f(10), "argument_of_perigee", line)?,
        parse_field(f(11), "mean_anomaly", line)?,
    );

    Ok(SeedConstellation {
        name: f(0).to_string(),
        central_body: f(1).to_string(),
        pattern,
        plane_count: parse_count(f(4), "num_planes", line)?,
        sats_per_plane: parse_count(f(5), "num_sats_per_plane", line)?,
        rules: parse_rules(f(2)),
        reference,
    })
}

fn parse_station_group(record: &StringRecord, line: usize) -> Result<StationGroup> {
    check_width(record, STATION_FIELDS, line)?;

    if record[0].is_empty() {
        return Err(malformed(line, "missing ground station group name"));
    }
    if record[1].is_empty() {
        return Err(malformed(line, "missing central_object"));
    }

    Ok(StationGroup {
        name: record[0].to_string(),
        central_body: record[1].to_string(),
        altitude: parse_field(&record[2], "altitude", line)?,
        count: parse_count(&record[3], "num_gs", line)?,
    })
}

/// Parse seed text. Line numbers in errors are 1-based.
pub fn parse_seed(text: &str) -> Result<SeedFile> {
    let (constellation_rows, station_rows) = split_sections(text);
    let mut seed = SeedFile::default();

    for (line, record) in constellation_rows.records()? {
        let constellation = parse_constellation(&record, line)?;
        debug!(
            "Line {}: {} ({} x {} {})",
            line,
            constellation.name,
            constellation.plane_count,
            constellation.sats_per_plane,
            constellation.pattern
        );
        seed.constellations.push(constellation);
    }

    for (line, record) in station_rows.records()? {
        seed.ground_stations.push(parse_station_group(&record, line)?);
    }

    if seed.constellations.is_empty() {
        return Err(malformed(0, "seed contains no constellation rows"));
    }

    Ok(seed)
}

/// Load a seed file from disk
pub fn load_seed(path: impl AsRef<Path>) -> Result<SeedFile> {
    let path = path.as_ref();
    info!("Loading seed from {:?}", path);

    let text = fs::read_to_string(path)?;
    let seed = parse_seed(&text)?;

    info!(
        "Loaded {} constellations, {} ground station groups",
        seed.constellations.len(),
        seed.ground_stations.len()
    );

    Ok(seed)
}
