//! Scenario-input CSV ingest.
//!
//! Turns `scenario_vars.csv` into validated [`ScenarioInputs`] rows:
//! - **Strict schema**: every required column must be present
//! - **Strict rows**: the first malformed row aborts the load with its line number
//! - **Unique keys**: one row per (ev_type, year, scenario, program)
//!
//! Extra columns are ignored.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{ScenarioInputs, ScenarioKey};
use crate::error::{Result, SupplyCurveError};

const REQUIRED_COLUMNS: [&str; 12] = [
    "ev_type",
    "year",
    "scenario",
    "program",
    "new_install",
    "upper_limit",
    "incentive_annual",
    "enrollment_anch",
    "incentive_new_install",
    "program_op",
    "init_admin",
    "marketing",
];

/// Read access to scenario inputs, one row per [`ScenarioKey`].
pub trait ScenarioSource {
    /// All rows, in source order.
    fn scenarios(&self) -> &[ScenarioInputs];

    /// The single row for `key`.
    fn lookup(&self, key: &ScenarioKey) -> Result<&ScenarioInputs> {
        let mut matches = self.scenarios().iter().filter(|s| s.key() == *key);
        let first = matches
            .next()
            .ok_or_else(|| SupplyCurveError::ScenarioRowNotFound(key.to_string()))?;
        if matches.next().is_some() {
            return Err(SupplyCurveError::DuplicateScenarioRow(key.to_string()));
        }
        Ok(first)
    }
}

/// Scenario inputs loaded from a CSV file.
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    pub path: PathBuf,
    pub rows: Vec<ScenarioInputs>,
}

impl ScenarioSet {
    /// Build from in-memory rows, rejecting duplicate keys.
    pub fn from_rows(path: impl Into<PathBuf>, rows: Vec<ScenarioInputs>) -> Result<Self> {
        let mut seen = HashSet::new();
        for row in &rows {
            if !seen.insert(row.key()) {
                return Err(SupplyCurveError::DuplicateScenarioRow(row.key().to_string()));
            }
        }
        Ok(Self {
            path: path.into(),
            rows,
        })
    }
}

impl ScenarioSource for ScenarioSet {
    fn scenarios(&self) -> &[ScenarioInputs] {
        &self.rows
    }
}

/// Load and validate a scenario-input CSV.
pub fn load_scenario_inputs(path: &Path) -> Result<ScenarioSet> {
    if !path.is_file() {
        return Err(SupplyCurveError::MissingScenarioInputs {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| SupplyCurveError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| SupplyCurveError::csv(path, e))?
        .clone();
    let header_map = build_header_map(&headers);

    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !header_map.contains_key(**c)) {
        return Err(invalid(path, 1, format!("missing required column `{missing}`")));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result.map_err(|e| invalid(path, line, format!("CSV parse error: {e}")))?;
        let row = parse_row(&record, &header_map).map_err(|msg| invalid(path, line, msg))?;
        debug!(line, key = %row.key(), "read scenario inputs");
        rows.push(row);
    }

    info!(path = %path.display(), rows = rows.len(), "loaded scenario inputs");
    ScenarioSet::from_rows(path, rows)
}

fn invalid(path: &Path, line: usize, message: String) -> SupplyCurveError {
    SupplyCurveError::InvalidScenarioInputs {
        path: path.to_path_buf(),
        line,
        message,
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ScenarioInputs, String> {
    let row = ScenarioInputs {
        ev_type: get_required(record, header_map, "ev_type")?.parse()?,
        program: get_required(record, header_map, "program")?.parse()?,
        scenario: get_required(record, header_map, "scenario")?.parse()?,
        year: parse_year(get_required(record, header_map, "year")?)?,
        new_install: parse_fraction(record, header_map, "new_install")?,
        upper_limit: parse_fraction(record, header_map, "upper_limit")?,
        incentive_annual: parse_f64(record, header_map, "incentive_annual")?,
        enrollment_anch: parse_fraction(record, header_map, "enrollment_anch")?,
        incentive_new_install: parse_f64(record, header_map, "incentive_new_install")?,
        program_op: parse_f64(record, header_map, "program_op")?,
        init_admin: parse_f64(record, header_map, "init_admin")?,
        marketing: parse_f64(record, header_map, "marketing")?,
    };
    Ok(row)
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let s = get_required(record, header_map, name)?;
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid number '{s}' in `{name}`")),
    }
}

fn parse_fraction(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<f64, String> {
    let v = parse_f64(record, header_map, name)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("`{name}` must be a fraction in [0, 1], got {v}"))
    }
}

fn parse_year(s: &str) -> Result<u16, String> {
    // Spreadsheet round trips sometimes turn 2025 into 2025.0.
    let s = s.strip_suffix(".0").unwrap_or(s);
    s.parse::<u16>().map_err(|_| format!("Invalid year '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvType, Program, Scenario};
    use std::io::Write;
    use tempfile::tempdir;

    const HEADER: &str = "ev_type,year,scenario,program,new_install,upper_limit,incentive_annual,enrollment_anch,incentive_new_install,program_op,init_admin,marketing";

    fn write_csv(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("scenario_vars.csv");
        let mut file = File::create(&path).unwrap();
        write!(file, "{body}").unwrap();
        path
    }

    #[test]
    fn loads_rows_in_file_order() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            &format!(
                "\u{feff}{HEADER},notes\nLDV,2025,high,DLC,0.2,0.3,50,0.05,300,12,8,25,x\nMHDV,2030.0,low,TOU,0,0.5,100,0.1,0,20,5,10,\n"
            ),
        );
        let set = load_scenario_inputs(&path).unwrap();
        assert_eq!(set.rows.len(), 2);
        assert_eq!(set.rows[0].ev_type, EvType::Ldv);
        assert_eq!(set.rows[0].program, Program::Dlc);
        assert_eq!(set.rows[1].year, 2030);
        assert_eq!(set.rows[1].scenario, Scenario::Low);
        assert_eq!(set.rows[1].upper_limit, 0.5);

        let key = set.rows[1].key();
        assert_eq!(set.lookup(&key).unwrap().program_op, 20.0);
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let dir = tempdir().unwrap();
        let err = load_scenario_inputs(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, SupplyCurveError::MissingScenarioInputs { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "ev_type,year\nLDV,2025\n");
        let err = load_scenario_inputs(&path).unwrap_err();
        assert!(err.to_string().contains("scenario"), "{err}");
    }

    #[test]
    fn bad_row_reports_its_line() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            &format!(
                "{HEADER}\nLDV,2025,high,DLC,0.2,0.3,50,0.05,300,12,8,25\nLDV,2025,mid,DLC,0.2,1.3,50,0.05,300,12,8,25\n"
            ),
        );
        match load_scenario_inputs(&path).unwrap_err() {
            SupplyCurveError::InvalidScenarioInputs { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("upper_limit"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let row = "LDV,2025,high,DLC,0.2,0.3,50,0.05,300,12,8,25";
        let path = write_csv(dir.path(), &format!("{HEADER}\n{row}\n{row}\n"));
        let err = load_scenario_inputs(&path).unwrap_err();
        assert!(matches!(err, SupplyCurveError::DuplicateScenarioRow(_)));
    }

    #[test]
    fn lookup_of_absent_key_is_an_error() {
        let set = ScenarioSet::from_rows("mem", Vec::new()).unwrap();
        let key = ScenarioKey {
            ev_type: EvType::Ldv,
            program: Program::Rtp,
            scenario: Scenario::Flat,
            year: 2050,
        };
        assert!(matches!(
            set.lookup(&key).unwrap_err(),
            SupplyCurveError::ScenarioRowNotFound(_)
        ));
    }
}
