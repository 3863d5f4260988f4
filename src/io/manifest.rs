//! Build manifests written next to each cost table.
//!
//! A manifest records how a table was produced: resolution, population
//! settings, the scenario-input file and when the build ran. The schema is
//! [`BuildManifest`].

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BuildConfig, PopulationPolicy};
use crate::error::{Result, SupplyCurveError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub tool: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub enrollment_resolution: u32,
    pub customer_resolution: usize,
    pub population_policy: PopulationPolicy,
    pub scenario_inputs: PathBuf,
    pub scenario_rows: usize,
    pub curve_rows: usize,
}

impl BuildManifest {
    pub fn new(
        config: &BuildConfig,
        scenario_inputs: &Path,
        scenario_rows: usize,
        curve_rows: usize,
    ) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            enrollment_resolution: config.enrollment_resolution,
            customer_resolution: config.customer_resolution,
            population_policy: config.population_policy,
            scenario_inputs: scenario_inputs.to_path_buf(),
            scenario_rows,
            curve_rows,
        }
    }
}

/// `costs_table_1_pct.csv` -> `costs_table_1_pct.manifest.json`.
pub fn manifest_path(table_path: &Path) -> PathBuf {
    table_path.with_extension("manifest.json")
}

/// Write a manifest JSON file.
pub fn write_manifest(path: &Path, manifest: &BuildManifest) -> Result<()> {
    let file = File::create(path).map_err(|e| SupplyCurveError::io(path, e))?;
    serde_json::to_writer_pretty(file, manifest)?;
    Ok(())
}

/// Read a manifest JSON file.
pub fn read_manifest(path: &Path) -> Result<BuildManifest> {
    let file = File::open(path).map_err(|e| SupplyCurveError::io(path, e))?;
    Ok(serde_json::from_reader(file)?)
}
