//! Settings file loading.
//!
//! Settings live in a YAML file. The file is located from, in order: an
//! explicit path, the `EVMC_SUPPLY_CURVES_CONFIG` environment variable (a
//! `.env` file is honoured), or `supply_curves.yml` in the working directory.
//! Only the last of these may be absent, in which case defaults are used.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::logging::{parse_log_level, DEFAULT_LOG_LEVEL};
use crate::curve::validate_resolution;
use crate::domain::{
    BuildConfig, CurveKey, CustomerType, EvType, PopulationPolicy, Program, Scenario, YEARS,
};
use crate::error::{Result, SupplyCurveError};

pub const SETTINGS_FILE_NAME: &str = "supply_curves.yml";

/// Environment variable naming a settings file.
pub const CONFIG_ENV_VAR: &str = "EVMC_SUPPLY_CURVES_CONFIG";

/// Program settings from the YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Log level: `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    /// Path of `scenario_vars.csv`.
    pub scenario_inputs: PathBuf,
    /// Directory cost and beta tables are written to and read from.
    pub output_dir: PathBuf,
    /// Enrollment grid spacing in percent.
    pub enrollment_resolution: u32,
    /// Synthetic population size before cohort scaling.
    pub customer_resolution: usize,
    pub population_policy: PopulationPolicy,
    /// Replace an existing table on build.
    pub overwrite: bool,
    /// Default selection for single-curve commands.
    pub user_inputs: Option<UserInputs>,
}

impl Default for Settings {
    fn default() -> Self {
        let build = BuildConfig::default();
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            scenario_inputs: PathBuf::from("scenario_vars.csv"),
            output_dir: PathBuf::from("cost_tables"),
            enrollment_resolution: build.enrollment_resolution,
            customer_resolution: build.customer_resolution,
            population_policy: build.population_policy,
            overwrite: false,
            user_inputs: None,
        }
    }
}

/// One fully specified combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserInputs {
    pub ev_type: EvType,
    pub program: Program,
    pub scenario: Scenario,
    pub year: u16,
    pub customer_type: CustomerType,
}

impl UserInputs {
    pub fn validate(&self) -> Result<()> {
        if !(2025..=2050).contains(&self.year) || !YEARS.contains(&self.year) {
            return Err(SupplyCurveError::InvalidSettings(format!(
                "user_inputs.year must be one of {YEARS:?}, got {}",
                self.year
            )));
        }
        Ok(())
    }

    pub fn key(&self) -> CurveKey {
        CurveKey {
            ev_type: self.ev_type,
            program: self.program,
            scenario: self.scenario,
            year: self.year,
            customer_type: self.customer_type,
        }
    }
}

impl Settings {
    /// Locate, read and validate the settings file.
    pub fn load(explicit: Option<&Path>) -> Result<Settings> {
        match resolve_settings_path(explicit) {
            Some(path) => Self::load_required(&path),
            None => Self::load_from_path(Path::new(SETTINGS_FILE_NAME)),
        }
    }

    /// Read from `file_path`, falling back to defaults if it does not exist.
    pub fn load_from_path(file_path: &Path) -> Result<Settings> {
        if !file_path.is_file() {
            return Ok(Settings::default());
        }
        Self::load_required(file_path)
    }

    fn load_required(file_path: &Path) -> Result<Settings> {
        if !file_path.is_file() {
            return Err(SupplyCurveError::InvalidSettings(format!(
                "settings file '{}' does not exist",
                file_path.display()
            )));
        }
        let file = File::open(file_path).map_err(|e| SupplyCurveError::io(file_path, e))?;
        let settings: Settings =
            serde_yaml::from_reader(file).map_err(|source| SupplyCurveError::Yaml {
                path: file_path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        parse_log_level(&self.log_level)?;
        self.build_config()?;
        if let Some(user_inputs) = &self.user_inputs {
            user_inputs.validate()?;
        }
        Ok(())
    }

    /// The build parameters these settings describe.
    pub fn build_config(&self) -> Result<BuildConfig> {
        validate_resolution(self.enrollment_resolution)?;
        if self.customer_resolution == 0 {
            return Err(SupplyCurveError::InvalidCustomerResolution);
        }
        Ok(BuildConfig {
            enrollment_resolution: self.enrollment_resolution,
            customer_resolution: self.customer_resolution,
            population_policy: self.population_policy,
        })
    }
}

/// Explicit path, else the environment variable, else nothing.
fn resolve_settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    dotenvy::dotenv().ok();
    std::env::var_os(CONFIG_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
