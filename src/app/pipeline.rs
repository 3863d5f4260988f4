//! Command pipelines shared by the CLI front-end and tests.
//!
//! Each pipeline merges command-line overrides into the loaded [`Settings`],
//! runs the library operation and returns its result; printing is left to
//! the caller.

use std::path::{Path, PathBuf};

use crate::cli::{BetasArgs, BuildArgs, CurveArgs, PopulationArgs, QueryArgs};
use crate::config::Settings;
use crate::curve::{compute_supply_curve, SupplyCurve};
use crate::domain::{BetaRow, BuildConfig, CurveFilter, CurveKey, ScenarioInputs, ScenarioKey};
use crate::error::{Result, SupplyCurveError};
use crate::io::{load_scenario_inputs, ScenarioSource};
use crate::table::{
    create_beta_table, create_cost_table, BuildOutcome, CostAtEnrollment, CurveQueryEngine,
    EnrollmentAtCost,
};

/// Settings with any population flags applied on top.
pub fn build_config(settings: &Settings, args: &PopulationArgs) -> Result<BuildConfig> {
    let mut merged = settings.clone();
    if let Some(resolution) = args.resolution {
        merged.enrollment_resolution = resolution;
    }
    if let Some(customers) = args.customers {
        merged.customer_resolution = customers;
    }
    if let Some(policy) = args.policy {
        merged.population_policy = policy;
    }
    merged.build_config()
}

fn scenario_inputs<'a>(settings: &'a Settings, flag: &'a Option<PathBuf>) -> &'a Path {
    flag.as_deref().unwrap_or(&settings.scenario_inputs)
}

fn output_dir<'a>(settings: &'a Settings, flag: &'a Option<PathBuf>) -> &'a Path {
    flag.as_deref().unwrap_or(&settings.output_dir)
}

pub fn run_build(settings: &Settings, args: &BuildArgs) -> Result<BuildOutcome> {
    let config = build_config(settings, &args.population)?;
    create_cost_table(
        scenario_inputs(settings, &args.population.inputs),
        output_dir(settings, &args.output_dir),
        &config,
        args.overwrite || settings.overwrite,
    )
}

pub fn run_betas(settings: &Settings, args: &BetasArgs) -> Result<(PathBuf, Vec<BetaRow>)> {
    create_beta_table(
        scenario_inputs(settings, &args.inputs),
        output_dir(settings, &args.output_dir),
    )
}

/// Parse filters and load the requested table.
fn open_table(settings: &Settings, args: &QueryArgs) -> Result<(CurveQueryEngine, CurveFilter)> {
    // Filters are checked before any table is touched.
    let filter = CurveFilter::from_pairs(&args.filters)?;
    let resolution = args.resolution.unwrap_or(settings.enrollment_resolution);
    let mut engine = CurveQueryEngine::new(output_dir(settings, &args.output_dir));
    engine.load_existing_table(resolution)?;
    Ok((engine, filter))
}

pub fn run_cost_query(
    settings: &Settings,
    percent: i64,
    args: &QueryArgs,
) -> Result<Vec<CostAtEnrollment>> {
    if !(1..=100).contains(&percent) {
        return Err(SupplyCurveError::PercentOutOfRange(percent));
    }
    let (mut engine, filter) = open_table(settings, args)?;
    engine.cost_at_enrollment(percent, &filter)
}

pub fn run_participation_query(
    settings: &Settings,
    budget: f64,
    precision: i64,
    args: &QueryArgs,
) -> Result<Vec<EnrollmentAtCost>> {
    if precision < 1 {
        return Err(SupplyCurveError::InvalidPrecision(precision));
    }
    let (engine, filter) = open_table(settings, args)?;
    engine.enrollment_given_cost(budget, precision, &filter)
}

/// One combination's inputs and computed curve.
#[derive(Debug, Clone)]
pub struct CurveRun {
    pub inputs: ScenarioInputs,
    pub curve: SupplyCurve,
}

/// Selectors from the command line, completed from `user_inputs`.
pub fn resolve_curve_key(settings: &Settings, args: &CurveArgs) -> Result<CurveKey> {
    let defaults = settings.user_inputs;
    let missing = |name: &str| {
        SupplyCurveError::InvalidSettings(format!(
            "no --{name} given and no user_inputs in the settings file"
        ))
    };

    let key = CurveKey {
        ev_type: args
            .ev_type
            .or(defaults.map(|u| u.ev_type))
            .ok_or_else(|| missing("ev-type"))?,
        program: args
            .program
            .or(defaults.map(|u| u.program))
            .ok_or_else(|| missing("program"))?,
        scenario: args
            .scenario
            .or(defaults.map(|u| u.scenario))
            .ok_or_else(|| missing("scenario"))?,
        year: args
            .year
            .or(defaults.map(|u| u.year))
            .ok_or_else(|| missing("year"))?,
        customer_type: args
            .customer_type
            .or(defaults.map(|u| u.customer_type))
            .ok_or_else(|| missing("customer-type"))?,
    };
    Ok(key)
}

pub fn run_curve(settings: &Settings, args: &CurveArgs) -> Result<CurveRun> {
    let key = resolve_curve_key(settings, args)?;
    let config = build_config(settings, &args.population)?;
    let source = load_scenario_inputs(scenario_inputs(settings, &args.population.inputs))?;

    let scenario_key = ScenarioKey {
        ev_type: key.ev_type,
        program: key.program,
        scenario: key.scenario,
        year: key.year,
    };
    let inputs = source.lookup(&scenario_key)?.clone();
    let curve = compute_supply_curve(&inputs, key.customer_type, &config)?;
    Ok(CurveRun { inputs, curve })
}
