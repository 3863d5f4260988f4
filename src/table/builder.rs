//! Full-table builds across the scenario cross-product.
//!
//! Jobs are enumerated EV type first, then customer type, then scenario rows
//! in source order. Curves are computed in parallel and collected back in job
//! order, so a build is byte-identical to a serial one.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::curve::{compute_supply_curve, table_percents, SupplyCurve};
use crate::domain::{
    BetaRow, BuildConfig, CustomerType, EvType, ScenarioInputs, SupplyCurveTable,
};
use crate::error::{Result, SupplyCurveError};
use crate::fit::fit_curve_parameters;
use crate::io::{
    beta_table_path, cost_table_path, load_scenario_inputs, manifest_path, write_beta_table,
    write_cost_table, write_manifest, BuildManifest, ScenarioSource,
};

/// One (scenario row, customer type) combination to compute.
#[derive(Debug, Clone, Copy)]
pub struct BuildJob<'a> {
    pub inputs: &'a ScenarioInputs,
    pub customer_type: CustomerType,
}

/// Enumerate jobs in table row order.
pub fn build_jobs<S: ScenarioSource + ?Sized>(source: &S) -> Vec<BuildJob<'_>> {
    let mut jobs = Vec::new();
    for ev_type in EvType::ALL {
        for customer_type in CustomerType::ALL {
            jobs.extend(
                source
                    .scenarios()
                    .iter()
                    .filter(|row| row.ev_type == ev_type)
                    .map(|inputs| BuildJob {
                        inputs,
                        customer_type,
                    }),
            );
        }
    }
    jobs
}

/// Check a [`BuildConfig`] before any work is scheduled.
pub fn validate_build_config(config: &BuildConfig) -> Result<()> {
    crate::curve::validate_resolution(config.enrollment_resolution)?;
    if config.customer_resolution == 0 {
        return Err(SupplyCurveError::InvalidCustomerResolution);
    }
    Ok(())
}

/// Compute every supply curve for `source`, in table row order.
pub fn build_curves<S: ScenarioSource + ?Sized>(
    source: &S,
    config: &BuildConfig,
) -> Result<Vec<SupplyCurve>> {
    validate_build_config(config)?;
    let jobs = build_jobs(source);
    info!(
        combinations = jobs.len(),
        resolution = config.enrollment_resolution,
        customers = config.customer_resolution,
        policy = config.population_policy.as_str(),
        "building supply curves"
    );

    jobs.par_iter()
        .map(|job| -> Result<SupplyCurve> {
            let curve = compute_supply_curve(job.inputs, job.customer_type, config)?;
            debug!(
                key = %curve.key,
                new_install = curve.new_install_customers,
                no_install = curve.no_install_customers,
                "computed supply curve"
            );
            Ok(curve)
        })
        .collect()
}

/// Build the in-memory supply-curve table for `source`.
pub fn build_table<S: ScenarioSource + ?Sized>(
    source: &S,
    config: &BuildConfig,
) -> Result<SupplyCurveTable> {
    let curves = build_curves(source, config)?;
    Ok(SupplyCurveTable {
        resolution: config.enrollment_resolution,
        percents: table_percents(config.enrollment_resolution)?,
        rows: curves.into_iter().map(SupplyCurve::into_row).collect(),
    })
}

/// Fitted rates for every combination, in table row order.
pub fn build_betas<S: ScenarioSource + ?Sized>(source: &S) -> Result<Vec<BetaRow>> {
    build_jobs(source)
        .into_iter()
        .map(|job| -> Result<BetaRow> {
            Ok(BetaRow {
                key: job.inputs.key().with_customer_type(job.customer_type),
                params: fit_curve_parameters(job.inputs, job.customer_type)?,
            })
        })
        .collect()
}

/// Files produced by [`create_cost_table`].
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub table_path: PathBuf,
    pub manifest_path: PathBuf,
    pub table: SupplyCurveTable,
}

/// Build a cost table from `scenario_inputs` and persist it under `output_dir`.
///
/// Refuses to replace an existing table unless `overwrite` is set.
pub fn create_cost_table(
    scenario_inputs: &Path,
    output_dir: &Path,
    config: &BuildConfig,
    overwrite: bool,
) -> Result<BuildOutcome> {
    validate_build_config(config)?;
    let table_path = cost_table_path(output_dir, config.enrollment_resolution);
    if table_path.exists() && !overwrite {
        return Err(SupplyCurveError::TableExists {
            resolution: config.enrollment_resolution,
            path: table_path,
        });
    }

    let source = load_scenario_inputs(scenario_inputs)?;
    let table = build_table(&source, config)?;

    std::fs::create_dir_all(output_dir).map_err(|e| SupplyCurveError::io(output_dir, e))?;
    write_cost_table(&table_path, &table)?;

    let manifest_path = manifest_path(&table_path);
    let manifest = BuildManifest::new(config, scenario_inputs, source.rows.len(), table.rows.len());
    write_manifest(&manifest_path, &manifest)?;

    info!(path = %table_path.display(), rows = table.rows.len(), "wrote cost table");
    Ok(BuildOutcome {
        table_path,
        manifest_path,
        table,
    })
}

/// Fit rates from `scenario_inputs` and write `betas_table.csv` under `output_dir`.
pub fn create_beta_table(
    scenario_inputs: &Path,
    output_dir: &Path,
) -> Result<(PathBuf, Vec<BetaRow>)> {
    let source = load_scenario_inputs(scenario_inputs)?;
    let rows = build_betas(&source)?;

    std::fs::create_dir_all(output_dir).map_err(|e| SupplyCurveError::io(output_dir, e))?;
    let path = beta_table_path(output_dir);
    write_beta_table(&path, &rows)?;

    info!(path = %path.display(), rows = rows.len(), "wrote beta table");
    Ok((path, rows))
}
