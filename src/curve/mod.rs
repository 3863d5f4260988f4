//! Supply-curve computation for a single combination.
//!
//! Responsibilities:
//!
//! - compose per-customer total costs (`cost`)
//! - define the enrollment grid (`grid`)
//! - resample cost-ordered customers onto the grid (`resample`)

pub mod cost;
pub mod grid;
pub mod resample;

pub use cost::*;
pub use grid::*;
pub use resample::*;

use crate::domain::{
    BuildConfig, CostCell, CostCurvePoint, CurveKey, CurveParameters, CustomerType,
    ScenarioInputs, SupplyCurveRow,
};
use crate::error::Result;
use crate::fit::{fit_curve_parameters, synthesize_population};

/// Everything computed for one (scenario row, customer type) combination.
#[derive(Debug, Clone)]
pub struct SupplyCurve {
    pub key: CurveKey,
    pub params: CurveParameters,
    pub new_install_customers: usize,
    pub no_install_customers: usize,
    /// Cost-ordered cumulative curve before resampling.
    pub points: Vec<CostCurvePoint>,
    pub percents: Vec<u32>,
    /// One cell per entry of `percents`.
    pub costs: Vec<CostCell>,
}

impl SupplyCurve {
    pub fn into_row(self) -> SupplyCurveRow {
        SupplyCurveRow {
            key: self.key,
            costs: self.costs,
        }
    }
}

/// Fit, synthesize, aggregate and resample one combination.
pub fn compute_supply_curve(
    inputs: &ScenarioInputs,
    customer_type: CustomerType,
    config: &BuildConfig,
) -> Result<SupplyCurve> {
    let percents = table_percents(config.enrollment_resolution)?;
    let params = fit_curve_parameters(inputs, customer_type)?;
    let population = synthesize_population(inputs, &params, customer_type, config);
    let costed = aggregate_costs(inputs, &population);
    let points = cost_curve(&costed);
    let costs = resample(
        &points,
        inputs.upper_limit,
        &percents,
        config.enrollment_resolution,
    );

    Ok(SupplyCurve {
        key: inputs.key().with_customer_type(customer_type),
        params,
        new_install_customers: population.new_install.len(),
        no_install_customers: population.no_install.len(),
        points,
        percents,
        costs,
    })
}
