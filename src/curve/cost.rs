//! Per-customer cost composition.

use crate::domain::{CostedCustomer, ScenarioInputs, SyntheticCustomer};
use crate::fit::population::Population;

/// Total per-vehicle cost of one synthetic customer.
///
/// For LDV TOU the incentive already is the marketing spend, so marketing is
/// not added a second time.
pub fn total_cost(inputs: &ScenarioInputs, customer: &SyntheticCustomer) -> f64 {
    if inputs.is_marketing_driven() {
        customer.op_and_admin + customer.incentive
    } else {
        customer.op_and_admin + customer.marketing + customer.incentive
    }
}

/// Annotate every customer of `population` with its total cost.
///
/// Output order is the population order (new-install cohort first).
pub fn aggregate_costs(inputs: &ScenarioInputs, population: &Population) -> Vec<CostedCustomer> {
    population
        .iter()
        .map(|&customer| CostedCustomer {
            customer,
            total_cost: total_cost(inputs, &customer),
        })
        .collect()
}
