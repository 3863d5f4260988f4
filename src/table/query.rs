//! Queries against a materialized supply-curve table.
//!
//! The engine holds at most one loaded table. A cost query for a percent the
//! loaded table has no column for reloads the 1% table from the same
//! directory once and retries; every other failure goes back to the caller.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{percent_label, CostCell, CurveFilter, CurveKey, SupplyCurveTable};
use crate::error::{Result, SupplyCurveError};
use crate::io::{cost_table_path, read_cost_table};

/// Resolution of the finest table, used as the fallback for missing columns.
pub const FINEST_RESOLUTION: u32 = 1;

/// One row of a cost-at-enrollment answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostAtEnrollment {
    #[serde(flatten)]
    pub key: CurveKey,
    pub percent: u32,
    pub cost: CostCell,
}

/// One (combination, enrollment, cost) match of an enrollment-given-cost query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnrollmentAtCost {
    #[serde(flatten)]
    pub key: CurveKey,
    pub percent: u32,
    pub cost: f64,
}

#[derive(Debug, Clone)]
pub struct CurveQueryEngine {
    table_dir: PathBuf,
    table: Option<SupplyCurveTable>,
}

impl CurveQueryEngine {
    /// An engine reading tables from `table_dir`, with nothing loaded yet.
    pub fn new(table_dir: impl Into<PathBuf>) -> Self {
        Self {
            table_dir: table_dir.into(),
            table: None,
        }
    }

    /// An engine over an already materialized table.
    pub fn with_table(table_dir: impl Into<PathBuf>, table: SupplyCurveTable) -> Self {
        Self {
            table_dir: table_dir.into(),
            table: Some(table),
        }
    }

    pub fn table_dir(&self) -> &Path {
        &self.table_dir
    }

    pub fn table(&self) -> Option<&SupplyCurveTable> {
        self.table.as_ref()
    }

    /// Load `costs_table_{resolution}_pct.csv`, replacing any loaded table.
    pub fn load_existing_table(&mut self, resolution: u32) -> Result<&SupplyCurveTable> {
        let path = cost_table_path(&self.table_dir, resolution);
        if !path.is_file() {
            return Err(SupplyCurveError::TableNotFound { resolution, path });
        }
        let table = read_cost_table(&path, resolution)?;
        info!(path = %path.display(), rows = table.rows.len(), "loaded cost table");
        Ok(self.table.insert(table))
    }

    /// Cost of reaching `percent` enrollment for every combination matching `filter`.
    pub fn cost_at_enrollment(
        &mut self,
        percent: i64,
        filter: &CurveFilter,
    ) -> Result<Vec<CostAtEnrollment>> {
        let percent = validate_percent(percent)?;
        let table = self.table.as_ref().ok_or(SupplyCurveError::NoTableLoaded)?;

        if table.column_index(percent).is_none() && table.resolution != FINEST_RESOLUTION {
            warn!(
                column = %percent_label(percent),
                loaded = table.resolution,
                fallback = FINEST_RESOLUTION,
                "enrollment column not in loaded table; switching to the finest table"
            );
            self.load_existing_table(FINEST_RESOLUTION)?;
        }

        let table = self.table.as_ref().ok_or(SupplyCurveError::NoTableLoaded)?;
        let column = table
            .column_index(percent)
            .ok_or_else(|| SupplyCurveError::MissingEnrollmentColumn {
                column: percent_label(percent),
                resolution: table.resolution,
            })?;

        let rows: Vec<CostAtEnrollment> = table
            .rows
            .iter()
            .filter(|row| filter.matches(&row.key))
            .map(|row| CostAtEnrollment {
                key: row.key,
                percent,
                cost: row.costs[column],
            })
            .collect();
        debug!(percent, matches = rows.len(), "cost at enrollment");
        Ok(rows)
    }

    /// Every (combination, percent) whose cost rounds to the same multiple of
    /// `precision` as `budget`. Results are in table order, row by row.
    pub fn enrollment_given_cost(
        &self,
        budget: f64,
        precision: i64,
        filter: &CurveFilter,
    ) -> Result<Vec<EnrollmentAtCost>> {
        if precision < 1 {
            return Err(SupplyCurveError::InvalidPrecision(precision));
        }
        let table = self.table.as_ref().ok_or(SupplyCurveError::NoTableLoaded)?;

        let precision = precision as f64;
        let target = round_to_precision(budget, precision);

        let mut matches = Vec::new();
        for row in table.rows.iter().filter(|row| filter.matches(&row.key)) {
            for (&percent, cell) in table.percents.iter().zip(&row.costs) {
                let Some(cost) = cell.cost() else {
                    continue;
                };
                if round_to_precision(cost, precision) == target {
                    matches.push(EnrollmentAtCost {
                        key: row.key,
                        percent,
                        cost,
                    });
                }
            }
        }
        debug!(budget, matches = matches.len(), "enrollment given cost");
        Ok(matches)
    }
}

fn validate_percent(percent: i64) -> Result<u32> {
    if (1..=100).contains(&percent) {
        Ok(percent as u32)
    } else {
        Err(SupplyCurveError::PercentOutOfRange(percent))
    }
}

/// Nearest multiple of `precision`; halfway values go to the even multiple.
fn round_to_precision(value: f64, precision: f64) -> f64 {
    precision * (value / precision).round_ties_even()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BuildConfig, CustomerType, EvType, FilterValue, PopulationPolicy, Program, Scenario,
        SupplyCurveRow,
    };
    use crate::io::load_scenario_inputs;
    use crate::table::builder::create_cost_table;
    use crate::table::builder::tests::write_scenarios;
    use tempfile::tempdir;

    fn config(resolution: u32) -> BuildConfig {
        BuildConfig {
            enrollment_resolution: resolution,
            customer_resolution: 500,
            population_policy: PopulationPolicy::Scaled,
        }
    }

    fn key(program: Program, customer_type: CustomerType) -> CurveKey {
        CurveKey {
            ev_type: EvType::Ldv,
            program,
            scenario: Scenario::Mid,
            year: 2035,
            customer_type,
        }
    }

    fn small_table() -> SupplyCurveTable {
        SupplyCurveTable {
            resolution: 10,
            percents: vec![10, 20, 30],
            rows: vec![
                SupplyCurveRow {
                    key: key(Program::Dlc, CustomerType::New),
                    costs: vec![CostCell::Cost(24.0), CostCell::Cost(26.4), CostCell::NotAchievable],
                },
                SupplyCurveRow {
                    key: key(Program::Rtp, CustomerType::New),
                    costs: vec![CostCell::Cost(12.0), CostCell::Cost(25.2), CostCell::Cost(31.0)],
                },
            ],
        }
    }

    #[test]
    fn queries_without_a_table_are_state_errors() {
        let mut engine = CurveQueryEngine::new("unused");
        let err = engine.cost_at_enrollment(20, &CurveFilter::new()).unwrap_err();
        assert!(matches!(err, SupplyCurveError::NoTableLoaded));
        let err = engine
            .enrollment_given_cost(10.0, 1, &CurveFilter::new())
            .unwrap_err();
        assert!(matches!(err, SupplyCurveError::NoTableLoaded));
    }

    #[test]
    fn caller_input_is_checked_before_the_table() {
        let mut engine = CurveQueryEngine::new("unused");
        for bad in [0, -5, 101] {
            assert!(matches!(
                engine.cost_at_enrollment(bad, &CurveFilter::new()).unwrap_err(),
                SupplyCurveError::PercentOutOfRange(p) if p == bad
            ));
        }
        assert!(matches!(
            engine.enrollment_given_cost(10.0, 0, &CurveFilter::new()).unwrap_err(),
            SupplyCurveError::InvalidPrecision(0)
        ));
    }

    #[test]
    fn cost_query_projects_one_column_and_is_idempotent() {
        let mut engine = CurveQueryEngine::with_table("unused", small_table());
        let filter = CurveFilter::new()
            .with(FilterValue::Program(Program::Dlc))
            .unwrap();

        let first = engine.cost_at_enrollment(30, &filter).unwrap();
        assert_eq!(
            first,
            vec![CostAtEnrollment {
                key: key(Program::Dlc, CustomerType::New),
                percent: 30,
                cost: CostCell::NotAchievable,
            }]
        );
        assert_eq!(engine.cost_at_enrollment(30, &filter).unwrap(), first);
        assert_eq!(engine.cost_at_enrollment(20, &CurveFilter::new()).unwrap().len(), 2);
    }

    #[test]
    fn budget_query_rounds_costs_and_skips_sentinels() {
        let engine = CurveQueryEngine::with_table("unused", small_table());
        let hits = engine
            .enrollment_given_cost(25.0, 5, &CurveFilter::new())
            .unwrap();
        // 24.0 and 26.4 round to 25; 25.2 rounds to 25; 31.0 rounds to 30.
        let got: Vec<(Program, u32)> = hits.iter().map(|h| (h.key.program, h.percent)).collect();
        assert_eq!(got, vec![(Program::Dlc, 10), (Program::Dlc, 20), (Program::Rtp, 20)]);

        let exact = engine
            .enrollment_given_cost(12.4, 1, &CurveFilter::new())
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].cost, 12.0);
    }

    #[test]
    fn missing_table_names_the_expected_path() {
        let dir = tempdir().unwrap();
        let mut engine = CurveQueryEngine::new(dir.path());
        match engine.load_existing_table(5).unwrap_err() {
            SupplyCurveError::TableNotFound { resolution, path } => {
                assert_eq!(resolution, 5);
                assert!(path.ends_with("costs_table_5_pct.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_column_falls_back_to_the_one_percent_table() {
        let dir = tempdir().unwrap();
        let inputs = write_scenarios(dir.path());
        create_cost_table(&inputs, dir.path(), &config(10), false).unwrap();
        create_cost_table(&inputs, dir.path(), &config(1), false).unwrap();

        let mut engine = CurveQueryEngine::new(dir.path());
        engine.load_existing_table(10).unwrap();

        let hits = engine.cost_at_enrollment(15, &CurveFilter::new()).unwrap();
        assert_eq!(engine.table().map(|t| t.resolution), Some(1));
        assert_eq!(hits.len(), 8);
        assert!(hits.iter().all(|h| h.percent == 15));

        // Now on the finest table: no further reload, and 100% never exists.
        let err = engine.cost_at_enrollment(100, &CurveFilter::new()).unwrap_err();
        assert!(matches!(
            err,
            SupplyCurveError::MissingEnrollmentColumn { resolution: 1, .. }
        ));
    }

    #[test]
    fn fallback_without_a_finest_table_is_a_state_error() {
        let dir = tempdir().unwrap();
        let inputs = write_scenarios(dir.path());
        create_cost_table(&inputs, dir.path(), &config(10), false).unwrap();

        let mut engine = CurveQueryEngine::new(dir.path());
        engine.load_existing_table(10).unwrap();
        assert!(matches!(
            engine.cost_at_enrollment(15, &CurveFilter::new()).unwrap_err(),
            SupplyCurveError::TableNotFound { resolution: 1, .. }
        ));
    }

    #[test]
    fn ldv_twenty_percent_returns_one_row_per_combination() {
        let dir = tempdir().unwrap();
        let inputs = write_scenarios(dir.path());
        create_cost_table(&inputs, dir.path(), &config(1), false).unwrap();
        let ldv_rows = load_scenario_inputs(&inputs)
            .unwrap()
            .rows
            .iter()
            .filter(|r| r.ev_type == EvType::Ldv)
            .count();

        let mut engine = CurveQueryEngine::new(dir.path());
        engine.load_existing_table(1).unwrap();
        let filter = CurveFilter::from_pairs(["EV_Type=LDV"]).unwrap();
        let hits = engine.cost_at_enrollment(20, &filter).unwrap();

        assert_eq!(hits.len(), ldv_rows * CustomerType::ALL.len());
        let mut combos: Vec<_> = hits
            .iter()
            .map(|h| (h.key.program, h.key.scenario, h.key.year, h.key.customer_type))
            .collect();
        combos.sort();
        combos.dedup();
        assert_eq!(combos.len(), hits.len());

        for hit in &hits {
            assert_eq!(hit.key.ev_type, EvType::Ldv);
            let rendered = hit.cost.to_string();
            let two_decimals = rendered
                .split_once('.')
                .is_some_and(|(_, frac)| frac.len() == 2);
            assert!(rendered == "--" || two_decimals, "{rendered}");
        }
    }
}
