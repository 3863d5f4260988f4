//! Export supply-curve and beta tables to CSV.
//!
//! Both files are meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::{Path, PathBuf};

use crate::domain::{BetaRow, Rate, SupplyCurveTable, KEY_COLUMNS};
use crate::error::{Result, SupplyCurveError};

/// File name of the cost table at `resolution`.
pub fn cost_table_file_name(resolution: u32) -> String {
    format!("costs_table_{resolution}_pct.csv")
}

/// Location of the cost table at `resolution` inside `dir`.
pub fn cost_table_path(dir: &Path, resolution: u32) -> PathBuf {
    dir.join(cost_table_file_name(resolution))
}

/// Location of the beta table inside `dir`.
pub fn beta_table_path(dir: &Path) -> PathBuf {
    dir.join("betas_table.csv")
}

/// Write a supply-curve table: key columns, then one column per grid percent.
pub fn write_cost_table(path: &Path, table: &SupplyCurveTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| SupplyCurveError::csv(path, e))?;

    writer
        .write_record(table.header())
        .map_err(|e| SupplyCurveError::csv(path, e))?;

    for row in &table.rows {
        let record = row
            .key
            .to_record()
            .into_iter()
            .chain(row.costs.iter().map(|c| c.to_string()));
        writer
            .write_record(record)
            .map_err(|e| SupplyCurveError::csv(path, e))?;
    }

    writer.flush().map_err(|e| SupplyCurveError::io(path, e))?;
    Ok(())
}

/// Write fitted rates, one row per combination. Undefined rates are left blank.
pub fn write_beta_table(path: &Path, rows: &[BetaRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| SupplyCurveError::csv(path, e))?;

    let header = KEY_COLUMNS
        .iter()
        .copied()
        .chain(["beta_install_required", "beta_no_install"]);
    writer
        .write_record(header)
        .map_err(|e| SupplyCurveError::csv(path, e))?;

    for row in rows {
        let record = row
            .key
            .to_record()
            .into_iter()
            .chain([rate_cell(row.params.install), rate_cell(row.params.no_install)]);
        writer
            .write_record(record)
            .map_err(|e| SupplyCurveError::csv(path, e))?;
    }

    writer.flush().map_err(|e| SupplyCurveError::io(path, e))?;
    Ok(())
}

fn rate_cell(rate: Rate) -> String {
    rate.value().map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CostCell, CurveKey, CurveParameters, CustomerType, EvType, Program, Scenario,
        SupplyCurveRow,
    };
    use tempfile::tempdir;

    fn key(customer_type: CustomerType) -> CurveKey {
        CurveKey {
            ev_type: EvType::Ldv,
            program: Program::Dlc,
            scenario: Scenario::High,
            year: 2025,
            customer_type,
        }
    }

    #[test]
    fn cost_table_layout() {
        let dir = tempdir().unwrap();
        let path = cost_table_path(dir.path(), 50);
        assert!(path.ends_with("costs_table_50_pct.csv"));

        let table = SupplyCurveTable {
            resolution: 50,
            percents: vec![50],
            rows: vec![
                SupplyCurveRow {
                    key: key(CustomerType::New),
                    costs: vec![CostCell::Cost(12.346)],
                },
                SupplyCurveRow {
                    key: key(CustomerType::Recurring),
                    costs: vec![CostCell::NotAchievable],
                },
            ],
        };
        write_cost_table(&path, &table).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "EV_Type,Program,Scenario,Year,Customer_Type,50%");
        assert_eq!(lines[1], "LDV,DLC,high,2025,new,12.35");
        assert_eq!(lines[2], "LDV,DLC,high,2025,recurring,--");
    }

    #[test]
    fn undefined_rates_are_blank() {
        let dir = tempdir().unwrap();
        let path = beta_table_path(dir.path());
        let rows = [BetaRow {
            key: key(CustomerType::Recurring),
            params: CurveParameters {
                install: Rate::Undefined,
                no_install: Rate::Defined(0.5),
                upper_limit: 0.3,
                lower_limit: 0.0,
            },
        }];
        write_beta_table(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "EV_Type,Program,Scenario,Year,Customer_Type,beta_install_required,beta_no_install"
        );
        assert_eq!(lines[1], "LDV,DLC,high,2025,recurring,,0.5");
    }
}
