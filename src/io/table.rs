//! Read persisted supply-curve tables.
//!
//! The grid percents are recovered from the `"{p}%"` column headers, so a table
//! written at any resolution reads back without extra metadata.

use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::{CostCell, CurveKey, SupplyCurveRow, SupplyCurveTable, KEY_COLUMNS};
use crate::error::{Result, SupplyCurveError};

/// Load the cost table at `path`, tagging it with `resolution`.
pub fn read_cost_table(path: &Path, resolution: u32) -> Result<SupplyCurveTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| SupplyCurveError::csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| SupplyCurveError::csv(path, e))?
        .clone();
    let percents = parse_header(&headers).map_err(|message| malformed(path, message))?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| SupplyCurveError::csv(path, e))?;
        let row = parse_row(&record, percents.len())
            .map_err(|message| malformed(path, format!("line {line}: {message}")))?;
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), columns = percents.len(), "read cost table");
    Ok(SupplyCurveTable {
        resolution,
        percents,
        rows,
    })
}

fn malformed(path: &Path, message: String) -> SupplyCurveError {
    SupplyCurveError::MalformedTable {
        path: path.to_path_buf(),
        message,
    }
}

fn parse_header(headers: &StringRecord) -> Result<Vec<u32>, String> {
    for (idx, expected) in KEY_COLUMNS.iter().enumerate() {
        let got = headers.get(idx).map(|h| h.trim_start_matches('\u{feff}'));
        if got != Some(*expected) {
            return Err(format!(
                "expected column {} to be `{expected}`, found `{}`",
                idx + 1,
                got.unwrap_or("")
            ));
        }
    }

    headers
        .iter()
        .skip(KEY_COLUMNS.len())
        .map(|h| {
            h.strip_suffix('%')
                .and_then(|p| p.parse::<u32>().ok())
                .filter(|p| (1..=100).contains(p))
                .ok_or_else(|| format!("unexpected column `{h}`"))
        })
        .collect()
}

fn parse_row(record: &StringRecord, columns: usize) -> Result<SupplyCurveRow, String> {
    if record.len() != KEY_COLUMNS.len() + columns {
        return Err(format!(
            "expected {} fields, found {}",
            KEY_COLUMNS.len() + columns,
            record.len()
        ));
    }

    let field = |idx: usize| record.get(idx).unwrap_or_default();
    let key = CurveKey {
        ev_type: field(0).parse()?,
        program: field(1).parse()?,
        scenario: field(2).parse()?,
        year: field(3)
            .parse()
            .map_err(|_| format!("invalid year '{}'", field(3)))?,
        customer_type: field(4).parse()?,
    };

    let costs = record
        .iter()
        .skip(KEY_COLUMNS.len())
        .map(str::parse::<CostCell>)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SupplyCurveRow { key, costs })
}
