//! Enrollment grid generation.
//!
//! Supply curves are reported on a fixed grid of enrollment percentages,
//! `{r·i : 0 ≤ i < 100/r}` for a resolution `r` in whole percent.

use crate::error::{Result, SupplyCurveError};

/// Check that `resolution` is a whole percent in `1..=100`.
pub fn validate_resolution(resolution: u32) -> Result<u32> {
    if (1..=100).contains(&resolution) {
        Ok(resolution)
    } else {
        Err(SupplyCurveError::InvalidResolution(resolution))
    }
}

/// All grid points, including 0.
pub fn enrollment_grid(resolution: u32) -> Result<Vec<u32>> {
    let resolution = validate_resolution(resolution)?;
    Ok((0..100 / resolution).map(|i| resolution * i).collect())
}

/// Grid points that get a table column. Cost at 0% is not meaningful.
pub fn table_percents(resolution: u32) -> Result<Vec<u32>> {
    Ok(enrollment_grid(resolution)?
        .into_iter()
        .filter(|&p| p > 0)
        .collect())
}

/// Snap a cumulative enrollment percent to the nearest grid multiple.
///
/// Halfway values go to the even multiple.
pub fn round_to_grid(percent: f64, resolution: u32) -> u32 {
    let r = f64::from(resolution);
    (r * (percent / r).round_ties_even()) as u32
}
