//! Resampling of cost-ordered customers onto the enrollment grid.
//!
//! Customers are sorted by total cost (stable, so equal costs keep population
//! order) and assigned a cumulative enrollment of `rank · max_enrollment / n`.
//! For each grid point `g` the chosen cost belongs to the customer whose
//! cumulative enrollment snaps to `g` and lies closest to it; the earliest such
//! customer (lowest cost) wins ties.

use crate::curve::grid::round_to_grid;
use crate::domain::{CostCell, CostCurvePoint, CostedCustomer};

/// Sort customers by cost and compute their cumulative enrollment percent.
pub fn cost_curve(customers: &[CostedCustomer]) -> Vec<CostCurvePoint> {
    let mut sorted: Vec<&CostedCustomer> = customers.iter().collect();
    sorted.sort_by(|a, b| a.total_cost.total_cmp(&b.total_cost));

    let n = sorted.len() as f64;
    let max_enrollment = sorted
        .iter()
        .map(|c| c.customer.enrollment * 100.0)
        .fold(f64::NEG_INFINITY, f64::max);

    sorted
        .iter()
        .enumerate()
        .map(|(idx, c)| CostCurvePoint {
            cumulative_enrollment: (idx + 1) as f64 * max_enrollment / n,
            total_cost: c.total_cost,
        })
        .collect()
}

/// Cost at each of `percents` for a curve with enrollment ceiling `upper_limit`.
///
/// Grid points at or above the ceiling, and points past the population's
/// largest cumulative enrollment, are [`CostCell::NotAchievable`].
pub fn resample(
    curve: &[CostCurvePoint],
    upper_limit: f64,
    percents: &[u32],
    resolution: u32,
) -> Vec<CostCell> {
    let snapped: Vec<u32> = curve
        .iter()
        .map(|p| round_to_grid(p.cumulative_enrollment, resolution))
        .collect();
    let max_cumulative = curve.last().map(|p| p.cumulative_enrollment);

    percents
        .iter()
        .map(|&percent| {
            if f64::from(percent) / 100.0 >= upper_limit {
                return CostCell::NotAchievable;
            }
            let target = f64::from(percent);

            let on_grid = closest(
                curve
                    .iter()
                    .zip(&snapped)
                    .filter(|&(_, &s)| s == percent)
                    .map(|(p, _)| p),
                target,
            );
            if let Some(point) = on_grid {
                return CostCell::Cost(point.total_cost);
            }

            // Coarse populations can skip a grid point entirely.
            match max_cumulative {
                Some(max) if target <= max => closest(curve.iter(), target)
                    .map(|p| CostCell::Cost(p.total_cost))
                    .unwrap_or(CostCell::NotAchievable),
                _ => CostCell::NotAchievable,
            }
        })
        .collect()
}

fn closest<'a>(
    points: impl Iterator<Item = &'a CostCurvePoint>,
    target: f64,
) -> Option<&'a CostCurvePoint> {
    let mut best: Option<(&CostCurvePoint, f64)> = None;
    for p in points {
        let delta = (p.cumulative_enrollment - target).abs();
        match best {
            Some((_, d)) if d <= delta => {}
            _ => best = Some((p, delta)),
        }
    }
    best.map(|(p, _)| p)
}
