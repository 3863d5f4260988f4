//! ASCII plotting of supply curves for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - cost-ordered customer curve: `-` line
//! - resampled grid costs: `o`
//! - fixed per-customer costs: `.` (op + admin) and `:` (op + admin + marketing)

use crate::curve::SupplyCurve;
use crate::domain::ScenarioInputs;

/// Render one combination's supply curve with its fixed-cost levels.
pub fn render_supply_curve_plot(
    curve: &SupplyCurve,
    inputs: &ScenarioInputs,
    width: usize,
    height: usize,
) -> String {
    let curve_points: Vec<(f64, f64)> = curve
        .points
        .iter()
        .map(|p| (p.cumulative_enrollment, p.total_cost))
        .collect();
    let samples: Vec<(f64, f64)> = curve
        .percents
        .iter()
        .zip(&curve.costs)
        .filter_map(|(&p, cell)| cell.cost().map(|c| (f64::from(p), c)))
        .collect();

    let op_and_admin = inputs.op_and_admin(curve.key.customer_type);
    let mut levels = vec![(op_and_admin, '.')];
    if !inputs.is_marketing_driven() {
        levels.push((op_and_admin + inputs.marketing, ':'));
    }

    let x_max = curve_points
        .iter()
        .chain(&samples)
        .map(|&(x, _)| x)
        .fold(inputs.upper_limit * 100.0, f64::max);

    let mut out = render_plot(&curve_points, &samples, &levels, x_max, width, height);
    out.push_str("Legend: - customers by cost | o grid cost | . op+admin");
    if levels.len() > 1 {
        out.push_str(" | : op+admin+marketing");
    }
    out.push('\n');
    out
}

fn render_plot(
    curve_points: &[(f64, f64)],
    samples: &[(f64, f64)],
    levels: &[(f64, char)],
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let (x_min, x_max) = if x_max > 0.0 { (0.0, x_max) } else { (0.0, 100.0) };

    let (y_min, y_max) = y_range(curve_points, samples, levels).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first, then levels in the gaps, then samples on top.
    draw_curve(&mut grid, curve_points, x_min, x_max, y_min, y_max);
    for &(level, ch) in levels {
        let y = map_y(level, y_min, y_max, height);
        for cell in grid[y].iter_mut().filter(|c| **c == ' ') {
            *cell = ch;
        }
    }
    for &(x, y) in samples {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: enrollment=[{x_min:.1}, {x_max:.1}]% | cost=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn y_range(
    curve: &[(f64, f64)],
    samples: &[(f64, f64)],
    levels: &[(f64, char)],
) -> Option<(f64, f64)> {
    let ys = curve
        .iter()
        .chain(samples)
        .map(|&(_, y)| y)
        .chain(levels.iter().map(|&(y, _)| y))
        .filter(|y| y.is_finite());

    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for y in ys {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let xx = map_x(x, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, '-');
        } else {
            grid[yy][xx] = '-';
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
