//! Formatted terminal output for builds, queries and single curves.
//!
//! Formatting lives here so the curve and table code stays free of
//! presentation concerns and output changes stay localized.

use serde::Serialize;

use crate::curve::SupplyCurve;
use crate::domain::{BetaRow, CurveKey, Rate, ScenarioInputs};
use crate::error::Result;
use crate::table::{BuildOutcome, CostAtEnrollment, EnrollmentAtCost};

/// Summary printed after a table build.
pub fn format_build_summary(outcome: &BuildOutcome) -> String {
    let table = &outcome.table;
    let mut out = String::new();
    out.push_str("=== evmc - supply curve build ===\n");
    out.push_str(&format!("Resolution: {}%\n", table.resolution));
    out.push_str(&format!(
        "Rows: {} | Columns: {}\n",
        table.rows.len(),
        table.percents.len()
    ));
    out.push_str(&format!("Table: {}\n", outcome.table_path.display()));
    out.push_str(&format!("Manifest: {}\n", outcome.manifest_path.display()));
    out
}

/// One line per matching combination with its cost at the requested enrollment.
pub fn format_cost_results(rows: &[CostAtEnrollment]) -> String {
    let mut out = key_header(&["cost"]);
    for r in rows {
        push_line(&mut out, format!("{} {:>10}", key_cells(&r.key), r.cost.to_string()));
    }
    if rows.is_empty() {
        out.push_str("(no matching combinations)\n");
    }
    out
}

/// Matches of an enrollment-given-cost query.
pub fn format_enrollment_results(rows: &[EnrollmentAtCost], budget: f64, precision: i64) -> String {
    let mut out = format!("Enrollment at cost {budget:.2} (precision {precision}):\n");
    out.push_str(&key_header(&["enroll", "cost"]));
    for r in rows {
        push_line(
            &mut out,
            format!(
                "{} {:>10} {:>10.2}",
                key_cells(&r.key),
                format!("{}%", r.percent),
                r.cost
            ),
        );
    }
    if rows.is_empty() {
        out.push_str("(no enrollment level matches this cost)\n");
    }
    out
}

/// Fitted rates table; undefined rates show as `-`.
pub fn format_beta_table(rows: &[BetaRow]) -> String {
    let mut out = key_header(&["b_install", "b_no_inst"]);
    for r in rows {
        push_line(
            &mut out,
            format!(
                "{} {:>10} {:>10}",
                key_cells(&r.key),
                fmt_rate(r.params.install),
                fmt_rate(r.params.no_install)
            ),
        );
    }
    out
}

/// Parameters, cohort sizes and resampled costs of one combination.
///
/// Only every `stride`-th grid column is listed so a 1% curve stays readable.
pub fn format_curve_summary(curve: &SupplyCurve, inputs: &ScenarioInputs, stride: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", curve.key));
    out.push_str(&format!(
        "Upper limit: {:.1}% | anchor: {:.1}%\n",
        inputs.upper_limit * 100.0,
        inputs.enrollment_anch * 100.0
    ));
    out.push_str(&format!(
        "beta_install_required: {}\nbeta_no_install      : {}\n",
        fmt_rate(curve.params.install),
        fmt_rate(curve.params.no_install)
    ));
    out.push_str(&format!(
        "Customers: new_install={} no_install={}\n",
        curve.new_install_customers, curve.no_install_customers
    ));
    out.push_str(&format!(
        "Fixed costs: op+admin={:.2} marketing={:.2}{}\n",
        inputs.op_and_admin(curve.key.customer_type),
        inputs.marketing,
        if inputs.is_marketing_driven() {
            " (marketing drives enrollment, not added to cost)"
        } else {
            ""
        }
    ));

    out.push('\n');
    push_line(&mut out, format!("{:>8} {:>12}", "enroll", "cost"));
    push_line(&mut out, format!("{:-<8} {:-<12}", "", ""));
    let stride = stride.max(1);
    for (i, (percent, cell)) in curve.percents.iter().zip(&curve.costs).enumerate() {
        if i % stride == stride - 1 || i + 1 == curve.percents.len() {
            push_line(&mut out, format!("{:>8} {:>12}", format!("{percent}%"), cell.to_string()));
        }
    }
    out
}

/// Pretty JSON for scripting.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn key_header(value_columns: &[&str]) -> String {
    let mut out = String::new();
    let mut header = format!(
        "{:<6} {:<7} {:<8} {:>4} {:<9}",
        "ev", "program", "scenario", "year", "customer"
    );
    let mut rule = format!("{:-<6} {:-<7} {:-<8} {:-<4} {:-<9}", "", "", "", "", "");
    for c in value_columns {
        header.push_str(&format!(" {:>10}", truncate(c, 10)));
        rule.push_str(&format!(" {:-<10}", ""));
    }
    push_line(&mut out, header);
    push_line(&mut out, rule);
    out
}

fn key_cells(key: &CurveKey) -> String {
    format!(
        "{:<6} {:<7} {:<8} {:>4} {:<9}",
        key.ev_type.as_str(),
        key.program.as_str(),
        key.scenario.as_str(),
        key.year,
        key.customer_type.as_str()
    )
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_rate(rate: Rate) -> String {
    match rate {
        Rate::Defined(v) => format!("{v:.6}"),
        Rate::Undefined => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
