//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads settings and installs the log subscriber
//! - runs the requested pipeline
//! - prints tables, plots or JSON

use clap::Parser;

use crate::cli::{Cli, Command, CostArgs, CurveArgs, ParticipationArgs};
use crate::config::{init_logging, Settings};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `evmc` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    let level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    init_logging(level)?;

    match cli.command {
        Command::Build(args) => {
            let outcome = pipeline::run_build(&settings, &args)?;
            println!("{}", crate::report::format_build_summary(&outcome));
        }
        Command::Betas(args) => {
            let (path, rows) = pipeline::run_betas(&settings, &args)?;
            println!("{}", crate::report::format_beta_table(&rows));
            println!("Wrote {}", path.display());
        }
        Command::Cost(args) => handle_cost(&settings, &args)?,
        Command::Participation(args) => handle_participation(&settings, &args)?,
        Command::Curve(args) => handle_curve(&settings, &args)?,
    }
    Ok(())
}

fn handle_cost(settings: &Settings, args: &CostArgs) -> Result<(), AppError> {
    let rows = pipeline::run_cost_query(settings, args.percent, &args.query)?;
    if args.query.json {
        println!("{}", crate::report::format_json(&rows)?);
    } else {
        println!("{}", crate::report::format_cost_results(&rows));
    }
    Ok(())
}

fn handle_participation(settings: &Settings, args: &ParticipationArgs) -> Result<(), AppError> {
    let rows = pipeline::run_participation_query(settings, args.cost, args.precision, &args.query)?;
    if args.query.json {
        println!("{}", crate::report::format_json(&rows)?);
    } else {
        println!(
            "{}",
            crate::report::format_enrollment_results(&rows, args.cost, args.precision)
        );
    }
    Ok(())
}

fn handle_curve(settings: &Settings, args: &CurveArgs) -> Result<(), AppError> {
    let run = pipeline::run_curve(settings, args)?;

    // Roughly one listed row per 5% of enrollment.
    let stride = (5 / run.curve.percents.first().copied().unwrap_or(5)).max(1) as usize;
    println!(
        "{}",
        crate::report::format_curve_summary(&run.curve, &run.inputs, stride)
    );

    if !args.no_plot {
        let plot =
            crate::plot::render_supply_curve_plot(&run.curve, &run.inputs, args.width, args.height);
        println!("{plot}");
    }
    Ok(())
}
