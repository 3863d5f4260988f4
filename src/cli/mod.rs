//! Command-line parsing for the EV managed-charging supply-curve tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the curve and table code. Every flag here is optional where a
//! settings-file value exists; flags override settings.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{CustomerType, EvType, PopulationPolicy, Program, Scenario};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "evmc",
    version,
    about = "EV managed-charging supply curves: build cost tables and query them"
)]
pub struct Cli {
    /// Settings file (YAML). Defaults to $EVMC_SUPPLY_CURVES_CONFIG, then ./supply_curves.yml.
    #[arg(long, global = true, value_name = "YAML")]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the supply-curve cost table for every combination in the scenario inputs.
    Build(BuildArgs),
    /// Fit response-curve rates and write the beta table.
    Betas(BetasArgs),
    /// Cost per vehicle at an enrollment percent.
    Cost(CostArgs),
    /// Enrollment percents reachable at a cost per vehicle.
    Participation(ParticipationArgs),
    /// Compute, print and plot the supply curve of one combination.
    Curve(CurveArgs),
}

/// Population settings shared by commands that compute curves.
#[derive(Debug, Args, Clone, Default)]
pub struct PopulationArgs {
    /// Enrollment grid spacing in whole percent.
    #[arg(long, value_name = "PCT")]
    pub resolution: Option<u32>,

    /// Synthetic population size before cohort scaling.
    #[arg(long, value_name = "N")]
    pub customers: Option<usize>,

    /// How install sub-cohorts are sized.
    #[arg(long, value_enum)]
    pub policy: Option<PopulationPolicy>,

    /// Scenario-input CSV (scenario_vars.csv).
    #[arg(long, value_name = "CSV")]
    pub inputs: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub population: PopulationArgs,

    /// Directory the table is written to.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Replace an existing table at the same resolution.
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Debug, Args, Clone)]
pub struct BetasArgs {
    /// Scenario-input CSV (scenario_vars.csv).
    #[arg(long, value_name = "CSV")]
    pub inputs: Option<PathBuf>,

    /// Directory the beta table is written to.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Options shared by the table queries.
#[derive(Debug, Args, Clone)]
pub struct QueryArgs {
    /// Resolution of the table to load.
    #[arg(long, value_name = "PCT")]
    pub resolution: Option<u32>,

    /// Directory holding the cost tables.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Key filter, e.g. `-f EV_Type=LDV -f Year=2030`. Repeat a key to allow several values.
    #[arg(short = 'f', long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct CostArgs {
    /// Enrollment percent, an integer in 1..=100.
    #[arg(long, allow_negative_numbers = true)]
    pub percent: i64,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ParticipationArgs {
    /// Cost per vehicle to look up.
    #[arg(long, allow_negative_numbers = true)]
    pub cost: f64,

    /// Costs are compared after rounding to a multiple of this many currency units.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub precision: i64,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Debug, Args, Clone)]
pub struct CurveArgs {
    /// Missing selectors fall back to `user_inputs` in the settings file.
    #[arg(long, value_enum)]
    pub ev_type: Option<EvType>,

    #[arg(long, value_enum)]
    pub program: Option<Program>,

    #[arg(long, value_enum)]
    pub scenario: Option<Scenario>,

    #[arg(long)]
    pub year: Option<u16>,

    #[arg(long, value_enum)]
    pub customer_type: Option<CustomerType>,

    #[command(flatten)]
    pub population: PopulationArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Skip the terminal plot.
    #[arg(long)]
    pub no_plot: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cost_query_collects_repeated_filters() {
        let cli = Cli::parse_from([
            "evmc", "cost", "--percent", "20", "-f", "EV_Type=LDV", "-f", "Year=2030", "--json",
        ]);
        let Command::Cost(args) = cli.command else {
            panic!("expected cost command");
        };
        assert_eq!(args.percent, 20);
        assert_eq!(args.query.filters, vec!["EV_Type=LDV", "Year=2030"]);
        assert!(args.query.json);
    }

    #[test]
    fn out_of_range_percent_reaches_validation() {
        let cli = Cli::parse_from(["evmc", "cost", "--percent", "-3"]);
        let Command::Cost(args) = cli.command else {
            panic!("expected cost command");
        };
        assert_eq!(args.percent, -3);
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::parse_from([
            "evmc", "build", "--resolution", "5", "--policy", "fixed", "--log-level", "debug",
        ]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.population.resolution, Some(5));
        assert_eq!(args.population.policy, Some(PopulationPolicy::Fixed));
        assert!(!args.overwrite);
    }

    #[test]
    fn curve_selectors_use_table_spellings() {
        let cli = Cli::parse_from([
            "evmc", "curve", "--ev-type", "MHDV", "--program", "TOU", "--scenario", "flat",
            "--year", "2040", "--customer-type", "recurring",
        ]);
        let Command::Curve(args) = cli.command else {
            panic!("expected curve command");
        };
        assert_eq!(args.ev_type, Some(EvType::Mhdv));
        assert_eq!(args.program, Some(Program::Tou));
        assert_eq!(args.scenario, Some(Scenario::Flat));
        assert_eq!(args.customer_type, Some(CustomerType::Recurring));
    }
}
