//! Shared domain types.
//!
//! Categorical dimensions are closed enums so that scenario inputs, persisted
//! tables and query filters all agree on one schema.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Lower enrollment limit of every response curve.
pub const LOWER_LIMIT: f64 = 0.0;

/// Years present in the published scenario inputs.
pub const YEARS: [u16; 6] = [2025, 2030, 2035, 2040, 2045, 2050];

/// Key column headers of a persisted supply-curve table, in order.
pub const KEY_COLUMNS: [&str; 5] = ["EV_Type", "Program", "Scenario", "Year", "Customer_Type"];

/// Marker written in place of a cost when the enrollment is out of reach.
pub const NOT_ACHIEVABLE: &str = "--";

/// Vehicle class.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum EvType {
    /// Light-duty vehicles.
    #[serde(rename = "LDV")]
    #[value(name = "LDV")]
    Ldv,
    /// Medium- and heavy-duty vehicles.
    #[serde(rename = "MHDV")]
    #[value(name = "MHDV")]
    Mhdv,
}

impl EvType {
    pub const ALL: [EvType; 2] = [EvType::Ldv, EvType::Mhdv];

    pub fn as_str(self) -> &'static str {
        match self {
            EvType::Ldv => "LDV",
            EvType::Mhdv => "MHDV",
        }
    }
}

/// Managed-charging program.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Program {
    /// Direct load control.
    #[serde(rename = "DLC")]
    #[value(name = "DLC")]
    Dlc,
    /// Real-time pricing.
    #[serde(rename = "RTP")]
    #[value(name = "RTP")]
    Rtp,
    /// Time-of-use rates.
    #[serde(rename = "TOU")]
    #[value(name = "TOU")]
    Tou,
}

impl Program {
    pub const ALL: [Program; 3] = [Program::Dlc, Program::Rtp, Program::Tou];

    pub fn as_str(self) -> &'static str {
        match self {
            Program::Dlc => "DLC",
            Program::Rtp => "RTP",
            Program::Tou => "TOU",
        }
    }
}

/// Flexibility scenario.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    High,
    Mid,
    Low,
    Flat,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [Scenario::High, Scenario::Mid, Scenario::Low, Scenario::Flat];

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::High => "high",
            Scenario::Mid => "mid",
            Scenario::Low => "low",
            Scenario::Flat => "flat",
        }
    }
}

/// Whether a customer enrolls for the first time or renews.
///
/// New customers carry the one-time admin cost and may need a charger install;
/// recurring customers never do.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    New,
    Recurring,
}

impl CustomerType {
    pub const ALL: [CustomerType; 2] = [CustomerType::New, CustomerType::Recurring];

    pub fn as_str(self) -> &'static str {
        match self {
            CustomerType::New => "new",
            CustomerType::Recurring => "recurring",
        }
    }
}

/// Sub-cohort split by whether a new charger install is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallKind {
    NewInstall,
    NoInstall,
}

impl InstallKind {
    /// Cohort order used when synthesizing a population.
    pub const ALL: [InstallKind; 2] = [InstallKind::NewInstall, InstallKind::NoInstall];
}

macro_rules! impl_str_enum {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("unknown {} '{s}'", $what))
            }
        }
    };
}

impl_str_enum!(EvType, "EV type");
impl_str_enum!(Program, "program");
impl_str_enum!(Scenario, "scenario");
impl_str_enum!(CustomerType, "customer type");

/// How many synthetic customers each install sub-cohort receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PopulationPolicy {
    /// `floor(customer_resolution × cohort fraction)` customers per cohort.
    #[default]
    Scaled,
    /// `customer_resolution` customers for every cohort with a non-zero fraction.
    Fixed,
}

impl PopulationPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            PopulationPolicy::Scaled => "scaled",
            PopulationPolicy::Fixed => "fixed",
        }
    }
}

/// Key of one scenario-input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScenarioKey {
    pub ev_type: EvType,
    pub program: Program,
    pub scenario: Scenario,
    pub year: u16,
}

impl ScenarioKey {
    pub fn with_customer_type(self, customer_type: CustomerType) -> CurveKey {
        CurveKey {
            ev_type: self.ev_type,
            program: self.program,
            scenario: self.scenario,
            year: self.year,
            customer_type,
        }
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ev_type={} program={} scenario={} year={}",
            self.ev_type, self.program, self.scenario, self.year
        )
    }
}

/// Key of one supply curve: the full five-way combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CurveKey {
    #[serde(rename = "EV_Type")]
    pub ev_type: EvType,
    #[serde(rename = "Program")]
    pub program: Program,
    #[serde(rename = "Scenario")]
    pub scenario: Scenario,
    #[serde(rename = "Year")]
    pub year: u16,
    #[serde(rename = "Customer_Type")]
    pub customer_type: CustomerType,
}

impl CurveKey {
    /// Values in [`KEY_COLUMNS`] order, as persisted.
    pub fn to_record(&self) -> [String; 5] {
        [
            self.ev_type.to_string(),
            self.program.to_string(),
            self.scenario.to_string(),
            self.year.to_string(),
            self.customer_type.to_string(),
        ]
    }
}

impl fmt::Display for CurveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.ev_type, self.program, self.scenario, self.year, self.customer_type
        )
    }
}

/// Structural inputs for one (EV type, program, scenario, year).
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioInputs {
    pub ev_type: EvType,
    pub program: Program,
    pub scenario: Scenario,
    pub year: u16,
    /// Fraction of new customers that need a charger installed.
    pub new_install: f64,
    /// Maximum achievable enrollment fraction.
    pub upper_limit: f64,
    /// Annual incentive, the driver of the no-install channel.
    pub incentive_annual: f64,
    /// Enrollment fraction observed at the anchor incentive.
    pub enrollment_anch: f64,
    /// Incentive offered to customers requiring a new install.
    pub incentive_new_install: f64,
    /// Per-customer program operating cost.
    pub program_op: f64,
    /// One-time admin cost for new customers.
    pub init_admin: f64,
    pub marketing: f64,
}

impl ScenarioInputs {
    pub fn key(&self) -> ScenarioKey {
        ScenarioKey {
            ev_type: self.ev_type,
            program: self.program,
            scenario: self.scenario,
            year: self.year,
        }
    }

    pub fn no_install(&self) -> f64 {
        1.0 - self.new_install
    }

    /// LDV customers on TOU rates respond to marketing rather than incentives.
    pub fn is_marketing_driven(&self) -> bool {
        self.ev_type == EvType::Ldv && self.program == Program::Tou
    }

    /// Share of the population in an install sub-cohort.
    pub fn cohort_fraction(&self, install: InstallKind, customer_type: CustomerType) -> f64 {
        match (install, customer_type) {
            (InstallKind::NewInstall, CustomerType::Recurring) => 0.0,
            (InstallKind::NewInstall, CustomerType::New) => self.new_install,
            (InstallKind::NoInstall, _) => self.no_install(),
        }
    }

    /// Operating plus admin cost per customer.
    pub fn op_and_admin(&self, customer_type: CustomerType) -> f64 {
        match customer_type {
            CustomerType::New => self.program_op + self.init_admin,
            CustomerType::Recurring => self.program_op,
        }
    }
}

/// Decay rate of one response channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rate {
    Defined(f64),
    /// Customers in this channel do not respond; every incentive resolves to zero.
    Undefined,
}

impl Rate {
    pub fn value(self) -> Option<f64> {
        match self {
            Rate::Defined(v) => Some(v),
            Rate::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Rate::Defined(_))
    }
}

/// Fitted response-curve parameters for one scenario and customer type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveParameters {
    pub install: Rate,
    pub no_install: Rate,
    pub upper_limit: f64,
    pub lower_limit: f64,
}

impl CurveParameters {
    pub fn rate(&self, install: InstallKind) -> Rate {
        match install {
            InstallKind::NewInstall => self.install,
            InstallKind::NoInstall => self.no_install,
        }
    }
}

/// One synthetic customer: a share of the population at one enrollment level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticCustomer {
    /// Enrollment level (fraction) this customer stands for.
    pub enrollment: f64,
    /// Incentive required to reach `enrollment`.
    pub incentive: f64,
    pub op_and_admin: f64,
    pub marketing: f64,
    pub install: InstallKind,
    pub customer_type: CustomerType,
}

/// A synthetic customer with its total per-vehicle cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostedCustomer {
    pub customer: SyntheticCustomer,
    pub total_cost: f64,
}

/// A point of the cost-ordered enrollment curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostCurvePoint {
    /// Cumulative enrollment in percent.
    pub cumulative_enrollment: f64,
    pub total_cost: f64,
}

/// One cell of a supply-curve table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostCell {
    Cost(f64),
    NotAchievable,
}

impl CostCell {
    pub fn cost(self) -> Option<f64> {
        match self {
            CostCell::Cost(v) => Some(v),
            CostCell::NotAchievable => None,
        }
    }
}

impl fmt::Display for CostCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostCell::Cost(v) => write!(f, "{v:.2}"),
            CostCell::NotAchievable => f.write_str(NOT_ACHIEVABLE),
        }
    }
}

impl FromStr for CostCell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == NOT_ACHIEVABLE {
            return Ok(CostCell::NotAchievable);
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(CostCell::Cost(v)),
            _ => Err(format!("invalid cost cell '{s}'")),
        }
    }
}

impl Serialize for CostCell {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Column label of an enrollment grid point, e.g. `"20%"`.
pub fn percent_label(percent: u32) -> String {
    format!("{percent}%")
}

/// One persisted supply curve.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyCurveRow {
    pub key: CurveKey,
    /// One cell per column of the owning table's `percents`.
    pub costs: Vec<CostCell>,
}

/// A full supply-curve table at one enrollment resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyCurveTable {
    pub resolution: u32,
    /// Enrollment-percent columns, in column order.
    pub percents: Vec<u32>,
    pub rows: Vec<SupplyCurveRow>,
}

impl SupplyCurveTable {
    pub fn column_index(&self, percent: u32) -> Option<usize> {
        self.percents.iter().position(|&p| p == percent)
    }

    pub fn header(&self) -> Vec<String> {
        KEY_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.percents.iter().map(|&p| percent_label(p)))
            .collect()
    }
}

/// Fitted rates of one combination, as written to the beta table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaRow {
    pub key: CurveKey,
    pub params: CurveParameters,
}

/// Explicit configuration threaded through a table build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildConfig {
    /// Spacing of the enrollment grid, in percent.
    pub enrollment_resolution: u32,
    /// Population size before cohort scaling.
    pub customer_resolution: usize,
    pub population_policy: PopulationPolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            enrollment_resolution: 1,
            customer_resolution: 1000,
            population_policy: PopulationPolicy::Scaled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("ldv".parse::<EvType>().unwrap(), EvType::Ldv);
        assert_eq!("TOU".parse::<Program>().unwrap(), Program::Tou);
        assert_eq!(" High ".parse::<Scenario>().unwrap(), Scenario::High);
        assert!("weekly".parse::<CustomerType>().is_err());
    }

    #[test]
    fn cost_cell_renders_two_decimals_or_marker() {
        assert_eq!(CostCell::Cost(12.0).to_string(), "12.00");
        assert_eq!(CostCell::Cost(3.14159).to_string(), "3.14");
        assert_eq!(CostCell::NotAchievable.to_string(), "--");
        assert_eq!("--".parse::<CostCell>().unwrap(), CostCell::NotAchievable);
        assert_eq!("7.50".parse::<CostCell>().unwrap(), CostCell::Cost(7.5));
    }

    #[test]
    fn recurring_customers_have_no_install_cohort() {
        let inputs = ScenarioInputs {
            ev_type: EvType::Mhdv,
            program: Program::Dlc,
            scenario: Scenario::Mid,
            year: 2030,
            new_install: 0.25,
            upper_limit: 0.5,
            incentive_annual: 100.0,
            enrollment_anch: 0.1,
            incentive_new_install: 400.0,
            program_op: 20.0,
            init_admin: 5.0,
            marketing: 10.0,
        };
        assert_eq!(inputs.cohort_fraction(InstallKind::NewInstall, CustomerType::Recurring), 0.0);
        assert_eq!(inputs.cohort_fraction(InstallKind::NewInstall, CustomerType::New), 0.25);
        assert_eq!(inputs.cohort_fraction(InstallKind::NoInstall, CustomerType::Recurring), 0.75);
        assert_eq!(inputs.op_and_admin(CustomerType::New), 25.0);
        assert_eq!(inputs.op_and_admin(CustomerType::Recurring), 20.0);
    }
}
