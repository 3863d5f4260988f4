//! Typed query filters over the categorical key columns.
//!
//! A filter maps each constrained dimension to its set of permitted values.
//! Values within one dimension are alternatives; dimensions combine with AND.
//! Every key and value is checked against the fixed schema when the filter is
//! built, before any table is scanned.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::types::{CurveKey, CustomerType, EvType, KEY_COLUMNS, Program, Scenario, YEARS};
use crate::error::{Result, SupplyCurveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterDimension {
    EvType,
    Program,
    Scenario,
    Year,
    CustomerType,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 5] = [
        FilterDimension::EvType,
        FilterDimension::Program,
        FilterDimension::Scenario,
        FilterDimension::Year,
        FilterDimension::CustomerType,
    ];

    /// Column header of this dimension in a persisted table.
    pub fn column(self) -> &'static str {
        match self {
            FilterDimension::EvType => KEY_COLUMNS[0],
            FilterDimension::Program => KEY_COLUMNS[1],
            FilterDimension::Scenario => KEY_COLUMNS[2],
            FilterDimension::Year => KEY_COLUMNS[3],
            FilterDimension::CustomerType => KEY_COLUMNS[4],
        }
    }

    pub fn from_column(name: &str) -> Result<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.column().eq_ignore_ascii_case(name))
            .ok_or_else(|| SupplyCurveError::UnknownFilterKey {
                key: name.to_string(),
                expected: KEY_COLUMNS.join(", "),
            })
    }

    /// Parse a value for this dimension, rejecting anything outside the schema.
    pub fn parse_value(self, value: &str) -> Result<FilterValue> {
        let unknown = || SupplyCurveError::UnknownFilterValue {
            key: self.column().to_string(),
            value: value.trim().to_string(),
        };
        let parsed = match self {
            FilterDimension::EvType => FilterValue::EvType(value.parse().map_err(|_| unknown())?),
            FilterDimension::Program => FilterValue::Program(value.parse().map_err(|_| unknown())?),
            FilterDimension::Scenario => {
                FilterValue::Scenario(value.parse().map_err(|_| unknown())?)
            }
            FilterDimension::Year => {
                FilterValue::Year(value.trim().parse().map_err(|_| unknown())?)
            }
            FilterDimension::CustomerType => {
                FilterValue::CustomerType(value.parse().map_err(|_| unknown())?)
            }
        };
        parsed.validate()?;
        Ok(parsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterValue {
    EvType(EvType),
    Program(Program),
    Scenario(Scenario),
    Year(u16),
    CustomerType(CustomerType),
}

impl FilterValue {
    pub fn dimension(self) -> FilterDimension {
        match self {
            FilterValue::EvType(_) => FilterDimension::EvType,
            FilterValue::Program(_) => FilterDimension::Program,
            FilterValue::Scenario(_) => FilterDimension::Scenario,
            FilterValue::Year(_) => FilterDimension::Year,
            FilterValue::CustomerType(_) => FilterDimension::CustomerType,
        }
    }

    fn validate(self) -> Result<()> {
        match self {
            FilterValue::Year(year) if !YEARS.contains(&year) => {
                Err(SupplyCurveError::UnknownFilterValue {
                    key: FilterDimension::Year.column().to_string(),
                    value: year.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn matches(self, key: &CurveKey) -> bool {
        match self {
            FilterValue::EvType(v) => key.ev_type == v,
            FilterValue::Program(v) => key.program == v,
            FilterValue::Scenario(v) => key.scenario == v,
            FilterValue::Year(v) => key.year == v,
            FilterValue::CustomerType(v) => key.customer_type == v,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveFilter {
    allowed: BTreeMap<FilterDimension, BTreeSet<FilterValue>>,
}

impl CurveFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: FilterValue) -> Result<()> {
        value.validate()?;
        self.allowed.entry(value.dimension()).or_default().insert(value);
        Ok(())
    }

    /// Builder form of [`CurveFilter::insert`].
    pub fn with(mut self, value: FilterValue) -> Result<Self> {
        self.insert(value)?;
        Ok(self)
    }

    /// Parse a `KEY=VALUE` pair such as `EV_Type=LDV`.
    pub fn parse_pair(pair: &str) -> Result<FilterValue> {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(SupplyCurveError::UnknownFilterKey {
                key: pair.trim().to_string(),
                expected: KEY_COLUMNS.join(", "),
            });
        };
        FilterDimension::from_column(key)?.parse_value(value)
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::new();
        for pair in pairs {
            filter.insert(Self::parse_pair(pair.as_ref())?)?;
        }
        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn matches(&self, key: &CurveKey) -> bool {
        self.allowed
            .values()
            .all(|values| values.iter().any(|v| v.matches(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(ev_type: EvType, program: Program, year: u16) -> CurveKey {
        CurveKey {
            ev_type,
            program,
            scenario: Scenario::High,
            year,
            customer_type: CustomerType::New,
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = CurveFilter::from_pairs(["Region=west"]).unwrap_err();
        assert!(matches!(err, SupplyCurveError::UnknownFilterKey { .. }));
    }

    #[test]
    fn values_outside_schema_are_rejected() {
        let err = CurveFilter::from_pairs(["Year=2027"]).unwrap_err();
        assert!(matches!(err, SupplyCurveError::UnknownFilterValue { .. }));
        let err = CurveFilter::from_pairs(["Program=V2G"]).unwrap_err();
        assert!(matches!(err, SupplyCurveError::UnknownFilterValue { .. }));
        assert!(CurveFilter::new().with(FilterValue::Year(2031)).is_err());
    }

    #[test]
    fn dimensions_and_values_combine() {
        let filter =
            CurveFilter::from_pairs(["EV_Type=LDV", "program=DLC", "Program=RTP"]).unwrap();
        assert!(filter.matches(&key(EvType::Ldv, Program::Dlc, 2025)));
        assert!(filter.matches(&key(EvType::Ldv, Program::Rtp, 2050)));
        assert!(!filter.matches(&key(EvType::Ldv, Program::Tou, 2025)));
        assert!(!filter.matches(&key(EvType::Mhdv, Program::Dlc, 2025)));
        assert!(CurveFilter::new().matches(&key(EvType::Mhdv, Program::Tou, 2040)));
    }
}
