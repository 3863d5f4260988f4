//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - categorical dimensions (`EvType`, `Program`, `Scenario`, `CustomerType`)
//! - scenario inputs and fitted curve parameters
//! - synthetic customers and persisted supply-curve rows
//! - typed query filters (`CurveFilter`)

pub mod filter;
pub mod types;

pub use filter::*;
pub use types::*;
