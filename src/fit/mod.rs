//! Curve calibration and population synthesis.
//!
//! Responsibilities:
//!
//! - fit the response-curve decay rates from the anchor point (`beta`)
//! - build the discretized customer population (`population`)

pub mod beta;
pub mod population;

pub use beta::*;
pub use population::*;
