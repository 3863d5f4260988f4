//! `evmc-supply-curves` library crate.
//!
//! Builds EV managed-charging supply curves (cost per vehicle versus
//! enrollment percent) and answers cost and enrollment queries against them.
//! The binary (`evmc`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - tables can be built and queried from other Rust code
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod curve;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod table;
