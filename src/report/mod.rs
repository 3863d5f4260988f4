//! Reporting utilities: formatted terminal output for builds, queries and curves.

pub mod format;

pub use format::*;
