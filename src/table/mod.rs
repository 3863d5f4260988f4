//! Supply-curve tables.
//!
//! - cross-product builds and persistence (`builder`)
//! - cost/enrollment queries against a loaded table (`query`)

pub mod builder;
pub mod query;

pub use builder::*;
pub use query::*;
