//! Input/output helpers.
//!
//! - scenario-input CSV ingest + validation (`ingest`)
//! - cost and beta table exports (`export`)
//! - cost table reads (`table`)
//! - build manifest JSON read/write (`manifest`)

pub mod export;
pub mod ingest;
pub mod manifest;
pub mod table;

pub use export::*;
pub use ingest::*;
pub use manifest::*;
pub use table::*;
