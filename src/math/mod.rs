//! Mathematical utilities: the enrollment response curve.

pub mod response;

pub use response::*;
