//! Settings and logging.

pub mod logging;
pub mod settings;

pub use logging::*;
pub use settings::*;
