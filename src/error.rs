//! Error types.
//!
//! Library code returns [`SupplyCurveError`]; the binary converts it into an
//! [`AppError`] carrying the process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Broad category of a [`SupplyCurveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing inputs/settings. Fatal, never retried.
    Configuration,
    /// A query or command argument outside its accepted domain.
    CallerInput,
    /// An operation issued against the wrong table state.
    State,
    /// Filesystem or encoding failure.
    Io,
}

#[derive(Debug, Error)]
pub enum SupplyCurveError {
    #[error("No scenario inputs found at '{}'.", path.display())]
    MissingScenarioInputs { path: PathBuf },

    #[error("Invalid scenario inputs in '{}' (line {line}): {message}", path.display())]
    InvalidScenarioInputs {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error(
        "Invalid anchor for {key}: enrollment_anch={anchor} with upper_limit={upper} gives a log argument of {log_arg}; the anchor must lie strictly between 0 and the upper limit."
    )]
    InvalidAnchor {
        key: String,
        anchor: f64,
        upper: f64,
        log_arg: f64,
    },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("percent must be in (0, 100], got {0}")]
    PercentOutOfRange(i64),

    #[error("precision must be at least 1, got {0}")]
    InvalidPrecision(i64),

    #[error("Enrollment resolution must be between 1 and 100 percent, got {0}")]
    InvalidResolution(u32),

    #[error("Customer resolution must be greater than zero.")]
    InvalidCustomerResolution,

    #[error("{key} is not a defined parameter, expected parameters are {expected}")]
    UnknownFilterKey { key: String, expected: String },

    #[error("{value} is not an option for {key}, see values in cost table for examples")]
    UnknownFilterValue { key: String, value: String },

    #[error("No '{column}' column in the {resolution}% cost table.")]
    MissingEnrollmentColumn { column: String, resolution: u32 },

    #[error("No scenario input row for {0}.")]
    ScenarioRowNotFound(String),

    #[error("Duplicate scenario input rows for {0}.")]
    DuplicateScenarioRow(String),

    #[error("No cost table specified for query. Load a table first.")]
    NoTableLoaded,

    #[error(
        "No cost table found. Check that a table with {resolution}% resolution exists and the path to the table is correct: {}\nIf no table exists, build one first.",
        path.display()
    )]
    TableNotFound { resolution: u32, path: PathBuf },

    #[error(
        "A table for a resolution of {resolution}% already exists at {}\nTo replace it, build with overwrite enabled, or choose another output directory.",
        path.display()
    )]
    TableExists { resolution: u32, path: PathBuf },

    #[error("Malformed cost table '{}': {message}", path.display())]
    MalformedTable { path: PathBuf, message: String },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error on '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl SupplyCurveError {
    pub fn kind(&self) -> ErrorKind {
        use SupplyCurveError::*;
        match self {
            MissingScenarioInputs { .. }
            | InvalidScenarioInputs { .. }
            | InvalidAnchor { .. }
            | InvalidSettings(_) => ErrorKind::Configuration,
            PercentOutOfRange(_)
            | InvalidPrecision(_)
            | InvalidResolution(_)
            | InvalidCustomerResolution
            | UnknownFilterKey { .. }
            | UnknownFilterValue { .. }
            | MissingEnrollmentColumn { .. }
            | ScenarioRowNotFound(_)
            | DuplicateScenarioRow(_) => ErrorKind::CallerInput,
            NoTableLoaded | TableNotFound { .. } | TableExists { .. } => ErrorKind::State,
            MalformedTable { .. } | Io { .. } | Csv { .. } | Json(_) | Yaml { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = SupplyCurveError> = std::result::Result<T, E>;

/// Error surfaced by the `evmc` binary: a message plus an exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<SupplyCurveError> for AppError {
    fn from(err: SupplyCurveError) -> Self {
        let exit_code = match err.kind() {
            ErrorKind::Configuration | ErrorKind::CallerInput => 2,
            ErrorKind::State => 3,
            ErrorKind::Io => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
