use std::path::PathBuf;

use thiserror::Error;

/// Violations of the threshold step ordering rules.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ThresholdsError {
    #[error("Thresholds must have at least one step.")]
    NoSteps,
    #[error("Only the first threshold step may be unbounded, found an unbounded step at {index}.")]
    UnboundedStepNotFirst { index: usize },
    #[error("Threshold step {index} has a non-finite value {value}.")]
    NonFiniteValue { index: usize, value: f64 },
    #[error(
        "Threshold steps must be strictly increasing, step {index} has value {value} after \
         {previous}."
    )]
    NotIncreasing { index: usize, previous: f64, value: f64 },
}

/// Structural errors detected when building a dashboard.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DashboardError {
    #[error("Dashboard uid must not be empty.")]
    EmptyUid,
    #[error("Duplicate dashboard tag: {0:?}.")]
    DuplicateTag(String),
    #[error("Panel {panel:?} has more than one query with refId {ref_id:?}.")]
    DuplicateRefId { panel: String, ref_id: String },
    #[error(
        "Panel {panel:?} has size {width}x{height}; width must be within 1..={max_width} and \
         height must be positive."
    )]
    InvalidPanelSize { panel: String, width: u32, height: u32, max_width: u32 },
    #[error("Panel {panel:?} has a non-finite axis minimum {value}.")]
    NonFiniteMin { panel: String, value: f64 },
    #[error("Row {row:?} does not fit on the dashboard grid.")]
    GridOverflow { row: String },
    #[error("Panel {panel:?} has invalid thresholds: {source}")]
    InvalidThresholds {
        panel: String,
        #[source]
        source: ThresholdsError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),
}
