//! Error types for work division

use std::fmt;

/// Result type for work-division operations
pub type Result<T> = std::result::Result<T, WorkDivError>;

/// Errors raised while partitioning work or answering work-division queries
///
/// None of these are transient: callers must handle them, there is nothing to retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkDivError {
    /// A requested grid extent has a zero (or negative) component
    #[error("invalid extent: axis {axis} has extent {value}, every axis must be at least 1")]
    InvalidExtent { axis: usize, value: i64 },

    /// A product of extent components does not fit into `usize`
    #[error("capacity overflow: {what} exceeds the representable range")]
    CapacityOverflow { what: String },

    /// The back-end does not publish this origin/unit/dimensionality combination
    #[error("unsupported query: {backend} cannot answer {origin}/{unit} for {dim} dimension(s)")]
    UnsupportedQuery {
        backend: String,
        origin: String,
        unit: String,
        dim: usize,
    },

    /// A block or thread index lies outside its extent
    #[error("index out of range: axis {axis} has index {index}, extent is {extent}")]
    IndexOutOfRange { axis: usize, index: usize, extent: usize },

    /// Hardware limits with a zero component
    #[error("invalid hardware limits: {0}")]
    InvalidLimits(String),

    /// The device property source could not produce a device
    #[error("device unavailable for {backend}: {reason}")]
    DeviceUnavailable { backend: String, reason: String },

    /// No back-end of the requested kind is enabled
    #[error("back-end {0} is not enabled")]
    BackendNotEnabled(String),

    /// The enabled back-end set is empty
    #[error("no back-ends enabled")]
    NoBackends,

    /// A work extent does not fit the device it is launched on
    #[error("work extent {extent} exceeds the limits of {backend}: {reason}")]
    ExceedsLimits {
        backend: String,
        extent: String,
        reason: String,
    },

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl WorkDivError {
    /// Create a capacity overflow error
    pub fn overflow(what: impl Into<String>) -> Self {
        Self::CapacityOverflow { what: what.into() }
    }

    /// Create a device unavailable error
    pub fn device_unavailable(backend: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            backend: backend.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
