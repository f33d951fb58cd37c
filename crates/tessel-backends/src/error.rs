//! Error types for back-end operations

use tessel_workdiv::WorkDivError;

/// Result type for back-end operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors raised while building back-ends or launching work on them
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Work division failed (partitioning, limits, queries)
    #[error(transparent)]
    WorkDiv(#[from] WorkDivError),

    /// Device index outside the device table
    #[error("invalid device index {index} (device count: {count})")]
    InvalidDevice { index: usize, count: usize },

    /// The back-end's worker pool could not be created
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    /// The back-end was compiled out
    #[error("back-end {0} is not compiled in (enable its cargo feature)")]
    NotCompiled(String),

    /// Invalid back-end configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BackendError {
    /// Create a thread pool error
    pub fn thread_pool(msg: impl Into<String>) -> Self {
        Self::ThreadPool(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// The underlying work-division error, if that is what failed
    pub fn as_work_div(&self) -> Option<&WorkDivError> {
        match self {
            Self::WorkDiv(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_div_errors_convert() {
        fn fails() -> Result<()> {
            Err(WorkDivError::NoBackends)?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert_eq!(err.as_work_div(), Some(&WorkDivError::NoBackends));
        assert_eq!(err.to_string(), "no back-ends enabled");
    }

    #[test]
    fn test_display() {
        let err = BackendError::InvalidDevice { index: 3, count: 1 };
        assert_eq!(err.to_string(), "invalid device index 3 (device count: 1)");
        assert!(BackendError::thread_pool("boom").to_string().contains("boom"));
    }
}
