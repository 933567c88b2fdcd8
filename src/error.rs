use thiserror::Error;

/// Application-level error carried up to `main`.
///
/// Exit codes:
/// - `2`: bad input, configuration or file IO
/// - `3`: no usable data after ingest
/// - `4`: computation failure
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

/// Errors raised by the discovery-curve and fitting core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RarefactionError {
    /// A sample entry is malformed; the whole curve is rejected because every
    /// later cumulative count depends on it.
    #[error("invalid sample at index {index}: {message}")]
    InvalidInput { index: usize, message: String },

    /// The x values carry no variance, so the slope is undefined.
    #[error("degenerate fit: x values have no variance")]
    DegenerateFit,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RarefactionError {
    pub fn invalid_input(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            index,
            message: message.into(),
        }
    }
}

impl From<RarefactionError> for AppError {
    fn from(err: RarefactionError) -> Self {
        let code = match err {
            RarefactionError::InvalidInput { .. } | RarefactionError::InvalidConfig(_) => 2,
            RarefactionError::DegenerateFit => 4,
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let e: AppError = RarefactionError::invalid_input(3, "blank name").into();
        assert_eq!(e.exit_code(), 2);
        assert!(e.to_string().contains("index 3"), "got {e}");

        let e: AppError = RarefactionError::DegenerateFit.into();
        assert_eq!(e.exit_code(), 4);
    }
}
