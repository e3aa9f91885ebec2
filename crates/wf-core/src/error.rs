//! Error types for the wheel workspace

use thiserror::Error;

/// Core error type
///
/// Spin requests never produce errors; rejected spins are silent. These
/// variants cover the edges: configuration, segment replacement and export.
#[derive(Error, Debug)]
pub enum WfError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Segment list cannot change while a spin session is active")]
    SessionActive,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Audio error: {0}")]
    Audio(String),
}

/// Result type alias
pub type WfResult<T> = Result<T, WfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WfError::InvalidConfig("stop_velocity must be positive".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: stop_velocity must be positive"
        );

        let io: WfError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, WfError::Io(_)));
    }
}
