use std::path::PathBuf;

use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
    #[error("content seed `{path}` is invalid: {message}")]
    Seed { path: PathBuf, message: String },
}

impl InfraError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }

    pub fn seed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Seed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn inconsistent_seed(path: impl Into<PathBuf>, error: &DomainError) -> Self {
        Self::seed(path, error.to_string())
    }
}
