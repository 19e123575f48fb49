use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::filter::FilterError, application::repos::RepoError, cache::CacheError,
    domain::error::DomainError, infra::error::InfraError,
};

/// Diagnostic chain attached to error responses for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            public_message,
            report: ErrorReport::from_message(source, status, detail),
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        Self {
            status,
            public_message,
            report: ErrorReport::from_error(source, status, error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<FilterError> for HttpError {
    fn from(error: FilterError) -> Self {
        const SOURCE: &str = "infra::http::filter_error_to_http_error";
        match &error {
            FilterError::Repo(RepoError::InvalidQuery { .. }) => HttpError::from_error(
                SOURCE,
                StatusCode::BAD_REQUEST,
                "Request could not be processed",
                &error,
            ),
            FilterError::Repo(RepoError::Persistence(_)) | FilterError::Cache(_) => {
                HttpError::from_error(
                    SOURCE,
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable",
                    &error,
                )
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<CacheError> for AppError {
    fn from(error: CacheError) -> Self {
        Self::Filter(FilterError::from(error))
    }
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Filter(FilterError::Repo(RepoError::InvalidQuery { .. })) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Filter(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Domain(_) | AppError::Infra(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Filter(FilterError::Repo(RepoError::InvalidQuery { .. })) => {
                "Request could not be processed"
            }
            AppError::Filter(_) => "Service temporarily unavailable",
            AppError::Domain(_) => "Content seed is inconsistent",
            AppError::Infra(InfraError::Configuration { .. }) => "Service misconfigured",
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(InfraError::Io(_)) => "I/O failure during request",
            AppError::Infra(InfraError::Seed { .. }) => "Content seed could not be loaded",
            AppError::Unexpected(_) => "Unexpected error occurred",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.presentation_message();
        let report = ErrorReport::from_error("application::error::AppError", status, &self);
        let mut response = (status, message).into_response();
        report.attach(&mut response);
        response
    }
}
