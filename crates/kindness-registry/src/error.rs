use crate::config::ConfigError;
use crate::registry::{RegistryError, RowLoadError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Rows(RowLoadError),
    Registry(RegistryError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Rows(err) => write!(f, "import file error: {}", err),
            AppError::Registry(err) => write!(f, "registry error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Rows(err) => Some(err),
            AppError::Registry(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Rows(_)
            | AppError::Registry(RegistryError::Format(_) | RegistryError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Registry(RegistryError::Conflict { .. }) => StatusCode::CONFLICT,
            AppError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Registry(RegistryError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "success": false, "message": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RowLoadError> for AppError {
    fn from(value: RowLoadError) -> Self {
        Self::Rows(value)
    }
}

impl From<RegistryError> for AppError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<crate::registry::StoreError> for AppError {
    fn from(value: crate::registry::StoreError) -> Self {
        Self::Registry(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{PositionId, StoreError};

    #[test]
    fn registry_errors_map_to_distinct_statuses() {
        let cases = [
            (
                AppError::from(RegistryError::Conflict {
                    code: "1FAF3F:001".to_string(),
                }),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(RegistryError::NotFound(PositionId(3))),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(StoreError::Unavailable("offline".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Config(ConfigError::InvalidPort), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
