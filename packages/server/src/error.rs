//! Mapping from probe failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pora_volume::Error as VolumeError;

/// A failed request, rendered as a plain-text body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Forbidden(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Internal(msg) => msg,
        };
        (status, body).into_response()
    }
}

impl From<VolumeError> for ApiError {
    fn from(error: VolumeError) -> Self {
        let message = error.to_string();
        match error {
            VolumeError::NotFound { .. } => ApiError::NotFound(message),
            VolumeError::InvalidInput { .. } => ApiError::BadRequest(message),
            VolumeError::PermissionDenied { .. } => ApiError::Forbidden(message),
            VolumeError::MountNotFound
            | VolumeError::Io { .. }
            | VolumeError::DataIntegrity { .. } => ApiError::Internal(message),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("probe task failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pora_volume::Phase;
    use std::io;
    use std::path::PathBuf;

    fn status_of(error: VolumeError) -> StatusCode {
        ApiError::from(error).status()
    }

    fn io_error() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "boom")
    }

    #[test]
    fn volume_errors_map_to_statuses() {
        assert_eq!(
            status_of(VolumeError::MountNotFound),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(VolumeError::Io {
                phase: Phase::Writing,
                source: io_error()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(VolumeError::DataIntegrity {
                path: PathBuf::from("/mnt/poraload-x"),
                iteration: 0
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(VolumeError::NotFound {
                name: "x".to_string(),
                source: io_error()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(VolumeError::InvalidInput {
                message: "bad".to_string()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(VolumeError::PermissionDenied {
                name: "x".to_string(),
                source: io_error()
            }),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn message_is_carried() {
        match ApiError::from(VolumeError::MountNotFound) {
            ApiError::Internal(msg) => assert!(msg.contains("container_dir")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
