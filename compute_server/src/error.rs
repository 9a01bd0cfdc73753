// THEORY:
// `ApiError` is everything a request can fail with: an engine's `ComputeError`
// passed through untouched, plus the failures that only exist at the boundary
// (over-limit requests, timeouts, a dead worker pool, bodies that are not the
// expected JSON). Each one renders as the same `{errorKind, message}` body with
// a status code chosen by class:
//
//   400  InvalidInput, EmptyInput, MalformedNumericList, unparseable bodies
//   422  MalformedMatrix, DimensionMismatch, UnsupportedFormat
//   413  LimitExceeded
//   504  Timeout
//   500  worker failure

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use compute_engine::{ComputeError, ErrorKind, LimitError};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Compute(#[from] ComputeError),
    #[error(transparent)]
    LimitExceeded(#[from] LimitError),
    #[error("operation did not finish within {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("worker pool is unavailable")]
    WorkerUnavailable,
    #[error("{0}")]
    BadRequest(String),
}

/// Wire shape of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_kind: String,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Compute(error) => match error.kind() {
                ErrorKind::InvalidInput | ErrorKind::EmptyInput | ErrorKind::MalformedNumericList => {
                    StatusCode::BAD_REQUEST
                }
                ErrorKind::MalformedMatrix
                | ErrorKind::DimensionMismatch
                | ErrorKind::UnsupportedFormat => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::LimitExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::WorkerUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_kind(&self) -> &'static str {
        match self {
            ApiError::Compute(error) => error.kind().as_str(),
            ApiError::LimitExceeded(_) => "LimitExceeded",
            ApiError::Timeout(_) => "Timeout",
            ApiError::WorkerUnavailable => "Internal",
            ApiError::BadRequest(_) => ErrorKind::InvalidInput.as_str(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        let message = match self {
            ApiError::Compute(error) => error.message().to_string(),
            other => other.to_string(),
        };
        ErrorBody {
            error_kind: self.error_kind().to_string(),
            message,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::LimitExceeded(LimitError::Exceeded {
                operation: "request",
                detail: rejection.body_text(),
            })
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_by_class() {
        let cases = [
            (ComputeError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (ComputeError::EmptyInput("x".into()), StatusCode::BAD_REQUEST),
            (ComputeError::MalformedNumericList("x".into()), StatusCode::BAD_REQUEST),
            (ComputeError::MalformedMatrix("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ComputeError::DimensionMismatch("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ComputeError::UnsupportedFormat("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (error, status) in cases {
            let kind = error.kind().as_str();
            let api = ApiError::from(error);
            assert_eq!(api.status(), status);
            assert_eq!(api.body().error_kind, kind);
            assert_eq!(api.body().message, "x");
        }
    }

    #[test]
    fn boundary_errors_map_to_their_statuses() {
        let limit = ApiError::from(LimitError::Exceeded {
            operation: "factorial",
            detail: "n = 9 exceeds 1".into(),
        });
        assert_eq!(limit.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(limit.error_kind(), "LimitExceeded");

        assert_eq!(ApiError::Timeout(Duration::from_secs(1)).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ApiError::WorkerUnavailable.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::BadRequest("no body".into()).error_kind(), "InvalidInput");
    }

    #[test]
    fn body_uses_camel_case_keys() {
        let body = ApiError::WorkerUnavailable.body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"errorKind": "Internal", "message": "worker pool is unavailable"})
        );
    }
}
