use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kernel::ErrorResponse;
use thiserror::Error;

use crate::assets::AssetError;
use crate::intake::IntakeError;

/// Every failure a handler can report. Each maps to one status and code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("Malformed multipart request: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Invalid batch id '{0}'")]
    InvalidBatchId(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Intake(e) => match e {
                IntakeError::EmptyRequest
                | IntakeError::TooManyFiles { .. }
                | IntakeError::InvalidName(_) => StatusCode::BAD_REQUEST,
                IntakeError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                IntakeError::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                IntakeError::StorageWrite { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Asset(e) => match e {
                AssetError::InvalidName(_) => StatusCode::BAD_REQUEST,
                AssetError::NotFound(_) => StatusCode::NOT_FOUND,
                AssetError::Read { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            // Body limit hits surface as multipart errors
            ApiError::Multipart(e) => e.status(),
            ApiError::InvalidBody(_) | ApiError::InvalidBatchId(_) => StatusCode::BAD_REQUEST,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Intake(e) => match e {
                IntakeError::EmptyRequest => "empty_request",
                IntakeError::TooManyFiles { .. } => "too_many_files",
                IntakeError::FileTooLarge { .. } => "file_too_large",
                IntakeError::UnsupportedType { .. } => "unsupported_media_type",
                IntakeError::InvalidName(_) => "invalid_name",
                IntakeError::StorageWrite { .. } => "storage_write_failed",
            },
            ApiError::Asset(e) => match e {
                AssetError::InvalidName(_) => "invalid_name",
                AssetError::NotFound(_) => "not_found",
                AssetError::Read { .. } => "storage_read_failed",
            },
            ApiError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                "file_too_large"
            }
            ApiError::Multipart(_) => "malformed_request",
            ApiError::InvalidBody(_) => "invalid_body",
            ApiError::InvalidBatchId(_) => "invalid_batch_id",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        if status.is_server_error() {
            tracing::error!(code, "{}", self);
        } else {
            tracing::warn!(code, "{}", self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_owned(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namer::InvalidNameError;
    use rstest::rstest;
    use std::io;

    #[rstest]
    #[case(ApiError::Intake(IntakeError::EmptyRequest), StatusCode::BAD_REQUEST, "empty_request")]
    #[case(ApiError::Intake(IntakeError::TooManyFiles { max: 3 }), StatusCode::BAD_REQUEST, "too_many_files")]
    #[case(
        ApiError::Intake(IntakeError::FileTooLarge { name: "a".into(), max: 1 }),
        StatusCode::PAYLOAD_TOO_LARGE,
        "file_too_large"
    )]
    #[case(
        ApiError::Intake(IntakeError::UnsupportedType { name: "a".into(), content_type: "text/plain".into() }),
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        "unsupported_media_type"
    )]
    #[case(
        ApiError::Intake(IntakeError::InvalidName(InvalidNameError::new("..", "bad"))),
        StatusCode::BAD_REQUEST,
        "invalid_name"
    )]
    #[case(
        ApiError::Intake(IntakeError::StorageWrite { name: "a".into(), source: io::Error::other("disk full") }),
        StatusCode::INTERNAL_SERVER_ERROR,
        "storage_write_failed"
    )]
    #[case(ApiError::Asset(AssetError::NotFound("a".into())), StatusCode::NOT_FOUND, "not_found")]
    #[case(ApiError::InvalidBody("x".into()), StatusCode::BAD_REQUEST, "invalid_body")]
    #[case(ApiError::InvalidBatchId("x".into()), StatusCode::BAD_REQUEST, "invalid_batch_id")]
    fn status_and_code(
        #[case] error: ApiError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        assert_eq!(error.status(), status);
        assert_eq!(error.code(), code);
    }

    #[tokio::test]
    async fn empty_request_message() {
        // Arrange
        let error = ApiError::Intake(IntakeError::EmptyRequest);

        // Act
        let response = error.into_response();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "At least one photo is required.");
        assert_eq!(body.code, "empty_request");
    }
}
