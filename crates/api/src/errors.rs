use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ferrous_doh_domain::DomainError;
use serde_json::json;
use tracing::warn;

/// SERVFAIL rcode used in every error body.
const ERROR_STATUS: u16 = 2;

pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            DomainError::UnsupportedContentType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, self.0.to_string())
            }

            err if err.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()),

            err @ DomainError::AllUpstreamsFailed(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("DNS query failure ({})", err),
            ),
            err if err.is_transport_error() => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("DNS query failure ({})", err),
            ),

            err => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %message, "DoH request failed");
        }

        (
            status,
            Json(json!({ "Status": ERROR_STATUS, "Comment": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped(err: DomainError) -> (StatusCode, String) {
        ApiError(err).status_and_message()
    }

    #[test]
    fn test_content_type_is_415() {
        let (status, message) = mapped(DomainError::UnsupportedContentType("text/plain".into()));
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(message, "Invalid argument value: \"ct\" = \"text/plain\"");
    }

    #[test]
    fn test_client_errors_are_400() {
        let (status, _) = mapped(DomainError::InvalidArgument {
            name: "cd",
            value: "maybe".into(),
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(mapped(DomainError::NoQuestion).0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_failure_is_503() {
        let (status, message) = mapped(DomainError::AllUpstreamsFailed("timeout".into()));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            message,
            "DNS query failure (all upstream servers failed: timeout)"
        );
    }

    #[test]
    fn test_serialization_is_500() {
        let (status, message) = mapped(DomainError::Serialization("bad label".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "DNS packet parse failure (bad label)");
    }
}
