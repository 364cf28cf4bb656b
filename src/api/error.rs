use thiserror::Error;

/// How a failure is surfaced to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Token rejected: forced logout
    Authentication,
    /// Request refused by the server: inline message
    Validation,
    /// Transport or server fault: generic alert
    Unknown,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized - please login again")]
    Unauthorized,

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Unauthorized => FailureKind::Authentication,
            ApiError::Rejected { .. } => FailureKind::Validation,
            ApiError::Server { .. } | ApiError::Network(_) | ApiError::Decode(_) => {
                FailureKind::Unknown
            }
        }
    }

    /// Build the error for a non-success status and its body
    pub fn from_status(status: u16, body: &str) -> Self {
        // Non-JSON bodies (HTML error pages) are not worth showing
        let message = server_message(body).unwrap_or_else(|| status_text(status));

        match status {
            401 => ApiError::Unauthorized,
            400..=499 => ApiError::Rejected { status, message },
            _ => ApiError::Server { status, message },
        }
    }
}

/// The `error` field of a JSON error body, if there is one
pub fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<super::models::ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|e| !e.trim().is_empty())
}

fn status_text(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()) {
        Some(reason) => format!("HTTP {} {}", status, reason),
        None => format!("HTTP {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(ApiError::from_status(401, "").kind(), FailureKind::Authentication);
        assert_eq!(ApiError::from_status(400, "").kind(), FailureKind::Validation);
        assert_eq!(ApiError::from_status(403, "").kind(), FailureKind::Validation);
        assert_eq!(ApiError::from_status(500, "").kind(), FailureKind::Unknown);
        assert_eq!(ApiError::Decode("bad".into()).kind(), FailureKind::Unknown);
    }

    #[test]
    fn test_server_error_text_is_used() {
        let err = ApiError::from_status(403, r#"{"error": "Account inactive"}"#);
        assert_eq!(err.to_string(), "Account inactive");
    }

    #[test]
    fn test_non_json_body_falls_back_to_status() {
        let html = "<!doctype html>\n<html><title>404 Not Found</title>\n<h1>Not Found</h1></html>";
        let err = ApiError::from_status(404, html);
        assert_eq!(err.to_string(), "HTTP 404 Not Found");

        let err = ApiError::from_status(422, "");
        assert_eq!(err.to_string(), "HTTP 422 Unprocessable Entity");

        let err = ApiError::from_status(499, "oops");
        assert_eq!(err.to_string(), "HTTP 499");
    }

    #[test]
    fn test_server_message() {
        assert_eq!(server_message(r#"{"error": "Email exists"}"#).as_deref(), Some("Email exists"));
        assert_eq!(server_message(r#"{"error": ""}"#), None);
        assert_eq!(server_message("{}"), None);
        assert_eq!(server_message("Not Found"), None);
    }
}
