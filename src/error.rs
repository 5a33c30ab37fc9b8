use reqwest::StatusCode;
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation error (missing columns, bad quantity cells).
    /// Raised before any row is processed or any network call is made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Input workbook could not be opened or read
    #[error("Input file error: {0}")]
    InputFile(String),

    /// Output workbook could not be assembled or written
    #[error("Report error: {0}")]
    Report(String),

    /// Secondary save location invalid or inaccessible (non-fatal)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Upstream API error (non-success status)
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },

    /// HTTP request error (preserves reqwest::Error for transport detection)
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
}

impl From<calamine::Error> for AppError {
    fn from(err: calamine::Error) -> Self {
        Self::InputFile(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Report(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::Validation("missing 'MeterId' column".to_string());
        assert_eq!(
            error.to_string(),
            "Validation error: missing 'MeterId' column"
        );
    }

    #[test]
    fn test_upstream_error_display() {
        let error = AppError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "throttled".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Upstream error (503 Service Unavailable): throttled"
        );
    }
}
