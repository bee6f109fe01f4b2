//! Error types for seolens
//!
//! Library code reports failures through the [`Error`] hierarchy built with
//! `thiserror`. Callers that need the stable, serializable view of a failed
//! analysis convert it into an [`AnalysisError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for seolens operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// DOM snapshot and extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL parsed but uses a scheme other than http/https
    #[error("Unsupported URL scheme '{scheme}': {url}")]
    UnsupportedScheme {
        /// Offending scheme
        scheme: String,
        /// The URL as given
        url: String,
    },

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),

    /// HTTP error
    #[error("HTTP error {status}: {message}")]
    HttpError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },
}

/// Errors raised while capturing or analysing the DOM
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Script evaluation threw inside the render context
    #[error("Script evaluation failed: {0}")]
    ScriptFailed(String),

    /// The serialized snapshot did not have the expected shape
    #[error("Malformed DOM snapshot: {0}")]
    SnapshotMalformed(String),

    /// An extractor task panicked or was cancelled
    #[error("Extractor '{extractor}' failed: {message}")]
    ExtractorPanicked {
        /// Extractor name
        extractor: &'static str,
        /// Join error text
        message: String,
    },

    /// A JSON-LD block could not be parsed
    #[error("Malformed JSON-LD block: {0}")]
    MalformedJsonLd(String),
}

/// Result type alias for seolens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Public classification of a failed analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The rendering collaborator could not load the URL
    NavigationFailed,
    /// DOM or script evaluation failed inside the render context
    EvaluationFailed,
    /// A JSON-LD block failed to parse; recovered locally, never fatal
    MalformedJsonLd,
    /// The URL was rejected before navigation (unparseable or not http/https)
    UnsupportedUrlScheme,
}

impl ErrorKind {
    /// Stable label, used for metrics and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NavigationFailed => "navigation_failed",
            ErrorKind::EvaluationFailed => "evaluation_failed",
            ErrorKind::MalformedJsonLd => "malformed_json_ld",
            ErrorKind::UnsupportedUrlScheme => "unsupported_url_scheme",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable error result for one analyzed URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisError {
    /// Failure classification
    pub kind: ErrorKind,
    /// Human readable message
    pub message: String,
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AnalysisError {}

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Classify this error into one of the public [`ErrorKind`]s
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Navigation(
                NavigationError::UnsupportedScheme { .. } | NavigationError::InvalidUrl(_),
            ) => ErrorKind::UnsupportedUrlScheme,
            Error::Navigation(_) | Error::Browser(_) | Error::Io(_) => ErrorKind::NavigationFailed,
            Error::Extraction(ExtractionError::MalformedJsonLd(_)) => ErrorKind::MalformedJsonLd,
            Error::Extraction(_) | Error::Json(_) | Error::Cdp(_) | Error::Generic(_) => {
                ErrorKind::EvaluationFailed
            }
        }
    }
}

impl From<Error> for AnalysisError {
    fn from(err: Error) -> Self {
        AnalysisError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_navigation_error() {
        let err = NavigationError::HttpError {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn test_kind_mapping() {
        let err: Error = NavigationError::UnsupportedScheme {
            scheme: "ftp".to_string(),
            url: "ftp://example.com".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::UnsupportedUrlScheme);

        let err: Error = NavigationError::Timeout(30000).into();
        assert_eq!(err.kind(), ErrorKind::NavigationFailed);

        let err: Error = ExtractionError::ScriptFailed("ReferenceError".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::EvaluationFailed);

        let err: Error = ExtractionError::MalformedJsonLd("eof".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::MalformedJsonLd);
    }

    #[test]
    fn test_analysis_error_serialization() {
        let err = AnalysisError::from(Error::from(NavigationError::Timeout(500)));
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"NavigationFailed","message":"Navigation error: Navigation timed out after 500ms"}"#
        );
    }

    #[test]
    fn test_generic_error() {
        let err = Error::generic("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
        assert_eq!(err.kind(), ErrorKind::EvaluationFailed);
    }
}
