//! Result and error types for wikiprobe.

use thiserror::Error;

/// Result type for wikiprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a page
///
/// Page objects never catch or rewrap these; every variant reaches the
/// scenario unchanged.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A defining element of a component did not become visible in time
    #[error("{message} ({component}: {locator} not visible)")]
    NotLoaded {
        /// Component or page name
        component: String,
        /// Caller-supplied or default message
        message: String,
        /// Description of the locator that failed
        locator: String,
    },

    /// An action target never became actionable in time
    #[error("{action} on {locator} timed out after {ms}ms")]
    InteractionTimeout {
        /// Action name (click, fill, ...)
        action: String,
        /// Description of the target locator
        locator: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// A queried value did not match the expected value
    #[error("{message}: expected {expected}, got {actual}")]
    AssertionMismatch {
        /// Assertion message
        message: String,
        /// Expected value
        expected: String,
        /// Last observed value
        actual: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Page driver error (protocol failure, detached element, bad selector)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Scenario exceeded its overall time budget
    #[error("Scenario timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// URL parse error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an assertion mismatch
    #[must_use]
    pub fn mismatch(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::AssertionMismatch {
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Short category name used in reports
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotLoaded { .. } => "not-loaded",
            Self::InteractionTimeout { .. } => "interaction-timeout",
            Self::AssertionMismatch { .. } => "assertion-mismatch",
            Self::Navigation { .. } => "navigation",
            Self::Driver { .. } => "driver",
            Self::BrowserLaunch { .. } => "browser-launch",
            Self::Timeout { .. } => "timeout",
            Self::Config { .. } | Self::Url(_) | Self::Yaml(_) => "config",
            Self::Io(_) | Self::Json(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_loaded_message_leads() {
        let err = ProbeError::NotLoaded {
            component: "NavBar".to_string(),
            message: "Expected NavBar to be loaded".to_string(),
            locator: "css=.mw-logo".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("Expected NavBar to be loaded"));
        assert!(text.contains("css=.mw-logo"));
        assert_eq!(err.kind(), "not-loaded");
    }

    #[test]
    fn test_mismatch_display() {
        let err = ProbeError::mismatch("title", "\"a\"", "\"b\"");
        assert_eq!(err.to_string(), "title: expected \"a\", got \"b\"");
    }

    #[test]
    fn test_from_url_error() {
        let err: ProbeError = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(err.kind(), "config");
    }
}
