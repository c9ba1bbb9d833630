//! Value assertions for already-queried page state.

use crate::result::{ProbeError, ProbeResult};

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
    /// Expected value, rendered
    pub expected: String,
    /// Actual value, rendered
    pub actual: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
            expected: String::new(),
            actual: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            passed: false,
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Replace the message of a failing result
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        if !self.passed {
            self.message = message.into();
        }
        self
    }

    /// Replace the message of a failing result when a caller supplied one
    #[must_use]
    pub fn with_message_override(self, message: Option<&str>) -> Self {
        match message {
            Some(message) => self.with_message(message),
            None => self,
        }
    }

    /// Turn a failure into [`ProbeError::AssertionMismatch`]
    pub fn into_result(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::AssertionMismatch {
                message: self.message,
                expected: self.expected,
                actual: self.actual,
            })
        }
    }
}

/// Assertion helpers for page state
#[derive(Debug)]
pub struct Assertion;

impl Assertion {
    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message, "true", "false")
        }
    }

    /// Assert a string is not empty
    #[must_use]
    pub fn not_empty(value: &str, message: &str) -> AssertionResult {
        if value.is_empty() {
            AssertionResult::fail(message, "non-empty text", "\"\"")
        } else {
            AssertionResult::pass()
        }
    }

    /// Assert a count is greater than `min`
    #[must_use]
    pub fn greater_than(value: usize, min: usize, message: &str) -> AssertionResult {
        if value > min {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message, format!("> {min}"), value.to_string())
        }
    }
}
