//! Result and error types for uiprobe.
//!
//! Every failure surfaces to the running scenario unchanged; nothing in the
//! harness recovers locally. The variants carry enough context (locator,
//! expected vs. observed, elapsed time) for a failure report to stand alone.

use thiserror::Error;

/// Result type for uiprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A locator did not resolve to exactly one element in time.
    ///
    /// `matched == 0` means nothing matched before the timeout; `matched > 1`
    /// is a strict-mode violation where a single target was required.
    #[error("{}", not_found_message(locator, *matched, *timeout_ms))]
    NotFound {
        /// Rendered locator description
        locator: String,
        /// Number of elements that matched
        matched: usize,
        /// Actionability timeout that applied
        timeout_ms: u64,
    },

    /// The element was found but the interaction could not be performed
    #[error("Cannot interact with {locator}: {reason}")]
    Interaction {
        /// Rendered locator description (or file path for uploads)
        locator: String,
        /// Why the interaction was refused
        reason: String,
    },

    /// A polling wait or event wait ran out of time
    #[error(
        "Timed out after {elapsed_ms}ms (limit {timeout_ms}ms) waiting for {waited_for}; last observed: {}",
        last_observed.as_deref().unwrap_or("nothing")
    )]
    Timeout {
        /// What was being waited for
        waited_for: String,
        /// Configured limit in milliseconds
        timeout_ms: u64,
        /// Time actually spent waiting
        elapsed_ms: u64,
        /// Last value the predicate observed, if any
        last_observed: Option<String>,
    },

    /// A dialog appeared while no handler was registered
    #[error("Unhandled {kind} dialog: {message:?}")]
    UnhandledDialog {
        /// Dialog kind (alert, confirm, prompt, beforeunload)
        kind: String,
        /// Dialog message text
        message: String,
    },

    /// An explicit check failed
    #[error("Assertion failed: expected {expected}, observed {observed}")]
    AssertionFailed {
        /// Expected condition
        expected: String,
        /// What was actually observed
        observed: String,
    },

    /// Dialog handshake was driven through an invalid transition
    #[error("Dialog error: {message}")]
    Dialog {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// The automation backend reported a failure
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

    /// Fixture error (section setup failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

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

fn not_found_message(locator: &str, matched: usize, timeout_ms: u64) -> String {
    if matched == 0 {
        format!("No element matched {locator} within {timeout_ms}ms")
    } else {
        format!("Strict mode violation: {locator} resolved to {matched} elements")
    }
}

impl ProbeError {
    /// Backend failure with a message
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Refused interaction on a locator
    pub fn interaction(locator: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::Interaction {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }

    /// Failed explicit check
    pub fn assertion(expected: impl Into<String>, observed: impl Into<String>) -> Self {
        Self::AssertionFailed {
            expected: expected.into(),
            observed: observed.into(),
        }
    }

    /// Whether this error is a timeout of a polling or event wait
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error aborts the scenario regardless of what follows
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnhandledDialog { .. } | Self::BrowserLaunch { .. })
    }
}
