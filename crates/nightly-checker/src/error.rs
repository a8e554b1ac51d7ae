//! Error types for the nightly status checker.
//!
//! This module defines the error hierarchy for all checker operations:
//! configuration loading, build-id discovery, summary fetching, and the
//! backward date search. Variants include actionable suggestions where
//! possible to help operators resolve issues.

use std::path::PathBuf;

use chrono::NaiveDate;

/// A specialized `Result` type for checker operations.
pub type Result<T> = std::result::Result<T, CheckerError>;

/// Errors that can occur while checking nightly build status.
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// None of the requested slots appeared in the nightly index page.
    ///
    /// This is a hard error: an empty discovery almost always means the
    /// slot names are misconfigured, so no report is produced at all.
    #[error("No slots from the list '{slots}' were found in the nightly index\n\nSuggestion: Make sure you provided correct slot names")]
    NoSlotsFound {
        /// The comma-joined requested slot names.
        slots: String,
    },

    /// Invalid JSON syntax in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your nightly-status.json with a JSON linter")]
    ConfigParse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Fetch Errors
    // ========================================================================
    /// A network request failed or returned a non-success status.
    ///
    /// Fatal when it happens during discovery (there is nothing to check);
    /// during resolution it only degrades the affected (slot, date) pair.
    #[error("Transient failure fetching '{url}': {message}\n\nSuggestion: Check the URL and your internet access, then retry")]
    TransientFetch {
        /// The URL that failed.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// A summary document could not be interpreted.
    #[error("Malformed summary for '{slot}/{build_id}': {message}")]
    MalformedSummary {
        /// Slot the summary belongs to.
        slot: String,
        /// Build id the summary belongs to.
        build_id: u64,
        /// Description of the problem.
        message: String,
    },

    // ========================================================================
    // Search Errors
    // ========================================================================
    /// The backward walk exceeded its step budget without finding the date.
    ///
    /// Treated like "no build found" for the affected (slot, date) pair but
    /// kept distinct so operators can spot runaway searches in the logs.
    #[error("Cannot find a build for slot '{slot}' matching {target} within {steps} backward checks")]
    SearchExhausted {
        /// Slot being searched.
        slot: String,
        /// The requested date.
        target: NaiveDate,
        /// The step budget that was exhausted.
        steps: u32,
    },

    // ========================================================================
    // Passthrough Errors
    // ========================================================================
    /// A scan pattern could not be compiled.
    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CheckerError {
    /// Creates a new `NoSlotsFound` error from the requested slot names.
    #[must_use]
    pub fn no_slots_found(slots: &[String]) -> Self {
        Self::NoSlotsFound {
            slots: slots.join(", "),
        }
    }

    /// Creates a new `ConfigParse` error.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidation` error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `TransientFetch` error.
    #[must_use]
    pub fn transient_fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransientFetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new `MalformedSummary` error.
    #[must_use]
    pub fn malformed_summary(
        slot: impl Into<String>,
        build_id: u64,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedSummary {
            slot: slot.into(),
            build_id,
            message: message.into(),
        }
    }

    /// Creates a new `SearchExhausted` error.
    #[must_use]
    pub fn search_exhausted(slot: impl Into<String>, target: NaiveDate, steps: u32) -> Self {
        Self::SearchExhausted {
            slot: slot.into(),
            target,
            steps,
        }
    }

    /// Returns `true` if this error is transient and may be retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFetch { .. })
    }

    /// Returns `true` if this error means the whole run cannot proceed.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoSlotsFound { .. } | Self::ConfigParse { .. } | Self::ConfigValidation { .. }
        )
    }
}
