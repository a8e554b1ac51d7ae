//! Nightly build status checking engine.
//!
//! This crate holds the whole pipeline between raw build data and a
//! finished [`StatusReport`](nightly_report::StatusReport): build id
//! discovery from the index page, backward date resolution, summary
//! decoding with lenient counter handling, and per-project aggregation.
//! Build data itself arrives through the [`BuildSource`] trait, so the
//! engine runs against HTTP in production and canned documents in tests.

// ============================================================================
// Modules
// ============================================================================

pub mod checker;
pub mod config;
pub mod discovery;
pub mod error;
pub mod platforms;
pub mod resolver;
pub mod source;
pub mod summary;

// ============================================================================
// Re-exports
// ============================================================================

pub use checker::{ObservedNames, StatusChecker};
pub use config::{Config, CONFIG_FILE_NAME};
pub use discovery::discover_build_ids;
pub use error::{CheckerError, Result};
pub use resolver::{resolve, Resolution, MAX_BACKWARD_CHECKS};
pub use source::BuildSource;
pub use summary::{BuildResult, BuildSummary, CompletedBuild, ResultFilter};
