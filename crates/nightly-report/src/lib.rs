//! Nightly status report model.
//!
//! This crate provides the normalized result structure produced by the
//! checker engine and the renderers that turn it into operator-facing
//! output.
//!
//! # Types
//!
//! - [`StatusReport`] - the complete report for one checker run
//! - [`SlotSection`] - all checked dates for one nightly slot
//! - [`DayEntry`] / [`DayOutcome`] - one (slot, date) row, resolved or not
//! - [`BuildTable`] - the per-build project/platform table
//! - [`ResultCell`] - one (project, platform) cell with optional counters
//! - [`AggregateTotals`] - cumulative per-project error/failure counters
//!
//! # Generators
//!
//! - [`TextGenerator`] - bordered plain-text tables for the terminal
//! - [`HtmlGenerator`] - collapsible per-date sections with color-coded cells
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use nightly_report::{
//!     BuildTable, DayEntry, DayOutcome, PlatformColumn, ProjectRow, ResultCell,
//!     SlotSection, StatusReport, TextGenerator,
//! };
//!
//! let report = StatusReport {
//!     slots: vec![SlotSection {
//!         slot: "lhcb-sim11".to_string(),
//!         days: vec![DayEntry {
//!             date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
//!             outcome: DayOutcome::Build(BuildTable {
//!                 build_id: 482,
//!                 columns: vec![PlatformColumn::new("x86_64_v2-el9-gcc12-opt", "x86_64_v2-el9-gcc12-opt")],
//!                 rows: vec![ProjectRow {
//!                     project: "Gauss".to_string(),
//!                     failed_mrs: vec![],
//!                     cells: vec![ResultCell::unknown()],
//!                 }],
//!             }),
//!         }],
//!     }],
//!     totals: Default::default(),
//! };
//!
//! let text = TextGenerator::new(&report).generate();
//! assert!(text.contains("-> lhcb-sim11/2024-01-10/482:"));
//! ```

pub mod html;
pub mod text;

pub use html::HtmlGenerator;
pub use text::TextGenerator;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format used everywhere a calendar date is rendered or parsed.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Placeholder rendered for a counter group with unusable data.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while serializing or writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize the report to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to write report output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// Counter cells
// ============================================================================

/// Build-step counters for one (project, platform) pair.
///
/// `Unknown` is distinct from zero: it means the summary document carried no
/// usable value for this group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildCounts {
    /// Counters were present and well typed.
    Known {
        /// Number of compiler warnings.
        warnings: u64,
        /// Number of build errors.
        errors: u64,
    },
    /// Counters were absent or malformed.
    Unknown,
}

/// Test-step counters for one (project, platform) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCounts {
    /// Counters were present and well typed.
    Known {
        /// Number of passed tests.
        passed: u64,
        /// Number of failed tests.
        failed: u64,
    },
    /// Counters were absent or malformed.
    Unknown,
}

/// Color class of a result cell, used by the HTML renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellSeverity {
    /// All counters known and zero.
    Passing,
    /// At least one build warning, no errors or failed tests.
    Warning,
    /// At least one build error or failed test.
    Failing,
    /// Some counter group is unusable and nothing is failing.
    Unknown,
}

impl CellSeverity {
    /// Returns the background color used when rendering this severity.
    #[must_use]
    pub const fn background_color(&self) -> &'static str {
        match self {
            Self::Passing => "#ccffcc",
            Self::Warning => "#ffd9a3",
            Self::Failing => "#ffcccc",
            Self::Unknown => "#e6e6e6",
        }
    }
}

/// One (project, platform) cell: build counters and test counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCell {
    /// Build warnings/errors group.
    pub build: BuildCounts,
    /// Test passed/failed group.
    pub tests: TestCounts,
}

impl ResultCell {
    /// A cell with no usable data in either group.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            build: BuildCounts::Unknown,
            tests: TestCounts::Unknown,
        }
    }

    /// Returns `true` when neither counter group carries data.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self.build, BuildCounts::Unknown) && matches!(self.tests, TestCounts::Unknown)
    }

    /// Formats the cell the way the plain-text table shows it,
    /// e.g. `W:1 E:0 / P:52 F:0`.
    ///
    /// A group without data renders as `UNKNOWN`; a cell without any data
    /// renders as a single `UNKNOWN`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.is_unknown() {
            return UNKNOWN_LABEL.to_string();
        }
        let build = match self.build {
            BuildCounts::Known { warnings, errors } => format!("W:{warnings} E:{errors}"),
            BuildCounts::Unknown => UNKNOWN_LABEL.to_string(),
        };
        let tests = match self.tests {
            TestCounts::Known { passed, failed } => format!("P:{passed} F:{failed}"),
            TestCounts::Unknown => UNKNOWN_LABEL.to_string(),
        };
        format!("{build} / {tests}")
    }

    /// Classifies the cell for color coding.
    ///
    /// Failures dominate warnings, warnings dominate unknown data, and a
    /// cell is only `Passing` when every counter is known and zero.
    #[must_use]
    pub const fn severity(&self) -> CellSeverity {
        let (warnings, errors, build_known) = match self.build {
            BuildCounts::Known { warnings, errors } => (warnings, errors, true),
            BuildCounts::Unknown => (0, 0, false),
        };
        let (failed, tests_known) = match self.tests {
            TestCounts::Known { failed, .. } => (failed, true),
            TestCounts::Unknown => (0, false),
        };

        if errors > 0 || failed > 0 {
            CellSeverity::Failing
        } else if warnings > 0 {
            CellSeverity::Warning
        } else if build_known && tests_known {
            CellSeverity::Passing
        } else {
            CellSeverity::Unknown
        }
    }
}

// ============================================================================
// Table model
// ============================================================================

/// One table column: a platform in its long (identity) and short
/// (display) form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformColumn {
    /// Full platform name; data association always uses this.
    pub platform: String,
    /// Shortened display label, possibly with a `*` prefix placeholder.
    pub label: String,
}

impl PlatformColumn {
    /// Creates a column from a long name and its display label.
    #[must_use]
    pub fn new(platform: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            label: label.into(),
        }
    }
}

/// One project row within a build table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    /// Project name.
    pub project: String,
    /// Merge-request references extracted from checkout warnings,
    /// deduplicated in order of first appearance, e.g. `!1234`.
    pub failed_mrs: Vec<String>,
    /// One cell per table column, in column order.
    pub cells: Vec<ResultCell>,
}

impl ProjectRow {
    /// Comma-joined merge-request list for display.
    #[must_use]
    pub fn failed_mrs_label(&self) -> String {
        self.failed_mrs.join(",")
    }
}

/// The normalized table for one resolved build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTable {
    /// Numeric build id within the slot.
    pub build_id: u64,
    /// Fixed column layout for this build.
    pub columns: Vec<PlatformColumn>,
    /// Per-project rows, in manifest order.
    pub rows: Vec<ProjectRow>,
}

// ============================================================================
// Report structure
// ============================================================================

/// Outcome for one (slot, date) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOutcome {
    /// A build with the requested date was found.
    Build(BuildTable),
    /// No build exists for this date, or retrieval failed.
    Unavailable,
}

/// One dated entry within a slot section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    /// The requested calendar date.
    pub date: NaiveDate,
    /// What resolution produced for that date.
    pub outcome: DayOutcome,
}

/// All checked dates for one slot, sorted ascending by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSection {
    /// Slot name.
    pub slot: String,
    /// Per-date entries.
    pub days: Vec<DayEntry>,
}

/// Cumulative counters for one project across a whole report run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTotals {
    /// Total build errors seen.
    pub build_errors: u64,
    /// Total failed tests seen.
    pub test_failures: u64,
}

/// Per-project cumulative error/failure counters across a multi-day,
/// multi-slot run.
///
/// Totals only accumulate from resolved builds; unavailable days
/// contribute nothing. Merging is plain addition, so partial totals from
/// independent resolutions can be reduced in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateTotals {
    totals: BTreeMap<String, ProjectTotals>,
}

impl AggregateTotals {
    /// Creates an empty set of totals.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            totals: BTreeMap::new(),
        }
    }

    /// Adds build errors for a project.
    pub fn add_build_errors(&mut self, project: &str, count: u64) {
        if count > 0 {
            self.totals.entry(project.to_string()).or_default().build_errors += count;
        }
    }

    /// Adds failed tests for a project.
    pub fn add_test_failures(&mut self, project: &str, count: u64) {
        if count > 0 {
            self.totals.entry(project.to_string()).or_default().test_failures += count;
        }
    }

    /// Folds another set of totals into this one.
    pub fn merge(&mut self, other: &Self) {
        for (project, totals) in &other.totals {
            let entry = self.totals.entry(project.clone()).or_default();
            entry.build_errors += totals.build_errors;
            entry.test_failures += totals.test_failures;
        }
    }

    /// Iterates projects and their totals in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProjectTotals)> {
        self.totals.iter().map(|(name, totals)| (name.as_str(), totals))
    }

    /// Returns `true` when no project accumulated anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// The complete report for one checker run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Per-slot sections, in the order slots were requested.
    pub slots: Vec<SlotSection>,
    /// Cumulative per-project counters across all resolved builds.
    pub totals: AggregateTotals,
}

impl StatusReport {
    /// Serializes the report to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Serialization` if JSON serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ReportError::from)
    }
}

// ============================================================================
// Tests
// ============================================================================
