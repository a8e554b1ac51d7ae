//! Build summary decoding.
//!
//! One summary document describes one (slot, build id) pair. This module
//! holds the serde wire model for that document and the pure transform
//! that turns it into normalized report rows. Counter decoding never fails
//! the whole build: missing or malformed data degrades to `UNKNOWN` at
//! cell granularity, logged at debug level.

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use nightly_report::{
    AggregateTotals, BuildCounts, PlatformColumn, ProjectRow, ResultCell, TestCounts, DATE_FORMAT,
};

use crate::error::{CheckerError, Result};
use crate::platforms::{self, PlatformTokens};

// ============================================================================
// Wire model
// ============================================================================

/// A per-build summary document as served by the nightly API.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSummary {
    /// Whether the build was aborted and carries no usable result data.
    pub aborted: bool,
    /// Calendar date the build was produced, `YYYY-MM-DD`.
    pub date: String,
    /// Platforms configured for this build, when listed.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Projects built within this build.
    #[serde(default)]
    pub projects: Vec<ProjectSummary>,
}

/// One project entry within a build summary.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSummary {
    /// Project name.
    pub name: String,
    /// Whether the project was enabled in this build's manifest.
    pub enabled: bool,
    /// Per-platform result counters; values are decoded leniently.
    #[serde(default)]
    pub results: serde_json::Map<String, Value>,
    /// Checkout step information; the API serves `null` when absent.
    #[serde(default)]
    pub checkout: Option<Checkout>,
}

/// Checkout step information for one project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Checkout {
    /// Free-text checkout warnings; some reference merge requests.
    #[serde(default)]
    pub warnings: Vec<String>,
}

// ============================================================================
// Decoded build
// ============================================================================

/// The usable content of one non-aborted build.
#[derive(Debug, Clone)]
pub struct CompletedBuild {
    /// Date the build was produced. Ground truth for date comparison.
    pub date: NaiveDate,
    /// Fixed column layout, taken from the first enabled project of
    /// interest in this build.
    pub columns: Vec<PlatformColumn>,
    /// One row per enabled project of interest, in manifest order.
    pub rows: Vec<ProjectRow>,
    /// Error/failure counters contributed by this build alone.
    pub totals: AggregateTotals,
}

/// Outcome of decoding one summary document.
#[derive(Debug, Clone)]
pub enum BuildResult {
    /// The build was aborted; only its date is usable.
    Aborted {
        /// Date the build was produced.
        date: NaiveDate,
    },
    /// The build completed and was decoded into rows.
    Completed(CompletedBuild),
}

impl BuildResult {
    /// Returns the build's associated date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::Aborted { date } => *date,
            Self::Completed(build) => build.date,
        }
    }
}

// ============================================================================
// Filter
// ============================================================================

/// The caller's projects and platforms of interest, with the prefix index
/// used for display short-naming. Built once per checker run.
#[derive(Debug, Clone)]
pub struct ResultFilter {
    platforms: Vec<String>,
    projects: Vec<String>,
    tokens: PlatformTokens,
}

impl ResultFilter {
    /// Creates a filter from the configured platform and project lists.
    #[must_use]
    pub fn new(platforms: &[String], projects: &[String]) -> Self {
        Self {
            platforms: platforms.to_vec(),
            projects: projects.to_vec(),
            tokens: PlatformTokens::new(platforms),
        }
    }

    /// Returns `true` when the project is of interest to the caller.
    #[must_use]
    pub fn wants_project(&self, name: &str) -> bool {
        self.projects.iter().any(|p| p == name)
    }

    /// Fixes the column layout for one build: the requested platforms
    /// present in `results`, sorted descending, with display labels.
    fn layout(&self, results: &serde_json::Map<String, Value>) -> Vec<PlatformColumn> {
        let mut present: Vec<String> = self
            .platforms
            .iter()
            .filter(|p| results.contains_key(p.as_str()))
            .cloned()
            .collect();
        present.sort_by(|a, b| b.cmp(a));

        let mut labels = platforms::shorten(&self.tokens, &present);
        platforms::disambiguate(&mut labels);

        present
            .into_iter()
            .zip(labels)
            .map(|(platform, label)| PlatformColumn::new(platform, label))
            .collect()
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Decodes one summary document into a [`BuildResult`].
///
/// Only projects that are both enabled in the manifest and present in the
/// caller's filter produce rows. The column layout is fixed by the first
/// such project; later projects lacking a platform entry get `UNKNOWN`
/// cells rather than dropped columns.
///
/// # Errors
///
/// Returns `CheckerError::MalformedSummary` when the document's date does
/// not parse; a build without a usable date cannot take part in date
/// resolution at all. Missing or malformed counters are never errors.
pub fn extract_build(
    slot: &str,
    build_id: u64,
    summary: &BuildSummary,
    filter: &ResultFilter,
) -> Result<BuildResult> {
    let date = NaiveDate::parse_from_str(&summary.date, DATE_FORMAT).map_err(|e| {
        CheckerError::malformed_summary(
            slot,
            build_id,
            format!("unparseable date '{}': {e}", summary.date),
        )
    })?;

    if summary.aborted {
        return Ok(BuildResult::Aborted { date });
    }

    let mut columns: Vec<PlatformColumn> = Vec::new();
    let mut layout_fixed = false;
    let mut rows = Vec::new();
    let mut totals = AggregateTotals::new();

    for project in &summary.projects {
        if !project.enabled || !filter.wants_project(&project.name) {
            continue;
        }

        if !layout_fixed {
            columns = filter.layout(&project.results);
            layout_fixed = true;
        }

        let cells: Vec<ResultCell> = columns
            .iter()
            .map(|column| decode_cell(project.results.get(&column.platform), &project.name, &column.platform))
            .collect();

        for cell in &cells {
            if let BuildCounts::Known { errors, .. } = cell.build {
                totals.add_build_errors(&project.name, errors);
            }
            if let TestCounts::Known { failed, .. } = cell.tests {
                totals.add_test_failures(&project.name, failed);
            }
        }

        let failed_mrs = extract_failed_mrs(project)?;
        rows.push(ProjectRow {
            project: project.name.clone(),
            failed_mrs,
            cells,
        });
    }

    Ok(BuildResult::Completed(CompletedBuild {
        date,
        columns,
        rows,
        totals,
    }))
}

/// Per-group decode outcome, kept separate from the cell model so a
/// missing key can blank the whole cell while a wrong-typed value only
/// blanks its own group.
enum GroupDecode {
    Known(u64, u64),
    WrongType,
    MissingKey,
}

/// Decodes one (project, platform) cell.
fn decode_cell(results: Option<&Value>, project: &str, platform: &str) -> ResultCell {
    let Some(results) = results else {
        tracing::debug!(project, platform, "no result entry for platform, cell is UNKNOWN");
        return ResultCell::unknown();
    };

    let build = decode_group(results, "build", "warnings", "errors");
    let tests = decode_group(results, "tests", "PASS", "FAIL");

    if matches!(build, GroupDecode::MissingKey) || matches!(tests, GroupDecode::MissingKey) {
        tracing::debug!(
            project,
            platform,
            "missing counter key, output will be incomplete"
        );
        return ResultCell::unknown();
    }

    ResultCell {
        build: match build {
            GroupDecode::Known(warnings, errors) => BuildCounts::Known { warnings, errors },
            GroupDecode::WrongType | GroupDecode::MissingKey => BuildCounts::Unknown,
        },
        tests: match tests {
            GroupDecode::Known(passed, failed) => TestCounts::Known { passed, failed },
            GroupDecode::WrongType | GroupDecode::MissingKey => TestCounts::Unknown,
        },
    }
}

/// Decodes one check-type group (`build` or `tests`) out of a platform's
/// result entry.
fn decode_group(results: &Value, group: &str, first: &str, second: &str) -> GroupDecode {
    let Some(section) = results.get(group) else {
        return GroupDecode::MissingKey;
    };
    if !section.is_object() {
        return GroupDecode::WrongType;
    }

    let mut counters = [0_u64; 2];
    for (slot, key) in counters.iter_mut().zip([first, second]) {
        match section.get(key) {
            None => return GroupDecode::MissingKey,
            Some(value) => match value.as_u64() {
                Some(count) => *slot = count,
                None => return GroupDecode::WrongType,
            },
        }
    }
    GroupDecode::Known(counters[0], counters[1])
}

/// Extracts failed merge-request references from a project's checkout
/// warnings.
///
/// A reference is `<project-name>!<1-5 digits>`; the project name prefix
/// is stripped and duplicates are dropped, keeping first-appearance order.
fn extract_failed_mrs(project: &ProjectSummary) -> Result<Vec<String>> {
    let Some(checkout) = &project.checkout else {
        return Ok(Vec::new());
    };
    if checkout.warnings.is_empty() {
        return Ok(Vec::new());
    }

    let pattern = Regex::new(&format!(
        "{}!([0-9]{{1,5}})",
        regex::escape(&project.name)
    ))?;

    let mut mrs = Vec::new();
    for warning in &checkout.warnings {
        for caps in pattern.captures_iter(warning) {
            let reference = format!("!{}", &caps[1]);
            if !mrs.contains(&reference) {
                mrs.push(reference);
            }
        }
    }
    Ok(mrs)
}
