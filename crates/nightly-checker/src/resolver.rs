//! Backward date resolution.
//!
//! Build ids grow monotonically with time but the mapping from calendar
//! date to id is not arithmetic: slots skip days and occasionally build
//! twice. Resolution therefore walks ids downward from a known recent id,
//! comparing each build's recorded date against the target, under a hard
//! step budget so a bad seed cannot degenerate into an unbounded scan.

use chrono::NaiveDate;

use crate::error::{CheckerError, Result};
use crate::source::BuildSource;
use crate::summary::{extract_build, BuildResult, CompletedBuild, ResultFilter};

/// Hard ceiling on the number of builds examined per (slot, date) pair.
pub const MAX_BACKWARD_CHECKS: u32 = 30;

/// Outcome of resolving one (slot, date) pair.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A completed build was produced on the target date.
    Found {
        /// The matching build's id.
        build_id: u64,
        /// Its decoded content.
        build: CompletedBuild,
    },
    /// The scan proved no usable build exists for the target date: the
    /// walk passed below it, reached id zero, or only met aborted or
    /// dataless builds on it.
    NoBuild,
}

/// Walks ids downward from `seed_id` looking for a completed build dated
/// exactly `target` with data for the requested projects.
///
/// Aborted builds, builds without rows of interest and builds whose
/// summaries cannot be decoded consume budget like any other step. A build
/// dated before the target proves the target date was skipped and ends the
/// scan with [`Resolution::NoBuild`].
///
/// # Errors
///
/// Propagates transient fetch failures from the source, and returns
/// `CheckerError::SearchExhausted` if the step budget runs out before the
/// scan can conclude either way.
pub async fn resolve<S: BuildSource>(
    source: &S,
    filter: &ResultFilter,
    slot: &str,
    seed_id: u64,
    target: NaiveDate,
) -> Result<Resolution> {
    let mut id = seed_id;
    for _ in 0..MAX_BACKWARD_CHECKS {
        let fetched = source
            .fetch_summary(slot, id)
            .await
            .and_then(|summary| extract_build(slot, id, &summary, filter));
        let result = match fetched {
            Ok(result) => result,
            Err(err @ CheckerError::MalformedSummary { .. }) => {
                tracing::warn!(slot, build_id = id, error = %err, "skipping undecodable build");
                match id.checked_sub(1) {
                    Some(previous) => {
                        id = previous;
                        continue;
                    }
                    None => return Ok(Resolution::NoBuild),
                }
            }
            Err(err) => return Err(err),
        };

        let date = result.date();
        if date < target {
            tracing::debug!(slot, build_id = id, %date, %target, "walked past target date");
            return Ok(Resolution::NoBuild);
        }
        if date == target {
            match result {
                BuildResult::Completed(build) if !build.rows.is_empty() => {
                    return Ok(Resolution::Found { build_id: id, build });
                }
                BuildResult::Completed(_) => {
                    tracing::debug!(
                        slot,
                        build_id = id,
                        %date,
                        "build on target date has no rows for the requested projects"
                    );
                }
                BuildResult::Aborted { .. } => {
                    tracing::debug!(slot, build_id = id, %date, "build on target date was aborted");
                }
            }
        }

        match id.checked_sub(1) {
            Some(previous) => id = previous,
            None => return Ok(Resolution::NoBuild),
        }
    }
    Err(CheckerError::search_exhausted(slot, target, MAX_BACKWARD_CHECKS))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::source::stub::StubSource;
    use serde_json::json;

    fn filter() -> ResultFilter {
        ResultFilter::new(
            &["x86_64_v2-el9-gcc12-opt".to_string()],
            &["Gauss".to_string()],
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn completed(date: &str) -> serde_json::Value {
        json!({
            "aborted": false,
            "date": date,
            "projects": [{"name": "Gauss", "enabled": true, "results": {
                "x86_64_v2-el9-gcc12-opt": {
                    "build": {"warnings": 0, "errors": 0},
                    "tests": {"PASS": 1, "FAIL": 0}
                }
            }}]
        })
    }

    fn aborted(date: &str) -> serde_json::Value {
        json!({"aborted": true, "date": date, "projects": []})
    }

    #[tokio::test]
    async fn test_resolve_walks_back_to_target() {
        let source = StubSource::new("")
            .with_summary("s", 500, completed("2024-03-15"))
            .with_summary("s", 499, completed("2024-03-14"))
            .with_summary("s", 498, completed("2024-03-13"));
        let resolution = resolve(&source, &filter(), "s", 500, day(13)).await.unwrap();
        let Resolution::Found { build_id, build } = resolution else {
            panic!("expected a build");
        };
        assert_eq!(build_id, 498);
        assert_eq!(build.date, day(13));
    }

    #[tokio::test]
    async fn test_resolve_gap_day_is_no_build() {
        // The slot skipped the 14th; the walk meets the 13th first.
        let source = StubSource::new("")
            .with_summary("s", 500, completed("2024-03-15"))
            .with_summary("s", 499, completed("2024-03-13"));
        let resolution = resolve(&source, &filter(), "s", 500, day(14)).await.unwrap();
        assert!(matches!(resolution, Resolution::NoBuild));
    }

    #[tokio::test]
    async fn test_resolve_skips_aborted_on_target_date() {
        // Two builds on the 14th, the newer aborted.
        let source = StubSource::new("")
            .with_summary("s", 500, aborted("2024-03-14"))
            .with_summary("s", 499, completed("2024-03-14"));
        let resolution = resolve(&source, &filter(), "s", 500, day(14)).await.unwrap();
        let Resolution::Found { build_id, .. } = resolution else {
            panic!("expected a build");
        };
        assert_eq!(build_id, 499);
    }

    #[tokio::test]
    async fn test_resolve_only_aborted_on_target_date_is_no_build() {
        let source = StubSource::new("")
            .with_summary("s", 500, aborted("2024-03-14"))
            .with_summary("s", 499, completed("2024-03-13"));
        let resolution = resolve(&source, &filter(), "s", 500, day(14)).await.unwrap();
        assert!(matches!(resolution, Resolution::NoBuild));
    }

    #[tokio::test]
    async fn test_resolve_undecodable_summary_consumes_a_step() {
        let source = StubSource::new("")
            .with_summary("s", 500, json!({"aborted": false, "date": "garbage", "projects": []}))
            .with_summary("s", 499, completed("2024-03-14"));
        let resolution = resolve(&source, &filter(), "s", 500, day(14)).await.unwrap();
        let Resolution::Found { build_id, .. } = resolution else {
            panic!("expected a build");
        };
        assert_eq!(build_id, 499);
    }

    #[tokio::test]
    async fn test_resolve_skips_rowless_build_on_target_date() {
        // The newer build on the 14th only carries projects nobody asked
        // for; the older one has data.
        let rowless = json!({
            "aborted": false,
            "date": "2024-03-14",
            "projects": [{"name": "Moore", "enabled": true, "results": {}}]
        });
        let source = StubSource::new("")
            .with_summary("s", 500, rowless)
            .with_summary("s", 499, completed("2024-03-14"));
        let resolution = resolve(&source, &filter(), "s", 500, day(14)).await.unwrap();
        let Resolution::Found { build_id, .. } = resolution else {
            panic!("expected a build");
        };
        assert_eq!(build_id, 499);
    }

    #[tokio::test]
    async fn test_resolve_is_stable_across_queries() {
        let source = StubSource::new("")
            .with_summary("s", 500, completed("2024-03-15"))
            .with_summary("s", 499, completed("2024-03-14"))
            .with_summary("s", 498, completed("2024-03-13"));
        let filter = filter();

        // Same query twice gives the same id; an earlier target never
        // resolves to a later id.
        let first = resolve(&source, &filter, "s", 500, day(14)).await.unwrap();
        let second = resolve(&source, &filter, "s", 500, day(14)).await.unwrap();
        let earlier = resolve(&source, &filter, "s", 500, day(13)).await.unwrap();
        let (Resolution::Found { build_id: a, .. }, Resolution::Found { build_id: b, .. }) =
            (first, second)
        else {
            panic!("expected builds");
        };
        let Resolution::Found { build_id: c, .. } = earlier else {
            panic!("expected a build");
        };
        assert_eq!(a, b);
        assert!(c < a);
    }

    #[tokio::test]
    async fn test_resolve_stops_at_id_zero() {
        let source = StubSource::new("")
            .with_summary("s", 1, completed("2024-03-20"))
            .with_summary("s", 0, completed("2024-03-19"));
        let resolution = resolve(&source, &filter(), "s", 1, day(14)).await.unwrap();
        assert!(matches!(resolution, Resolution::NoBuild));
    }

    #[tokio::test]
    async fn test_resolve_exhausts_budget() {
        let mut source = StubSource::new("");
        for offset in 0..MAX_BACKWARD_CHECKS as u64 {
            source = source.with_summary("s", 500 - offset, completed("2024-03-20"));
        }
        let err = resolve(&source, &filter(), "s", 500, day(14)).await.unwrap_err();
        assert!(matches!(err, CheckerError::SearchExhausted { .. }));
    }

    #[tokio::test]
    async fn test_resolve_propagates_fetch_errors() {
        let source = StubSource::new("").with_summary("s", 500, completed("2024-03-15"));
        // Id 499 has no canned summary, which the stub reports as a
        // transient fetch failure.
        let err = resolve(&source, &filter(), "s", 500, day(14)).await.unwrap_err();
        assert!(err.is_transient());
    }
}
