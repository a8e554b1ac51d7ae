//! Seam between the checker and the system serving build data.
//!
//! The checker only ever needs two reads: the flat index listing
//! `slot/id/` entries, and one summary document per (slot, build id).
//! Keeping that behind a trait lets tests drive the engine with canned
//! documents and keeps the HTTP client in its own crate.

use crate::error::Result;
use crate::summary::BuildSummary;

/// A read-only source of nightly build data.
#[allow(async_fn_in_trait)]
pub trait BuildSource {
    /// Fetches the raw index page listing all known `slot/id/` entries.
    async fn fetch_index(&self) -> Result<String>;

    /// Fetches the summary document for one (slot, build id) pair.
    async fn fetch_summary(&self, slot: &str, build_id: u64) -> Result<BuildSummary>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod stub {
    use std::collections::HashMap;

    use super::BuildSource;
    use crate::error::{CheckerError, Result};
    use crate::summary::BuildSummary;

    /// In-memory source for engine tests.
    pub struct StubSource {
        pub index: String,
        pub summaries: HashMap<(String, u64), serde_json::Value>,
    }

    impl StubSource {
        pub fn new(index: &str) -> Self {
            Self {
                index: index.to_string(),
                summaries: HashMap::new(),
            }
        }

        pub fn with_summary(mut self, slot: &str, build_id: u64, summary: serde_json::Value) -> Self {
            self.summaries.insert((slot.to_string(), build_id), summary);
            self
        }
    }

    impl BuildSource for StubSource {
        async fn fetch_index(&self) -> Result<String> {
            Ok(self.index.clone())
        }

        async fn fetch_summary(&self, slot: &str, build_id: u64) -> Result<BuildSummary> {
            let value = self
                .summaries
                .get(&(slot.to_string(), build_id))
                .ok_or_else(|| {
                    CheckerError::transient_fetch(
                        format!("{slot}/{build_id}/summary.json"),
                        "no such build",
                    )
                })?;
            serde_json::from_value(value.clone()).map_err(CheckerError::from)
        }
    }
}
