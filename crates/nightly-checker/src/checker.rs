//! Status checking engine.
//!
//! `StatusChecker` ties the pieces together: it discovers each slot's
//! most recent build id from the index, resolves every requested
//! (slot, date) pair concurrently, and assembles the outcomes into a
//! [`StatusReport`]. Per-pair failures degrade that pair to
//! `Unavailable`; only discovery-level failures abort a run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use futures::future::join_all;

use nightly_report::{
    AggregateTotals, BuildTable, DayEntry, DayOutcome, SlotSection, StatusReport,
};

use crate::config::Config;
use crate::discovery;
use crate::error::Result;
use crate::resolver::{self, Resolution};
use crate::source::BuildSource;
use crate::summary::ResultFilter;

/// Slot, platform and project names observed in live build data, used to
/// seed a config file from a running system.
#[derive(Debug, Clone, Default)]
pub struct ObservedNames {
    /// Slots found in the index.
    pub slots: Vec<String>,
    /// Platforms listed by the slots' latest summaries, first seen first.
    pub platforms: Vec<String>,
    /// Enabled projects listed by the slots' latest summaries.
    pub projects: Vec<String>,
}

/// The nightly status checking engine, generic over where build data
/// comes from.
#[derive(Debug)]
pub struct StatusChecker<S> {
    source: S,
    config: Config,
    filter: ResultFilter,
}

impl<S: BuildSource> StatusChecker<S> {
    /// Creates a checker over `source` with the given configuration.
    #[must_use]
    pub fn new(source: S, config: Config) -> Self {
        let filter = ResultFilter::new(&config.platforms, &config.projects);
        Self {
            source,
            config,
            filter,
        }
    }

    /// Returns the checker's configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Discovers the most recent known build id for every configured slot.
    ///
    /// # Errors
    ///
    /// Fails if the index cannot be fetched or lists none of the
    /// configured slots.
    pub async fn discover(&self) -> Result<BTreeMap<String, u64>> {
        let index = self.source.fetch_index().await?;
        discovery::discover_build_ids(&self.config.slots, &index)
    }

    /// Checks the status of every configured slot for each date in
    /// `dates`, resolving all (slot, date) pairs concurrently.
    ///
    /// Pairs whose resolution fails transiently or exhausts its step
    /// budget are reported as `Unavailable` and logged; they never abort
    /// the run.
    ///
    /// # Errors
    ///
    /// Fails only when discovery fails.
    pub async fn check_status(&self, dates: &[NaiveDate]) -> Result<StatusReport> {
        let seeds = self.discover().await?;

        let mut pending = Vec::new();
        for slot in &self.config.slots {
            let Some(&seed_id) = seeds.get(slot) else {
                tracing::warn!(slot, "slot missing from index, reporting all days unavailable");
                continue;
            };
            for &date in dates {
                pending.push(self.check_day(slot, seed_id, date));
            }
        }
        let outcomes = join_all(pending).await;

        let mut totals = AggregateTotals::new();
        let mut results = outcomes.into_iter();
        let mut slots = Vec::new();
        for slot in &self.config.slots {
            let mut days = Vec::new();
            if seeds.contains_key(slot) {
                for _ in dates {
                    if let Some((entry, day_totals)) = results.next() {
                        if let Some(day_totals) = day_totals {
                            totals.merge(&day_totals);
                        }
                        days.push(entry);
                    }
                }
            } else {
                days.extend(dates.iter().map(|&date| DayEntry {
                    date,
                    outcome: DayOutcome::Unavailable,
                }));
            }
            slots.push(SlotSection {
                slot: slot.clone(),
                days,
            });
        }

        Ok(StatusReport { slots, totals })
    }

    /// Resolves one (slot, date) pair into a day entry, plus the totals
    /// its build contributed when one was found.
    async fn check_day(
        &self,
        slot: &str,
        seed_id: u64,
        date: NaiveDate,
    ) -> (DayEntry, Option<AggregateTotals>) {
        match resolver::resolve(&self.source, &self.filter, slot, seed_id, date).await {
            Ok(Resolution::Found { build_id, build }) => (
                DayEntry {
                    date,
                    outcome: DayOutcome::Build(BuildTable {
                        build_id,
                        columns: build.columns,
                        rows: build.rows,
                    }),
                },
                Some(build.totals),
            ),
            Ok(Resolution::NoBuild) => (
                DayEntry {
                    date,
                    outcome: DayOutcome::Unavailable,
                },
                None,
            ),
            Err(err) => {
                tracing::warn!(slot, %date, error = %err, "resolution failed, day unavailable");
                (
                    DayEntry {
                        date,
                        outcome: DayOutcome::Unavailable,
                    },
                    None,
                )
            }
        }
    }

    /// Collects slot, platform and project names from each discovered
    /// slot's latest summary. Aborted builds and slots whose summaries
    /// cannot be fetched contribute their name only.
    ///
    /// # Errors
    ///
    /// Fails only when discovery fails.
    pub async fn observed_names(&self) -> Result<ObservedNames> {
        let seeds = self.discover().await?;

        let mut observed = ObservedNames::default();
        for (slot, &build_id) in &seeds {
            observed.slots.push(slot.clone());
            let summary = match self.source.fetch_summary(slot, build_id).await {
                Ok(summary) => summary,
                Err(err) => {
                    tracing::warn!(slot, build_id, error = %err, "could not fetch latest summary");
                    continue;
                }
            };
            if summary.aborted {
                continue;
            }
            for platform in &summary.platforms {
                if !observed.platforms.contains(platform) {
                    observed.platforms.push(platform.clone());
                }
            }
            for project in &summary.projects {
                if project.enabled && !observed.projects.contains(&project.name) {
                    observed.projects.push(project.name.clone());
                }
            }
        }
        Ok(observed)
    }
}
