//! Build-id discovery.
//!
//! The nightly API has no endpoint listing build ids, so the latest id per
//! slot is scraped from the index page by matching `slot/<id>/` links and
//! keeping the maximum id seen for each requested slot.

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::{CheckerError, Result};

/// Discovers the most recent build id for each requested slot.
///
/// Scans `index_content` for `slot/<1-4 digit id>/` occurrences and keeps
/// the maximum id per slot. Slots without any occurrence are simply absent
/// from the result.
///
/// # Errors
///
/// Returns `CheckerError::NoSlotsFound` when no requested slot appears in
/// the content at all: that almost always means misconfigured slot names
/// and must not be silently swallowed.
pub fn discover_build_ids(
    slots: &[String],
    index_content: &str,
) -> Result<BTreeMap<String, u64>> {
    if slots.is_empty() {
        return Err(CheckerError::no_slots_found(slots));
    }

    // Longer names first so a slot that prefixes another (for example
    // "lhcb-sim10" and "lhcb-sim10-dev") cannot shadow it in the
    // alternation.
    let mut names: Vec<&String> = slots.iter().collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = Regex::new(&format!("({alternation})/([0-9]{{1,4}})/"))?;

    let mut builds: BTreeMap<String, u64> = BTreeMap::new();
    for caps in pattern.captures_iter(index_content) {
        let Ok(build_id) = caps[2].parse::<u64>() else {
            continue;
        };
        let entry = builds.entry(caps[1].to_string()).or_insert(0);
        if build_id > *entry {
            *entry = build_id;
        }
    }

    if builds.is_empty() {
        tracing::error!(slots = ?slots, "no requested slots found in the index content");
        return Err(CheckerError::no_slots_found(slots));
    }

    tracing::debug!(builds = ?builds, "found build ids");
    Ok(builds)
}
