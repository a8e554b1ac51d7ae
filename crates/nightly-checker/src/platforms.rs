//! Platform short-naming.
//!
//! Platform identifiers like `x86_64_v2-centos7-gcc11-opt` repeat long
//! hierarchical prefixes across a table header. This module collapses the
//! longest prefix a platform shares with its immediate predecessor into a
//! single `*` placeholder, purely for display: data association always
//! stays on the long names.

use std::collections::{HashMap, HashSet};

/// Placeholder substituted for a collapsed shared prefix.
pub const PLACEHOLDER: &str = "*";

/// Token separator within platform identifiers.
const DELIMITER: char = '-';

/// Prefixes cover at most this many leading tokens, so a platform can
/// never collapse entirely into the placeholder through full-name overlap.
const MAX_PREFIX_TOKENS: usize = 3;

/// Prefix index over a fixed set of platform identifiers.
///
/// Maps every joined token prefix (up to [`MAX_PREFIX_TOKENS`] tokens) to
/// the set of platforms sharing that exact prefix. Built once per checker
/// run from the configured platform list.
#[derive(Debug, Clone, Default)]
pub struct PlatformTokens {
    prefixes: HashMap<String, HashSet<String>>,
}

impl PlatformTokens {
    /// Builds the prefix index for the given platforms.
    #[must_use]
    pub fn new(platforms: &[String]) -> Self {
        let mut prefixes: HashMap<String, HashSet<String>> = HashMap::new();
        for platform in platforms {
            let tokens: Vec<&str> = platform.splitn(MAX_PREFIX_TOKENS + 1, DELIMITER).collect();
            for len in 1..=MAX_PREFIX_TOKENS.min(tokens.len()) {
                let prefix = tokens[..len].join("-");
                prefixes
                    .entry(prefix)
                    .or_default()
                    .insert(platform.clone());
            }
        }
        Self { prefixes }
    }

    /// Returns the longest indexed prefix shared by both platforms, if any.
    fn longest_shared_prefix(&self, previous: &str, current: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .filter(|(_, members)| members.contains(previous) && members.contains(current))
            .map(|(prefix, _)| prefix.as_str())
            .max_by_key(|prefix| prefix.len())
    }
}

/// Shortens platform names for display.
///
/// Preserves length and order. The first platform is always returned
/// unshortened; each later platform has the longest token prefix it shares
/// with its immediate predecessor replaced by [`PLACEHOLDER`], or is kept
/// as-is when no prefix is shared.
#[must_use]
pub fn shorten(tokens: &PlatformTokens, platforms: &[String]) -> Vec<String> {
    let mut shortened = Vec::with_capacity(platforms.len());
    let mut previous: Option<&String> = None;

    for platform in platforms {
        let Some(prev) = previous else {
            shortened.push(platform.clone());
            previous = Some(platform);
            continue;
        };
        match tokens.longest_shared_prefix(prev, platform) {
            Some(prefix) => {
                shortened.push(format!("{PLACEHOLDER}{}", &platform[prefix.len()..]));
            }
            None => shortened.push(platform.clone()),
        }
        previous = Some(platform);
    }

    shortened
}

/// Makes duplicated starred short names unique by appending `!1`, `!2`
/// and so on, in order of appearance. Unstarred duplicates are left alone
/// since they still show the full platform name.
pub fn disambiguate(labels: &mut [String]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in labels.iter() {
        *counts.entry(label.clone()).or_insert(0) += 1;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for label in labels.iter_mut() {
        if counts[label.as_str()] > 1 && label.starts_with(PLACEHOLDER) {
            let next = seen.entry(label.clone()).or_insert(0);
            *next += 1;
            let suffix = *next;
            label.push_str(&format!("!{suffix}"));
        }
    }
}
