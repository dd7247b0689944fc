//! Stable-version filtering for Go module listings
//!
//! Filtering happens in three tiers, each used only when the previous one
//! leaves nothing:
//! 1. Release tags of the exact form `vMAJOR.MINOR.PATCH`
//! 2. Anything that is not tagged alpha/beta/rc and not `+incompatible`
//! 3. The unfiltered listing

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static STABLE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+\.\d+\.\d+$").expect("valid stable version pattern"));

const PRERELEASE_MARKERS: &[&str] = &["-alpha", "-beta", "-rc"];
const INCOMPATIBLE_MARKER: &str = "+incompatible";

/// Check if a tag is a plain release without pre-release or build suffixes.
pub fn is_stable(version: &str) -> bool {
    STABLE_VERSION_RE.is_match(version) && !version.contains(INCOMPATIBLE_MARKER)
}

fn is_non_prerelease(version: &str) -> bool {
    !version.contains(INCOMPATIBLE_MARKER)
        && !PRERELEASE_MARKERS
            .iter()
            .any(|marker| version.contains(marker))
}

/// Reduce a raw listing to the versions worth probing, preserving order.
pub fn filter_stable_versions(module: &str, all_versions: Vec<String>) -> Vec<String> {
    let stable: Vec<String> = all_versions
        .iter()
        .filter(|v| is_stable(v))
        .cloned()
        .collect();

    debug!(
        "Module {} has {} total versions, {} stable versions",
        module,
        all_versions.len(),
        stable.len()
    );

    if !stable.is_empty() {
        return stable;
    }

    let non_prerelease: Vec<String> = all_versions
        .iter()
        .filter(|v| is_non_prerelease(v))
        .cloned()
        .collect();

    if !non_prerelease.is_empty() {
        debug!("Falling back to {} non-prerelease versions", non_prerelease.len());
        return non_prerelease;
    }

    debug!("Falling back to all available versions for {}", module);
    all_versions
}
