use std::cmp::Ordering;

use semver::Version;
use tracing::debug;

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros.
/// Does NOT strip 'v' prefix.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Check whether a local Go toolchain satisfies a module's `go` directive.
///
/// Both sides are compared as (major, minor, patch) with missing components
/// read as zero; a leading `go` is ignored. If either side cannot be parsed
/// the check is permissive and returns true.
pub fn is_toolchain_compatible(local: &str, required: &str) -> bool {
    let local_trimmed = local.trim().trim_start_matches("go");
    let required_trimmed = required.trim().trim_start_matches("go");

    match (parse_version(local_trimmed), parse_version(required_trimmed)) {
        (Some(local), Some(required)) => {
            (local.major, local.minor, local.patch)
                >= (required.major, required.minor, required.patch)
        }
        _ => {
            debug!(
                "Unparseable Go version (local '{}', required '{}'), assuming compatible",
                local, required
            );
            true
        }
    }
}

/// Normalize a Go module version for comparison.
///
/// Handles:
/// - v prefix: v1.2.3 -> 1.2.3
/// - +incompatible suffix: v2.0.0+incompatible -> 2.0.0
pub fn normalize_module_version(version: &str) -> &str {
    let version = version.strip_prefix('v').unwrap_or(version);
    version.strip_suffix("+incompatible").unwrap_or(version)
}

/// Order two module version tags by semantic version.
///
/// Tags that do not parse sort before every tag that does, and compare equal
/// among themselves so a stable sort keeps their original order.
pub fn compare_module_versions(a: &str, b: &str) -> Ordering {
    let a = Version::parse(normalize_module_version(a)).ok();
    let b = Version::parse(normalize_module_version(b)).ok();

    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Sort module versions oldest first.
pub fn sort_ascending(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_module_versions(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.21.0", "1.18", true)]
    #[case("1.21.0", "1.22", false)]
    #[case("1.21", "1.21.0", true)]
    #[case("1.21.0", "1.21.1", false)]
    #[case("1.21.3", "1.21.1", true)]
    #[case("2", "1.99.99", true)]
    #[case("go1.22.1", "1.22", true)]
    #[case("1.20", "go1.21", false)]
    // Unparseable input is treated as compatible
    #[case("devel", "1.22", true)]
    #[case("1.21.0", "1.22rc1", true)]
    #[case("", "1.18", true)]
    fn is_toolchain_compatible_returns_expected(
        #[case] local: &str,
        #[case] required: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_toolchain_compatible(local, required), expected);
    }

    #[rstest]
    #[case("v1.0.0", "v1.0.1", Ordering::Less)]
    #[case("v1.10.0", "v1.9.0", Ordering::Greater)]
    #[case("v2.0.0+incompatible", "v2.0.0", Ordering::Equal)]
    #[case("v1.0.0-rc.1", "v1.0.0", Ordering::Less)]
    #[case("garbage", "v0.0.1", Ordering::Less)]
    #[case("garbage", "junk", Ordering::Equal)]
    fn compare_module_versions_returns_expected(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare_module_versions(a, b), expected);
    }

    #[test]
    fn sort_ascending_orders_numerically_and_keeps_unparseable_first() {
        let mut versions: Vec<String> = ["v1.10.0", "v1.2.0", "weird", "v1.9.3", "other"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        sort_ascending(&mut versions);

        assert_eq!(
            versions,
            vec!["weird", "other", "v1.2.0", "v1.9.3", "v1.10.0"]
        );
    }

    #[test]
    fn normalize_module_version_strips_prefix_and_suffix() {
        assert_eq!(normalize_module_version("v1.0.0"), "1.0.0");
        assert_eq!(normalize_module_version("v2.0.0+incompatible"), "2.0.0");
        assert_eq!(normalize_module_version("1.0.0"), "1.0.0");
    }
}
