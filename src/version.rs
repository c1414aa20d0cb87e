//! Version Comparison
//!
//! Parses dot-separated version strings into integer tuples and orders
//! them element-wise. A shorter tuple that is a strict prefix of a longer
//! one orders before it; trailing zeros are not padded.

use std::cmp::Ordering;

/// Parse a version string into its numeric segments.
///
/// Splits on `.` and keeps only segments made entirely of ASCII digits.
/// Pre-release tags, build metadata, and empty segments are dropped
/// silently, so this never fails -- a fully non-numeric string parses to
/// an empty tuple.
pub fn parse_version(version: &str) -> Vec<u64> {
    version
        .split('.')
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|s| s.parse().ok())
        .collect()
}

/// Compare two version strings: `Less` means `local` is older than
/// `remote`.
pub fn compare_versions(local: &str, remote: &str) -> Ordering {
    parse_version(local).cmp(&parse_version(remote))
}
