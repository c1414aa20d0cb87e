//! Remote Version Lookup
//!
//! Builds the candidate GitHub URLs for a skill repository and fetches the
//! upstream `SKILL.md` to read its `version` field. Lookup failures are
//! soft: the caller gets `None` and decides what to tell the user.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::metadata::{extract_field, SKILL_FILE};

/// Branch names tried in order when the default branch is unknown.
pub const BRANCH_CANDIDATES: [&str; 2] = ["master", "main"];

/// Timeout for remote metadata requests.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Candidate raw-file URLs for the remote metadata document, one per
/// branch.
pub fn metadata_urls(repo: &str) -> Vec<String> {
    BRANCH_CANDIDATES
        .iter()
        .map(|branch| {
            format!(
                "https://raw.githubusercontent.com/{}/{}/{}",
                repo, branch, SKILL_FILE
            )
        })
        .collect()
}

/// Candidate archive URLs for the full repository, one per branch.
pub fn archive_urls(repo: &str) -> Vec<String> {
    BRANCH_CANDIDATES
        .iter()
        .map(|branch| {
            format!(
                "https://github.com/{}/archive/refs/heads/{}.tar.gz",
                repo, branch
            )
        })
        .collect()
}

/// Fetch the version advertised by the remote repository.
///
/// Tries each candidate branch URL in turn and returns the first `version`
/// field found. Returns `Ok(None)` when no candidate yields one -- network
/// errors, non-success statuses, and documents without the field all just
/// move on to the next candidate.
pub fn fetch_remote_version(repo: &str) -> Result<Option<String>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    for url in metadata_urls(repo) {
        let response = match client.get(&url).send() {
            Ok(r) => r,
            Err(e) => {
                debug!("Metadata request failed for {}: {}", url, e);
                continue;
            }
        };

        if !response.status().is_success() {
            debug!("Metadata request for {} returned {}", url, response.status());
            continue;
        }

        let body = match response.text() {
            Ok(b) => b,
            Err(e) => {
                debug!("Failed to read metadata body from {}: {}", url, e);
                continue;
            }
        };

        if let Some(version) = extract_field(&body, "version") {
            return Ok(Some(version));
        }
    }

    Ok(None)
}
