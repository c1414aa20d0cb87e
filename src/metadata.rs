//! Skill Metadata
//!
//! Reads the `SKILL.md` document at the root of a skill installation and
//! extracts the `name`, `repo`, and `version` fields. The document is
//! treated as free-form text with line-anchored `key: value` pairs, so
//! prose and extra fields around them are fine and field order does not
//! matter.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use regex::Regex;

/// File name of the metadata document inside a skill directory.
pub const SKILL_FILE: &str = "SKILL.md";

/// Placeholder that skill templates ship in the `repo` field.
const REPO_PLACEHOLDER: &str = "TODO";

/// Identity and version of an installed skill.
#[derive(Debug, Clone)]
pub struct SkillMetadata {
    pub name: String,
    /// Remote repository identifier in `owner/name` form.
    pub repo: String,
    pub version: String,
}

/// Read and validate the metadata document under `skill_root`.
pub fn read_skill_metadata(skill_root: &Path) -> Result<SkillMetadata> {
    let path = skill_root.join(SKILL_FILE);
    if !path.exists() {
        bail!("{} not found at {}", SKILL_FILE, path.display());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_skill_metadata(&content)
}

/// Parse the three required fields out of raw `SKILL.md` content.
///
/// Fails if `repo` is absent or still the template placeholder, or if
/// `version` or `name` is absent.
pub fn parse_skill_metadata(content: &str) -> Result<SkillMetadata> {
    let repo = match extract_field(content, "repo") {
        Some(repo) if !repo.contains(REPO_PLACEHOLDER) => repo,
        Some(_) => bail!("{} has a placeholder repo field; set repo to owner/name", SKILL_FILE),
        None => bail!("{} is missing the repo field", SKILL_FILE),
    };

    let version = extract_field(content, "version")
        .with_context(|| format!("{} is missing the version field", SKILL_FILE))?;

    let name = extract_field(content, "name")
        .with_context(|| format!("{} is missing the name field", SKILL_FILE))?;

    Ok(SkillMetadata { name, repo, version })
}

/// Extract a line-anchored `key: value` field from a metadata document.
///
/// Matches `key:` at the start of any line and returns the trimmed
/// remainder. Whitespace-only values count as missing.
pub fn extract_field(content: &str, key: &str) -> Option<String> {
    let pattern = format!(r"(?m)^{}:\s*(.+)$", key);
    let re = Regex::new(&pattern).ok()?;

    re.captures(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|value| !value.is_empty())
}
