//! Skill Updater
//!
//! Downloads the upstream repository archive, extracts it into a scoped
//! temporary directory, and replaces the installed skill tree with the
//! extracted copy. The temporary directory is removed on every exit path;
//! the installation itself is swapped with a plain delete-then-copy.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use crate::remote::archive_urls;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Download the newest copy of `repo` and install it over `skill_path`.
///
/// Fatal on total download failure, on an archive that does not contain
/// the expected `<name>-<branch>` directory, and on filesystem errors
/// while replacing the installation.
pub fn update_skill(repo: &str, skill_path: &Path) -> Result<()> {
    println!("Downloading update...");

    let temp = tempfile::tempdir().context("Failed to create temporary directory")?;
    let archive_path = temp.path().join("archive.tar.gz");

    download_archive(repo, &archive_path)?;
    extract_archive(&archive_path, temp.path())?;

    let extracted = find_extracted_dir(temp.path(), short_repo_name(repo))?;
    replace_dir(&extracted, skill_path)?;

    println!("Update complete.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

/// Fetch the archive into `dest`, trying each branch candidate in order.
fn download_archive(repo: &str, dest: &Path) -> Result<()> {
    let client = reqwest::blocking::Client::new();

    for url in archive_urls(repo) {
        match fetch_to_file(&client, &url, dest) {
            Ok(()) => return Ok(()),
            Err(e) => debug!("Archive download failed for {}: {}", url, e),
        }
    }

    bail!("Failed to download the update archive for {}", repo);
}

fn fetch_to_file(client: &reqwest::blocking::Client, url: &str, dest: &Path) -> Result<()> {
    let mut response = client.get(url).send()?;
    if !response.status().is_success() {
        bail!("{} returned {}", url, response.status());
    }

    let mut file =
        fs::File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    response
        .copy_to(&mut file)
        .context("Failed to write the archive to disk")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Extract and install
// ---------------------------------------------------------------------------

/// Unpack a `.tar.gz` archive into `dest`.
fn extract_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)
        .with_context(|| format!("Failed to open {}", archive_path.display()))?;

    let mut archive = Archive::new(GzDecoder::new(file));
    archive
        .unpack(dest)
        .context("Failed to extract the update archive")?;

    Ok(())
}

/// The `name` half of an `owner/name` repository identifier.
fn short_repo_name(repo: &str) -> &str {
    repo.rsplit('/').next().unwrap_or(repo)
}

/// Find the directory the archive unpacked to.
///
/// GitHub archives expand to a single `<name>-<branch>` directory;
/// anything else means the extraction went wrong.
fn find_extracted_dir(dir: &Path, repo_name: &str) -> Result<PathBuf> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(repo_name) {
            return Ok(path);
        }
    }

    bail!("Extracted archive has no {}-* directory", repo_name);
}

/// Replace `dest` with a copy of `src`, removing any previous tree first.
///
/// Not transactional: an interruption between the remove and the copy
/// leaves no installation behind.
fn replace_dir(src: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest).with_context(|| {
            format!("Failed to remove the old installation at {}", dest.display())
        })?;
    }

    copy_dir_recursive(src, dest)
}

/// Copy a directory tree, creating `dest` and descending into
/// subdirectories.
fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;

    let entries =
        fs::read_dir(src).with_context(|| format!("Failed to list {}", src.display()))?;

    for entry in entries {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a gzipped tarball at `archive_path` whose single top-level
    /// directory is `root_name`, mirroring a GitHub branch archive.
    fn make_archive(archive_path: &Path, root_name: &str) {
        let staging = tempfile::tempdir().unwrap();
        fs::write(
            staging.path().join("SKILL.md"),
            "name: demo\nrepo: acme/demo\nversion: 1.1.0\n",
        )
        .unwrap();
        fs::create_dir(staging.path().join("scripts")).unwrap();
        fs::write(staging.path().join("scripts").join("run.sh"), "#!/bin/sh\n").unwrap();

        let file = fs::File::create(archive_path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.append_dir_all(root_name, staging.path()).unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_short_repo_name() {
        assert_eq!(short_repo_name("acme/demo"), "demo");
        assert_eq!(short_repo_name("demo"), "demo");
    }

    #[test]
    fn test_find_extracted_dir_matches_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("demo-master")).unwrap();
        fs::write(dir.path().join("archive.tar.gz"), b"not a dir").unwrap();

        let found = find_extracted_dir(dir.path(), "demo").unwrap();
        assert_eq!(found, dir.path().join("demo-master"));
    }

    #[test]
    fn test_find_extracted_dir_fails_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("unrelated")).unwrap();

        assert!(find_extracted_dir(dir.path(), "demo").is_err());
    }

    #[test]
    fn test_copy_dir_recursive_copies_nested_trees() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("a/b")).unwrap();
        fs::write(src.path().join("top.txt"), "top").unwrap();
        fs::write(src.path().join("a/b/deep.txt"), "deep").unwrap();

        let dest = tempfile::tempdir().unwrap();
        let dest_path = dest.path().join("copy");
        copy_dir_recursive(src.path(), &dest_path).unwrap();

        assert_eq!(fs::read_to_string(dest_path.join("top.txt")).unwrap(), "top");
        assert_eq!(
            fs::read_to_string(dest_path.join("a/b/deep.txt")).unwrap(),
            "deep"
        );
    }

    #[test]
    fn test_replace_dir_removes_previous_tree() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("new.txt"), "new").unwrap();

        let dest = tempfile::tempdir().unwrap();
        let dest_path = dest.path().join("skill");
        fs::create_dir(&dest_path).unwrap();
        fs::write(dest_path.join("old.txt"), "old").unwrap();

        replace_dir(src.path(), &dest_path).unwrap();

        assert!(!dest_path.join("old.txt").exists());
        assert_eq!(fs::read_to_string(dest_path.join("new.txt")).unwrap(), "new");
    }

    #[test]
    fn test_extract_locate_and_install() {
        let temp = tempfile::tempdir().unwrap();
        let archive_path = temp.path().join("archive.tar.gz");
        make_archive(&archive_path, "demo-main");

        extract_archive(&archive_path, temp.path()).unwrap();
        let extracted = find_extracted_dir(temp.path(), "demo").unwrap();

        let install = tempfile::tempdir().unwrap();
        let skill_path = install.path().join("demo");
        fs::create_dir(&skill_path).unwrap();
        fs::write(skill_path.join("SKILL.md"), "version: 1.0.0\n").unwrap();

        replace_dir(&extracted, &skill_path).unwrap();

        let skill_md = fs::read_to_string(skill_path.join("SKILL.md")).unwrap();
        assert!(skill_md.contains("version: 1.1.0"));
        assert!(skill_path.join("scripts/run.sh").exists());
    }
}
