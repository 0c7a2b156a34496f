//! Resolves the git metadata used to stamp build artifacts: branch, full
//! commit hash, descriptive tag and commit date. Every query degrades to a
//! fixed default when git is unavailable or the directory is not a
//! repository, so resolution itself never fails.

use std::{path::Path, process::Command};

/// Branch reported when git cannot provide one.
pub const DEFAULT_BRANCH: &str = "master";

/// Hash reported when git cannot provide one: the length of a full SHA-1.
pub const NULL_HASH: &str = "0000000000000000000000000000000000000000";

/// Metadata resolved from the surrounding repository, local to one
/// invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    branch: String,
    tag: String,
    commit_hash: String,
    commit_date: String,
}

impl Metadata {
    /// Resolve all four values against `repo`, or against the current
    /// working directory when no repository path is given. A failed query
    /// terminates in its default value, exactly once, with no retries.
    pub fn resolve(repo: Option<&Path>) -> Metadata {
        let branch = query(repo, &["rev-parse", "--abbrev-ref", "HEAD"])
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let commit_hash =
            query(repo, &["rev-parse", "HEAD"]).unwrap_or_else(|| NULL_HASH.to_string());
        let tag = query(repo, &["describe", "--dirty", "--always", "--tags"])
            .map(|tag| strip_hash_segment(&tag, &commit_hash))
            .unwrap_or_default();
        let commit_date = query(repo, &["show", "-s", "--format=%cd"]).unwrap_or_default();

        Metadata {
            branch,
            tag,
            commit_hash,
            commit_date,
        }
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }
    pub fn tag(&self) -> &str {
        &self.tag
    }
    pub fn commit_hash(&self) -> &str {
        &self.commit_hash
    }
    pub fn commit_date(&self) -> &str {
        &self.commit_date
    }

    /// The token-to-value mapping templates substitute against.
    pub fn tokens(&self) -> [(&'static str, &str); 4] {
        [
            ("GIT_BRANCH", self.branch.as_str()),
            ("GIT_TAG", self.tag.as_str()),
            ("GIT_COMMIT_HASH", self.commit_hash.as_str()),
            ("GIT_COMMIT_DATE", self.commit_date.as_str()),
        ]
    }
}

/// Run one git query and return its trimmed stdout. Any failure (missing
/// tool, non-zero exit, non-UTF-8 or empty output) yields None so the
/// caller can substitute its default.
fn query(repo: Option<&Path>, args: &[&str]) -> Option<String> {
    let mut cmd = Command::new("git");
    if let Some(repo) = repo {
        cmd.arg("-C").arg(repo);
    }
    let output = match cmd.args(args).output() {
        Ok(output) => output,
        Err(err) => {
            tracing::debug!("git {}: cannot run git: {}", args.join(" "), err);
            return None;
        }
    };
    if !output.status.success() {
        tracing::debug!("git {}: {}", args.join(" "), output.status);
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

/// `git describe` marks untagged states with a `-<count>-g<abbrev>` suffix.
/// The abbreviated hash repeats what the full hash already carries, so the
/// segment is dropped when it matches; anything else is left alone.
fn strip_hash_segment(tag: &str, hash: &str) -> String {
    let mut segments: Vec<&str> = tag.split('-').collect();
    if segments.len() > 2 {
        if let Some(abbrev) = segments[2].get(1..) {
            // A stripped one-character segment would match every hash.
            if !abbrev.is_empty() && hash.contains(abbrev) {
                segments.remove(2);
            }
        }
    }
    segments.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HASH: &str = "abcdef0123456789abcdef0123456789abcdef01";

    #[test]
    fn tag_hash_segment_is_dropped() {
        assert_eq!(strip_hash_segment("v1.2-3-gabcdef0", HASH), "v1.2-3");
    }

    #[test]
    fn tag_dirty_marker_survives_the_drop() {
        assert_eq!(
            strip_hash_segment("v1.2-3-gabcdef0-dirty", HASH),
            "v1.2-3-dirty"
        );
    }

    #[test]
    fn tag_with_two_segments_is_unmodified() {
        assert_eq!(strip_hash_segment("v1.2-3", HASH), "v1.2-3");
    }

    #[test]
    fn tag_without_segments_is_unmodified() {
        assert_eq!(strip_hash_segment("v1.2", HASH), "v1.2");
    }

    #[test]
    fn tag_with_foreign_third_segment_is_kept() {
        assert_eq!(
            strip_hash_segment("v1.2-3-gffffff0", HASH),
            "v1.2-3-gffffff0"
        );
    }

    #[test_log::test]
    fn defaults_apply_outside_a_repository() -> anyhow::Result<()> {
        // An empty temporary directory is not a repository, so every
        // query fails and the defaults take over.
        let td = TempDir::new()?;
        let meta = Metadata::resolve(Some(td.path()));

        assert_eq!(meta.branch(), DEFAULT_BRANCH);
        assert_eq!(meta.commit_hash(), NULL_HASH);
        assert_eq!(meta.tag(), "");
        assert_eq!(meta.commit_date(), "");
        Ok(())
    }

    #[test]
    fn tokens_cover_all_four_names() -> anyhow::Result<()> {
        let td = TempDir::new()?;
        let meta = Metadata::resolve(Some(td.path()));

        let names: Vec<&str> = meta.tokens().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["GIT_BRANCH", "GIT_TAG", "GIT_COMMIT_HASH", "GIT_COMMIT_DATE"]
        );
        Ok(())
    }
}
