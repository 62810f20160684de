use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use crate::model::{RepositoryDescriptor, ScmKind};

/// Owner used when blame lookup fails or yields nothing.
pub const UNKNOWN_OWNER: &str = "Unknown";

/// Normalizes a path string to unix style:
/// strips a Windows UNC prefix (`\\?\` or `\\.\`) and converts
/// backslashes to forward slashes, so everything downstream reasons
/// about one separator.
pub fn normalize_separators(path: &str) -> String {
    let mut normalized = path.to_string();
    if normalized.starts_with(r"\\?\") || normalized.starts_with(r"\\.\") {
        normalized = normalized[4..].to_string();
    }
    normalized.replace('\\', "/")
}

/// Path relative to the repository root (both unix-normalized).
pub fn relative_path(root_unix: &str, file_unix: &str) -> String {
    match file_unix.strip_prefix(root_unix) {
        Some(rest) => rest.trim_start_matches('/').to_string(),
        None => file_unix.trim_start_matches('/').to_string(),
    }
}

/// The fully-qualified location: `"{repo_name}/{rel_path}"`. Doubles
/// as the index primary key.
pub fn location_filename(repo_name: &str, rel_path: &str) -> String {
    format!("{}/{}", repo_name, rel_path)
}

/// Display path shown in results.
///
/// Default: the location filename after its first `/`. For
/// `file`-scheme repositories: the absolute path with the configured
/// root URL replaced away, then — if the result starts with `/` — the
/// prefix up to and including the first `/` removed. The
/// first-`/`-index behavior is intentional, including its quirk on
/// roots without a leading separator.
pub fn display_location(
    location_filename: &str,
    file_unix: &str,
    repo: &RepositoryDescriptor,
) -> String {
    if repo.scm == ScmKind::File {
        let mut display = file_unix.replace(&repo.url, "");
        if display.starts_with('/') {
            display = match display.find('/') {
                Some(i) => display[i + 1..].to_string(),
                None => display,
            };
        }
        return display;
    }
    match location_filename.find('/') {
        Some(i) => location_filename[i + 1..].to_string(),
        None => location_filename.to_string(),
    }
}

/// md5 hex digest of the file content, the dedup/identity key.
pub fn content_hash(content: &str) -> String {
    format!("{:x}", md5::compute(content.as_bytes()))
}

/// Best-effort code-ownership lookup. Never fatal: `None` means the
/// document is emitted with [`UNKNOWN_OWNER`].
pub trait OwnerResolver {
    fn resolve_owner(
        &self,
        lines: &[String],
        blame_path: &str,
        repo_name: &str,
        repo_root: &Path,
    ) -> Option<String>;
}

/// Attributes ownership to the author blamed for the most lines,
/// via `git blame --line-porcelain`.
pub struct GitBlameResolver;

impl OwnerResolver for GitBlameResolver {
    fn resolve_owner(
        &self,
        _lines: &[String],
        blame_path: &str,
        repo_name: &str,
        repo_root: &Path,
    ) -> Option<String> {
        let output = Command::new("git")
            .args(["blame", "--line-porcelain", "--", blame_path])
            .current_dir(repo_root)
            .output()
            .ok()?;
        if !output.status.success() {
            log::debug!(
                "blame failed for {} in repo {}; owner unknown",
                blame_path,
                repo_name
            );
            return None;
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for line in text.lines() {
            if let Some(author) = line.strip_prefix("author ") {
                *counts.entry(author).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .max_by_key(|(_, n)| *n)
            .map(|(author, _)| author.to_string())
    }
}
