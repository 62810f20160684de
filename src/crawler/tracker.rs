use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::TrawlError;

/// Persisted per-repository crawl state: the incremental baseline.
///
/// `observed_files` from the previous completed run drives
/// deleted-file pruning; `last_run_unix` drives the change-tracker
/// gate. Written only when a run completes (not terminated).
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RunState {
    pub last_run_unix: u64,
    pub observed_files: BTreeSet<String>,
}

pub fn state_path(data_dir: &Path, repo_name: &str) -> PathBuf {
    data_dir.join("state").join(format!("{}.json", repo_name))
}

/// Reads a repository's run state. `None` when missing or corrupt; a
/// corrupt state just means the next crawl is a full one.
pub fn read_state(data_dir: &Path, repo_name: &str) -> Option<RunState> {
    let path = state_path(data_dir, repo_name);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(err) => {
            log::warn!(
                "corrupt run state for repo {} at {}: {}",
                repo_name,
                path.display(),
                err
            );
            None
        }
    }
}

/// Writes a repository's run state atomically (temp file + rename).
pub fn write_state(data_dir: &Path, repo_name: &str, state: &RunState) -> Result<(), TrawlError> {
    let path = state_path(data_dir, repo_name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &json)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

/// Whether the file changed since the repository's last completed run.
///
/// Compares the mtime (seconds) strictly against `last_run_unix`; a
/// file whose mtime cannot be read is treated as updated so it is
/// never silently skipped.
pub fn is_updated(path: &Path, last_run_unix: u64) -> bool {
    let mtime = path
        .metadata()
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs());
    match mtime {
        Some(secs) => secs > last_run_unix,
        None => true,
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Formats unix seconds as an ISO 8601 UTC timestamp.
///
/// Civil-from-days conversion per Howard Hinnant's date algorithms.
pub fn format_unix_iso8601(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (hour, min, sec) = (rem / 3600, (rem % 3600) / 60, rem % 60);

    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year, month, day, hour, min, sec
    )
}
