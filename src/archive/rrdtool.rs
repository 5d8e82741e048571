//! rrdtool-backed archive store
//!
//! Drives the `rrdtool` executable for introspection (`rrdtool info`) and
//! consolidated range reads (`rrdtool fetch`). Every call spawns a fresh
//! process, so no archive handle outlives the operation that needed it.

use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::process::Command;

use super::error::{ArchiveError, ArchiveResult};
use super::types::{ArchiveInfo, FetchRequest, FetchResult};
use super::ArchiveStore;

/// Archive store that shells out to `rrdtool`
#[derive(Debug, Clone)]
pub struct RrdtoolStore {
    /// Executable to invoke
    binary: PathBuf,
}

impl Default for RrdtoolStore {
    fn default() -> Self {
        Self::new("rrdtool")
    }
}

impl RrdtoolStore {
    /// Create a store using the given `rrdtool` executable
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, subcommand: &str, path: &Path, args: &[String]) -> ArchiveResult<String> {
        let output = Command::new(&self.binary)
            .arg(subcommand)
            .arg(path)
            .args(args)
            .env("LC_ALL", "C")
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ArchiveError::Command {
                command: format!("rrdtool {}", subcommand),
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ArchiveStore for RrdtoolStore {
    async fn info(&self, path: &Path) -> ArchiveResult<ArchiveInfo> {
        let stdout = self.run("info", path, &[]).await?;
        parse_info(path, &stdout)
    }

    async fn fetch(&self, path: &Path, request: &FetchRequest) -> ArchiveResult<FetchResult> {
        let args = vec![
            request.consolidation.as_str().to_string(),
            "-s".to_string(),
            request.start.to_string(),
            "-e".to_string(),
            request.end.to_string(),
            "-r".to_string(),
            request.resolution.to_string(),
        ];
        let stdout = self.run("fetch", path, &args).await?;
        parse_fetch(path, &stdout, request)
    }
}

/// Largest row stamp accepted from `rrdtool fetch` (its milliseconds fit in `i64`)
const MAX_STAMP: i64 = i64::MAX / 1000;

fn ds_index_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^ds\[(?P<name>[^\]]+)\]\.index = (?P<index>\d+)$")
            .expect("data source pattern is valid")
    })
}

/// Parse the key/value listing printed by `rrdtool info`
pub(crate) fn parse_info(path: &Path, stdout: &str) -> ArchiveResult<ArchiveInfo> {
    let parse_err = |reason: String| ArchiveError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let mut step = None;
    let mut last_update = None;
    let mut fields = BTreeMap::new();

    for line in stdout.lines().map(str::trim) {
        if let Some(caps) = ds_index_regex().captures(line) {
            let index = caps["index"]
                .parse::<usize>()
                .map_err(|e| parse_err(format!("bad index in '{}': {}", line, e)))?;
            fields.insert(caps["name"].to_string(), index);
        } else if let Some(value) = line.strip_prefix("step = ") {
            step = Some(
                value
                    .parse::<u64>()
                    .map_err(|e| parse_err(format!("bad step '{}': {}", value, e)))?,
            );
        } else if let Some(value) = line.strip_prefix("last_update = ") {
            last_update = Some(
                value
                    .parse::<i64>()
                    .map_err(|e| parse_err(format!("bad last_update '{}': {}", value, e)))?,
            );
        }
    }

    Ok(ArchiveInfo {
        step: step.ok_or_else(|| parse_err("missing step".to_string()))?,
        last_update: last_update.ok_or_else(|| parse_err("missing last_update".to_string()))?,
        fields,
    })
}

/// Parse the table printed by `rrdtool fetch`
///
/// rrdtool stamps each row with the end of its interval; the result is
/// re-based so that slot `i` sits at `start + i * step`.
pub(crate) fn parse_fetch(
    path: &Path,
    stdout: &str,
    request: &FetchRequest,
) -> ArchiveResult<FetchResult> {
    let parse_err = |reason: String| ArchiveError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());

    let fields: Vec<String> = match lines.next() {
        Some(header) => header.split_whitespace().map(str::to_string).collect(),
        None => return Err(parse_err("empty fetch output".to_string())),
    };

    let mut stamps = Vec::new();
    let mut rows = Vec::new();
    for line in lines {
        let (stamp, values) = line
            .split_once(':')
            .ok_or_else(|| parse_err(format!("row without timestamp: '{}'", line)))?;
        let stamp = stamp
            .trim()
            .parse::<i64>()
            .map_err(|e| parse_err(format!("bad row timestamp '{}': {}", stamp, e)))?;
        if !(0..=MAX_STAMP).contains(&stamp) {
            return Err(parse_err(format!("row timestamp {} out of range", stamp)));
        }
        let row = values
            .split_whitespace()
            .map(|v| v.parse::<f64>().unwrap_or(f64::NAN))
            .collect::<Vec<_>>();
        stamps.push(stamp);
        rows.push(row);
    }

    let step = match stamps.as_slice() {
        [first, second, ..] if second > first => second.abs_diff(*first),
        _ => request.resolution,
    };
    let start = match stamps.first() {
        Some(first) => i64::try_from(step)
            .ok()
            .and_then(|step| first.checked_sub(step))
            .ok_or_else(|| parse_err(format!("step {} out of range", step)))?,
        None => request.start,
    };

    Ok(FetchResult {
        start,
        step,
        fields,
        rows,
    })
}
