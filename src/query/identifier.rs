//! Metric identifiers
//!
//! External identifiers look like `segment[:segment...]:field`. The segments
//! name an archive file relative to the archive root (one directory level per
//! segment, the last one being the file stem) and `field` names a data source
//! inside that archive.
//!
//! ```text
//! east:cpu:idle  <->  (["east", "cpu"], "idle")  ->  east/cpu.rrd
//! ```
//!
//! A segment that itself contains `:` cannot be told apart from two
//! segments; such archives are reachable only through wildcards.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::archive::ARCHIVE_EXTENSION;
use crate::query::error::{QueryError, QueryResult};

/// External delimiter between segments and before the field
pub const DELIMITER: char = ':';

/// Internal separator between directory levels
pub const PATH_SEPARATOR: &str = "/";

const WILDCARDS: &[char] = &['*', '?', '['];

/// Join segments and field into an external identifier
pub fn encode<S: AsRef<str>>(segments: &[S], field: &str) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push_str(segment.as_ref());
        out.push(DELIMITER);
    }
    out.push_str(field);
    out
}

/// Split an external identifier into segments and field
pub fn decode(identifier: &str) -> QueryResult<(Vec<String>, String)> {
    let (path, field) = identifier
        .rsplit_once(DELIMITER)
        .ok_or_else(|| QueryError::MalformedIdentifier(identifier.to_string()))?;
    let segments = path.split(DELIMITER).map(str::to_string).collect();
    Ok((segments, field.to_string()))
}

/// Relative archive path for a list of segments
pub fn path_of<S: AsRef<str>>(segments: &[S]) -> PathBuf {
    let joined = segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR);
    PathBuf::from(format!("{}.{}", joined, ARCHIVE_EXTENSION))
}

/// Segments for a relative archive path; `None` if it is not an archive path
pub fn segments_of(relative: &Path) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => segments.push(part.to_str()?.to_string()),
            Component::CurDir => {}
            _ => return None,
        }
    }

    let suffix = format!(".{}", ARCHIVE_EXTENSION);
    let stem = segments.pop()?;
    let stem = stem.strip_suffix(&suffix)?;
    if stem.is_empty() {
        return None;
    }
    segments.push(stem.to_string());
    Some(segments)
}

/// A decoded identifier, classified once as exact or wildcard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricIdentifier {
    /// Names exactly one archive
    Exact { segments: Vec<String>, field: String },
    /// Segments contain filesystem wildcards and may match many archives
    Pattern { segments: Vec<String>, field: String },
}

impl MetricIdentifier {
    /// Decode and classify an external identifier
    pub fn parse(identifier: &str) -> QueryResult<Self> {
        let (segments, field) = decode(identifier)?;
        let wildcard = segments.iter().any(|s| s.contains(WILDCARDS));

        Ok(if wildcard {
            MetricIdentifier::Pattern { segments, field }
        } else {
            MetricIdentifier::Exact { segments, field }
        })
    }

    pub fn segments(&self) -> &[String] {
        match self {
            MetricIdentifier::Exact { segments, .. } | MetricIdentifier::Pattern { segments, .. } => {
                segments
            }
        }
    }

    pub fn field(&self) -> &str {
        match self {
            MetricIdentifier::Exact { field, .. } | MetricIdentifier::Pattern { field, .. } => field,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, MetricIdentifier::Pattern { .. })
    }

    /// Archive path relative to the root (may contain wildcards)
    pub fn relative_path(&self) -> PathBuf {
        path_of(self.segments())
    }

    /// Whether every segment names exactly one directory level below the root
    ///
    /// Empty segments, `.`, `..` and segments holding a path separator
    /// are rejected.
    pub fn is_confined(&self) -> bool {
        self.segments().iter().all(|s| is_plain_segment(s))
            && segments_of(&self.relative_path()).is_some()
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(PATH_SEPARATOR)
        && !segment.contains('\\')
}

impl FromStr for MetricIdentifier {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MetricIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self.segments(), self.field()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let cases: &[(&[&str], &str)] = &[
            (&["sample"], "ClientJobsIdle"),
            (&["east", "cpu"], "idle"),
            (&["dc1", "rack 4", "host-7", "load"], "shortterm"),
        ];
        for &(segments, field) in cases {
            let (s, f) = decode(&encode(segments, field)).unwrap();
            assert_eq!(s, segments.to_vec());
            assert_eq!(f, field);
        }
    }

    #[test]
    fn test_decode_without_delimiter() {
        assert!(matches!(
            decode("ClientJobsIdle"),
            Err(QueryError::MalformedIdentifier(_))
        ));
        assert!(matches!(
            MetricIdentifier::parse(""),
            Err(QueryError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_path_of() {
        assert_eq!(path_of(&["east", "cpu"]), PathBuf::from("east/cpu.rrd"));
        assert_eq!(path_of(&["percent-1.5"]), PathBuf::from("percent-1.5.rrd"));
    }

    #[test]
    fn test_segments_of() {
        assert_eq!(
            segments_of(Path::new("east/cpu.rrd")),
            Some(vec!["east".to_string(), "cpu".to_string()])
        );
        assert_eq!(
            segments_of(Path::new("./sample.rrd")),
            Some(vec!["sample".to_string()])
        );
        assert_eq!(segments_of(Path::new("east/cpu.txt")), None);
        assert_eq!(segments_of(Path::new("../cpu.rrd")), None);
        assert_eq!(segments_of(Path::new(".rrd")), None);
    }

    #[test]
    fn test_path_round_trip() {
        let segments = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(segments_of(&path_of(&segments)), Some(segments));
    }

    #[test]
    fn test_classification() {
        let exact: MetricIdentifier = "sample:ClientJobsIdle".parse().unwrap();
        assert!(!exact.is_pattern());
        assert_eq!(exact.segments(), &["sample".to_string()]);
        assert_eq!(exact.field(), "ClientJobsIdle");

        for pattern in ["*:cpu:idle", "host?:load", "[ew]*:cpu:idle"] {
            let id = MetricIdentifier::parse(pattern).unwrap();
            assert!(id.is_pattern(), "{} should be a pattern", pattern);
            assert_eq!(id.to_string(), pattern);
        }
    }

    #[test]
    fn test_confinement() {
        for ok in ["east:cpu:idle", "*:cpu:idle", "dc1:rack 4:load:shortterm", "percent-1.5:value"] {
            assert!(MetricIdentifier::parse(ok).unwrap().is_confined(), "{}", ok);
        }
        for bad in [
            "..:*:v",
            ":*:v",
            ":tmp:*:v",
            "..:..:**:*:v",
            "east/cpu:idle",
            "east:./cpu:idle",
            "east::cpu:idle",
            ".:cpu:idle",
            ":v",
        ] {
            assert!(!MetricIdentifier::parse(bad).unwrap().is_confined(), "{}", bad);
        }
    }

    #[test]
    fn test_wildcard_in_field_is_not_a_pattern() {
        let id = MetricIdentifier::parse("sample:value*").unwrap();
        assert!(!id.is_pattern());
        assert_eq!(id.relative_path(), PathBuf::from("sample.rrd"));
    }
}
