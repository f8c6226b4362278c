//! Ranking for free-form version sets by catalog history.
//!
//! When versions such as `cci.20201225` cannot be ordered numerically, the
//! most recently *added* catalog entry is taken to be the latest. Recency
//! comes from `git blame -e` output for the descriptor, one line per entry:
//!
//! ```text
//! 815109b9a45 (<jane@example.com>  2022-11-08 20:49:32 +0100 26)   "1.3.5":
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use thiserror::Error;

use crate::resolver::version::LooseVersion;

static ANNOTATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\^?\w+ (?:\S+ )?\(.+\s+(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} [+-]\d{4}) +\d+\) +["']?([^"']+)["']?:$"#,
    )
    .unwrap()
});

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A catalog entry with the time its line was last changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub version: String,
    pub timestamp: DateTime<FixedOffset>,
}

/// A history line or catalog entry that was excluded from ranking.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unrecognised annotate line: {line}")]
    Line { line: String },

    #[error("bad timestamp `{timestamp}` in annotate line: {line}")]
    Timestamp { line: String, timestamp: String },

    #[error("no history found for version `{version}`")]
    Unattributed { version: String },
}

/// Outcome of ranking: the winner, if any, plus every excluded entry.
#[derive(Debug, Clone, Default)]
pub struct HistoricalRanking {
    pub chosen: Option<String>,
    pub diagnostics: Vec<ParseError>,
}

/// Strip the trailing comment and surrounding whitespace from a line.
fn clean(line: &str) -> &str {
    line.split('#').next().unwrap_or("").trim()
}

/// Check whether a cleaned line introduces a version entry.
///
/// Section keys (`versions:`) and per-version fields (`folder: all`) are
/// not entries.
fn is_entry_line(line: &str) -> bool {
    !line.is_empty()
        && !line.contains("versions")
        && !line.contains("folder")
        && line.ends_with(':')
}

/// Parse one cleaned entry line.
pub fn parse_annotate_line(line: &str) -> Result<Attribution, ParseError> {
    let caps = ANNOTATE_LINE.captures(line).ok_or_else(|| ParseError::Line {
        line: line.to_string(),
    })?;

    let timestamp = &caps[1];
    let timestamp = DateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).map_err(|_| {
        ParseError::Timestamp {
            line: line.to_string(),
            timestamp: timestamp.to_string(),
        }
    })?;

    Ok(Attribution {
        version: caps[2].to_string(),
        timestamp,
    })
}

/// Parse every version-entry line of annotate output.
///
/// Lines that are not entries are skipped silently; entry lines that do
/// not parse are returned as errors for the caller to report.
pub fn parse_annotate(text: &str) -> Vec<Result<Attribution, ParseError>> {
    text.lines()
        .map(clean)
        .filter(|line| is_entry_line(line))
        .map(parse_annotate_line)
        .collect()
}

/// Pick the most recently added version in `versions`.
///
/// Ranked by (timestamp, lenient version with `strip_prefixes` removed,
/// original text), all descending. The original identifier is returned.
pub fn rank_historical(
    versions: &[String],
    annotate: &str,
    strip_prefixes: &[String],
) -> HistoricalRanking {
    let mut diagnostics = Vec::new();
    let mut latest: HashMap<String, DateTime<FixedOffset>> = HashMap::new();

    for parsed in parse_annotate(annotate) {
        match parsed {
            Ok(attr) => {
                let entry = latest.entry(attr.version).or_insert(attr.timestamp);
                if attr.timestamp > *entry {
                    *entry = attr.timestamp;
                }
            }
            Err(e) => diagnostics.push(e),
        }
    }

    let mut candidates = Vec::new();
    for version in versions {
        match latest.get(version) {
            Some(timestamp) => candidates.push((
                *timestamp,
                LooseVersion::stripped(version, strip_prefixes),
                version,
            )),
            None => diagnostics.push(ParseError::Unattributed {
                version: version.clone(),
            }),
        }
    }

    let chosen = candidates
        .into_iter()
        .max()
        .map(|(_, _, version)| version.clone());

    HistoricalRanking {
        chosen,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLAME: &str = r#"2a1b3c4d5e6 (<alice@example.com>   2020-05-01 10:00:00 +0000  1) versions:
2a1b3c4d5e6 (<alice@example.com>   2020-05-01 10:00:00 +0000  2)   "cci.20200501":
2a1b3c4d5e6 (<alice@example.com>   2020-05-01 10:00:00 +0000  3)     folder: all
815109b9a45 (<bob@example.com>     2021-01-04 09:30:00 +0100  4)   "cci.20201225":
815109b9a45 (<bob@example.com>     2021-01-04 09:30:00 +0100  5)     folder: all
^0f0f0f0f0f (<carol@example.com>   2019-02-02 12:00:00 -0500  6)   "1.0.0": # legacy
^0f0f0f0f0f (<carol@example.com>   2019-02-02 12:00:00 -0500  7)     folder: all
"#;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn prefixes() -> Vec<String> {
        strings(&["cci."])
    }

    #[test]
    fn test_parse_annotate_line() {
        let line = r#"815109b9a45 (SpaceIm           2022-11-08 20:49:32 +0100 26)   "1.3.5":"#;
        let attr = parse_annotate_line(line).unwrap();
        assert_eq!(attr.version, "1.3.5");
        assert_eq!(attr.timestamp.to_rfc3339(), "2022-11-08T20:49:32+01:00");
    }

    #[test]
    fn test_parse_annotate_line_with_filename_and_boundary() {
        let line = r#"^815109b config.yml (<a@b.c> 2022-11-08 20:49:32 +0100 26) 1.3.5:"#;
        assert_eq!(parse_annotate_line(line).unwrap().version, "1.3.5");
    }

    #[test]
    fn test_parse_annotate_skips_non_entries() {
        let parsed = parse_annotate(BLAME);
        let versions: Vec<_> = parsed
            .iter()
            .map(|p| p.as_ref().unwrap().version.as_str())
            .collect();
        assert_eq!(versions, ["cci.20200501", "cci.20201225", "1.0.0"]);
    }

    #[test]
    fn test_rank_picks_latest_timestamp_and_keeps_prefix() {
        let versions = strings(&["cci.20200501", "cci.20201225", "1.0.0"]);
        let ranking = rank_historical(&versions, BLAME, &prefixes());
        assert_eq!(ranking.chosen.as_deref(), Some("cci.20201225"));
        assert!(ranking.diagnostics.is_empty());
    }

    #[test]
    fn test_same_commit_breaks_tie_on_version() {
        let blame = r#"aaaaaaa (<a@b.c> 2023-03-01 08:00:00 +0000 2)   "cci.20230101":
aaaaaaa (<a@b.c> 2023-03-01 08:00:00 +0000 4)   "cci.20230215":
aaaaaaa (<a@b.c> 2023-03-01 08:00:00 +0000 6)   "cci.20221130":
"#;
        let versions = strings(&["cci.20230101", "cci.20230215", "cci.20221130"]);
        let ranking = rank_historical(&versions, blame, &prefixes());
        assert_eq!(ranking.chosen.as_deref(), Some("cci.20230215"));
    }

    #[test]
    fn test_malformed_line_is_excluded_not_fatal() {
        let blame = r#"aaaaaaa (<a@b.c> 2023-03-01 08:00:00 +0000 2)   "1.0":
garbage that ends with a colon:
bbbbbbb (<a@b.c> 2023-13-45 08:00:00 +0000 4)   "2.0-beta":
"#;
        let versions = strings(&["1.0", "2.0-beta"]);
        let ranking = rank_historical(&versions, blame, &prefixes());

        assert_eq!(ranking.chosen.as_deref(), Some("1.0"));
        assert_eq!(ranking.diagnostics.len(), 3);
        assert!(matches!(ranking.diagnostics[0], ParseError::Line { .. }));
        assert!(matches!(ranking.diagnostics[1], ParseError::Timestamp { .. }));
        assert_eq!(
            ranking.diagnostics[2],
            ParseError::Unattributed {
                version: "2.0-beta".to_string()
            }
        );
    }

    #[test]
    fn test_all_excluded_yields_nothing() {
        let versions = strings(&["cci.20200101"]);
        let ranking = rank_historical(&versions, "not blame output:\n", &prefixes());
        assert!(ranking.chosen.is_none());
        assert_eq!(ranking.diagnostics.len(), 2);
    }

    #[test]
    fn test_timezones_compare_as_instants() {
        // 10:00 +0200 is 08:00 UTC; 09:00 +0000 is later.
        let blame = r#"aaaaaaa (<a@b.c> 2023-03-01 10:00:00 +0200 2)   "cci.b":
bbbbbbb (<a@b.c> 2023-03-01 09:00:00 +0000 4)   "cci.a":
"#;
        let versions = strings(&["cci.a", "cci.b"]);
        let ranking = rank_historical(&versions, blame, &prefixes());
        assert_eq!(ranking.chosen.as_deref(), Some("cci.a"));
    }

    #[test]
    fn test_chosen_timestamp_is_maximal() {
        let versions = strings(&["cci.20200501", "cci.20201225", "1.0.0"]);
        let ranking = rank_historical(&versions, BLAME, &prefixes());
        let chosen = ranking.chosen.unwrap();

        let parsed: Vec<Attribution> = parse_annotate(BLAME).into_iter().flatten().collect();
        let chosen_ts = parsed.iter().find(|a| a.version == chosen).unwrap().timestamp;
        assert!(parsed.iter().all(|a| chosen_ts >= a.timestamp));
    }
}
