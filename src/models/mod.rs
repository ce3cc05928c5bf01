//! Shared data models for scanner output, rule findings, and summaries.

pub mod profile;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use profile::{AccessState, ClassProfile, MethodLockInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Issue severity. Ordered so that `Error` sorts first.
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Lowercase label used in human output and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Parse `error|warning|warn|info` (case-insensitive).
    pub fn parse(s: &str) -> Option<Severity> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" | "warn" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single finding with severity and location.
///
/// `line` is 1-based; file-scoped findings use 1 and read failures use 0.
pub struct Issue {
    pub severity: Severity,
    pub file: String,
    pub line: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub rule: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Aggregated counts used by printers.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub files: usize,
    pub classes: usize,
}

impl Summary {
    /// Count issues per severity. `files` and `classes` are filled by the caller.
    pub fn tally(issues: &[Issue]) -> Summary {
        let mut s = Summary::default();
        for is in issues {
            match is.severity {
                Severity::Error => s.errors += 1,
                Severity::Warning => s.warnings += 1,
                Severity::Info => s.infos += 1,
            }
        }
        s
    }
}

#[derive(Debug, Clone, Default, Serialize)]
/// Result of one pipeline run over a set of files.
///
/// Issues and classes appear in file discovery order; within a file,
/// issues follow the rule table order.
pub struct CheckResult {
    pub classes: Vec<ClassProfile>,
    pub issues: Vec<Issue>,
    pub summary: Summary,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.summary.warnings > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(sev: Severity) -> Issue {
        Issue {
            severity: sev,
            file: "a.h".into(),
            line: 1,
            message: "m".into(),
            suggestion: None,
            rule: "R".into(),
        }
    }

    #[test]
    fn test_severity_parse_accepts_aliases() {
        assert_eq!(Severity::parse("WARN"), Some(Severity::Warning));
        assert_eq!(Severity::parse(" error "), Some(Severity::Error));
        assert_eq!(Severity::parse("fatal"), None);
    }

    #[test]
    fn test_summary_tally_counts_each_severity() {
        let issues = vec![
            issue(Severity::Error),
            issue(Severity::Warning),
            issue(Severity::Warning),
            issue(Severity::Info),
        ];
        let s = Summary::tally(&issues);
        assert_eq!((s.errors, s.warnings, s.infos), (1, 2, 1));
    }

    #[test]
    fn test_issue_json_omits_missing_suggestion() {
        let v = serde_json::to_value(issue(Severity::Error)).unwrap();
        assert_eq!(v["severity"], "error");
        assert!(v.get("suggestion").is_none());
    }
}
