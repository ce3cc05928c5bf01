//! Report rendering for `check`, `analyze` and `rules`.
//!
//! Supports `human` (default) and `json` outputs. Renderers return strings
//! so the binary can print them or write them to `--output`; the JSON form
//! carries the issues and a top-level summary.

use crate::exit::ExitStatus;
use crate::models::{CheckResult, ClassProfile, Issue, Severity};
use crate::rules::RULES;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::fmt::Write as _;

const CLEAN_MESSAGE: &str = "✓ No threading safety issues detected.";
const TOP_CLASSES: usize = 5;

/// Exit status for a finished run.
///
/// Errors give 2; warnings give 1 only in strict mode; otherwise 0.
pub fn exit_status(res: &CheckResult, strict: bool) -> ExitStatus {
    if res.has_errors() {
        ExitStatus::Errors
    } else if res.has_warnings() && strict {
        ExitStatus::Warnings
    } else {
        ExitStatus::Clean
    }
}

fn section_header(sev: Severity, color: bool) -> String {
    let (icon, title) = match sev {
        Severity::Error => ("✖", "ERRORS (must fix):"),
        Severity::Warning => ("▲", "WARNINGS (should fix):"),
        Severity::Info => ("◆", "INFO (consider fixing):"),
    };
    if !color {
        return format!("{} {}", icon, title);
    }
    match sev {
        Severity::Error => format!("{} {}", icon.red(), title.red().bold()),
        Severity::Warning => format!("{} {}", icon.yellow(), title.yellow().bold()),
        Severity::Info => format!("{} {}", icon.blue(), title.blue().bold()),
    }
}

fn location(is: &Issue, color: bool) -> String {
    let loc = format!("{}:{}", is.file, is.line);
    if color {
        loc.bold().to_string()
    } else {
        loc
    }
}

/// Severity-grouped report: errors, then warnings, then infos.
pub fn render_check(res: &CheckResult, fix_suggestions: bool, color: bool) -> String {
    if res.issues.is_empty() {
        return if color {
            CLEAN_MESSAGE.green().to_string()
        } else {
            CLEAN_MESSAGE.to_string()
        };
    }
    let mut out = String::new();
    out.push_str("Threading Safety Issues Report\n");
    out.push_str(&"=".repeat(40));
    out.push_str("\n\n");
    for sev in [Severity::Error, Severity::Warning, Severity::Info] {
        let group: Vec<&Issue> = res.issues.iter().filter(|i| i.severity == sev).collect();
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{}", section_header(sev, color));
        for is in group {
            let _ = writeln!(out, "  {} — {}", location(is, color), is.message);
            if let (true, Some(s)) = (fix_suggestions, is.suggestion.as_deref()) {
                let label = if color {
                    "Suggestion:".cyan().to_string()
                } else {
                    "Suggestion:".to_string()
                };
                let _ = writeln!(out, "    {} {}", label, s);
            }
        }
        out.push('\n');
    }
    let summary = format!(
        "Summary: {} errors, {} warnings, {} info ({} files, {} classes)",
        res.summary.errors,
        res.summary.warnings,
        res.summary.infos,
        res.summary.files,
        res.summary.classes
    );
    if color {
        out.push_str(&summary.bold().to_string());
    } else {
        out.push_str(&summary);
    }
    out
}

/// Issues attributed to `class`: those at its header or at one of its
/// public lock method signatures.
fn class_issues<'a>(res: &'a CheckResult, class: &ClassProfile) -> Vec<&'a Issue> {
    res.issues
        .iter()
        .filter(|i| i.file == class.source_file)
        .filter(|i| {
            i.line == class.start_line
                || class
                    .public_lock_methods
                    .iter()
                    .any(|m| m.line_number == i.line)
        })
        .collect()
}

/// Class-grouped markdown report with aggregate counts.
pub fn render_classes(res: &CheckResult, color: bool) -> String {
    let mut out = String::new();
    out.push_str("# Threading Safety Analysis\n\n");
    if res.classes.is_empty() {
        out.push_str("No classes with mutex usage found.\n");
        append_unattributed(&mut out, res, color);
        return out;
    }
    let _ = writeln!(
        out,
        "Found {} classes with threading concerns:\n",
        res.classes.len()
    );

    let mut counts: Vec<(&str, usize)> = Vec::with_capacity(res.classes.len());
    for class in &res.classes {
        let title = format!("## Class: {}", class.name);
        if color {
            let _ = writeln!(out, "{}", title.bold());
        } else {
            let _ = writeln!(out, "{}", title);
        }
        let _ = writeln!(out, "File: {}:{}\n", class.source_file, class.start_line);

        if !class.mutex_members.is_empty() {
            out.push_str("### Mutex Members:\n");
            for m in &class.mutex_members {
                let _ = writeln!(out, "  - {}", m);
            }
            out.push('\n');
        }
        if !class.public_lock_methods.is_empty() {
            out.push_str("### Public Lock-Acquiring Methods:\n");
            for m in &class.public_lock_methods {
                let _ = writeln!(
                    out,
                    "  - {} (line {}) [{}]",
                    m.method_name,
                    m.line_number,
                    m.matched_lock_constructs.join(", ")
                );
            }
            out.push('\n');
        }
        if !class.private_unlocked_methods.is_empty() {
            out.push_str("### Private Unlocked Methods:\n");
            for m in &class.private_unlocked_methods {
                let _ = writeln!(out, "  - {}", m);
            }
            out.push('\n');
        }
        let issues = class_issues(res, class);
        if !issues.is_empty() {
            let head = "### Potential Issues:";
            if color {
                let _ = writeln!(out, "{}", head.yellow().bold());
            } else {
                let _ = writeln!(out, "{}", head);
            }
            for is in &issues {
                let _ = writeln!(out, "  - [{}] {}", is.severity, is.message);
            }
            out.push('\n');
        }
        counts.push((class.name.as_str(), issues.len()));
        out.push_str(&"-".repeat(40));
        out.push_str("\n\n");
    }

    append_unattributed(&mut out, res, color);

    let lock_methods: usize = res
        .classes
        .iter()
        .map(|c| c.public_lock_methods.len())
        .sum();
    out.push_str("## Summary\n");
    let _ = writeln!(out, "- Files scanned: {}", res.summary.files);
    let _ = writeln!(out, "- Classes analyzed: {}", res.summary.classes);
    let _ = writeln!(out, "- Public lock-acquiring methods: {}", lock_methods);
    let _ = writeln!(
        out,
        "- Potential threading issues: {} ({} errors, {} warnings, {} info)",
        res.summary.errors + res.summary.warnings + res.summary.infos,
        res.summary.errors,
        res.summary.warnings,
        res.summary.infos
    );

    // stable sort keeps discovery order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let top: Vec<&(&str, usize)> = counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .take(TOP_CLASSES)
        .collect();
    if !top.is_empty() {
        out.push_str("\n## Classes with most potential issues\n");
        for (name, n) in top {
            let _ = writeln!(out, "  - {}: {} issues", name, n);
        }
    }
    out
}

/// Issues not tied to a class, such as unreadable files.
fn append_unattributed(out: &mut String, res: &CheckResult, color: bool) {
    let loose: Vec<&Issue> = res
        .issues
        .iter()
        .filter(|i| !res.classes.iter().any(|c| class_issues(res, c).contains(i)))
        .collect();
    if loose.is_empty() {
        return;
    }
    out.push_str("## Other Issues\n");
    for is in loose {
        let _ = writeln!(
            out,
            "  - [{}] {} — {}",
            is.severity,
            location(is, color),
            is.message
        );
    }
    out.push('\n');
}

fn issues_json(issues: &[Issue], fix_suggestions: bool) -> JsonVal {
    let items: Vec<Issue> = issues
        .iter()
        .cloned()
        .map(|mut is| {
            if !fix_suggestions {
                is.suggestion = None;
            }
            is
        })
        .collect();
    serde_json::to_value(items).unwrap_or(JsonVal::Null)
}

/// Compose the JSON document for `check`.
pub fn compose_check_json(res: &CheckResult, fix_suggestions: bool) -> JsonVal {
    json!({
        "issues": issues_json(&res.issues, fix_suggestions),
        "summary": res.summary,
    })
}

/// Compose the JSON document for `analyze`.
pub fn compose_analyze_json(res: &CheckResult) -> JsonVal {
    json!({
        "classes": res.classes,
        "issues": issues_json(&res.issues, false),
        "summary": res.summary,
    })
}

/// Table of the built-in rules.
pub fn render_rules(format: &str, color: bool) -> String {
    if format == "json" {
        let items: Vec<JsonVal> = RULES
            .iter()
            .map(|r| {
                json!({
                    "id": r.id.as_str(),
                    "severity": r.severity,
                    "summary": r.summary,
                })
            })
            .collect();
        return serde_json::to_string_pretty(&items).unwrap_or_default();
    }
    let width = RULES
        .iter()
        .map(|r| r.id.as_str().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for r in RULES {
        let id = format!("{:width$}", r.id.as_str(), width = width);
        let sev = format!("{:7}", r.severity.as_str());
        if color {
            let _ = writeln!(out, "{}  {}  {}", id.bold(), sev.dimmed(), r.summary);
        } else {
            let _ = writeln!(out, "{}  {}  {}", id, sev, r.summary);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MethodLockInfo, Summary};

    fn issue(sev: Severity, line: usize, rule: &str) -> Issue {
        Issue {
            severity: sev,
            file: "src/player.h".into(),
            line,
            message: format!("{} finding", rule),
            suggestion: Some("do the thing".into()),
            rule: rule.into(),
        }
    }

    fn result(issues: Vec<Issue>) -> CheckResult {
        let summary = Summary::tally(&issues);
        CheckResult {
            classes: Vec::new(),
            issues,
            summary,
        }
    }

    #[test]
    fn test_exit_code_table() {
        assert_eq!(exit_status(&result(vec![]), false), ExitStatus::Clean);
        let warn = result(vec![issue(Severity::Warning, 3, "MULTIPLE_MUTEXES")]);
        assert_eq!(exit_status(&warn, false), ExitStatus::Clean);
        assert_eq!(exit_status(&warn, true), ExitStatus::Warnings);
        let both = result(vec![
            issue(Severity::Warning, 3, "MULTIPLE_MUTEXES"),
            issue(Severity::Error, 4, "MISSING_UNLOCKED_METHOD"),
        ]);
        assert_eq!(exit_status(&both, false), ExitStatus::Errors);
        assert_eq!(exit_status(&both, true), ExitStatus::Errors);
    }

    #[test]
    fn test_render_check_clean() {
        assert_eq!(render_check(&result(vec![]), false, false), CLEAN_MESSAGE);
    }

    #[test]
    fn test_render_check_groups_errors_before_warnings() {
        let res = result(vec![
            issue(Severity::Warning, 3, "MULTIPLE_MUTEXES"),
            issue(Severity::Error, 9, "CALLBACK_UNDER_LOCK"),
        ]);
        let out = render_check(&res, false, false);
        let err = out.find("ERRORS (must fix):").unwrap();
        let warn = out.find("WARNINGS (should fix):").unwrap();
        assert!(err < warn);
        assert!(out.contains("  src/player.h:9 — CALLBACK_UNDER_LOCK finding"));
        assert!(!out.contains("Suggestion:"));
        assert!(out.contains("Summary: 1 errors, 1 warnings, 0 info"));
    }

    #[test]
    fn test_render_check_suggestions_on_request() {
        let res = result(vec![issue(Severity::Error, 9, "CALLBACK_UNDER_LOCK")]);
        let out = render_check(&res, true, false);
        assert!(out.contains("    Suggestion: do the thing"));
    }

    #[test]
    fn test_check_json_shape() {
        let res = result(vec![issue(Severity::Error, 9, "CALLBACK_UNDER_LOCK")]);
        let v = compose_check_json(&res, false);
        assert_eq!(v["issues"][0]["severity"], "error");
        assert_eq!(v["issues"][0]["rule"], "CALLBACK_UNDER_LOCK");
        assert!(v["issues"][0].get("suggestion").is_none());
        assert_eq!(v["summary"]["errors"], 1);
        let with = compose_check_json(&res, true);
        assert_eq!(with["issues"][0]["suggestion"], "do the thing");
    }

    #[test]
    fn test_render_classes_lists_members_and_attributed_issues() {
        let class = ClassProfile {
            name: "Player".into(),
            source_file: "src/player.h".into(),
            start_line: 2,
            mutex_members: vec!["m_mutex".into()],
            public_lock_methods: vec![MethodLockInfo {
                method_name: "play".into(),
                line_number: 4,
                matched_lock_constructs: vec!["lock_guard"],
                window_end: 10,
            }],
            private_unlocked_methods: vec![],
        };
        let mut res = result(vec![
            issue(Severity::Error, 4, "MISSING_UNLOCKED_METHOD"),
            issue(Severity::Warning, 0, "FILE_READ_ERROR"),
        ]);
        res.summary.classes = 1;
        res.classes.push(class);
        let out = render_classes(&res, false);
        assert!(out.contains("## Class: Player"));
        assert!(out.contains("  - m_mutex"));
        assert!(out.contains("  - play (line 4) [lock_guard]"));
        assert!(out.contains("  - [error] MISSING_UNLOCKED_METHOD finding"));
        assert!(out.contains("## Other Issues"));
        assert!(out.contains("  - Player: 1 issues"));
    }

    #[test]
    fn test_render_rules_lists_every_rule() {
        let out = render_rules("human", false);
        assert_eq!(out.lines().count(), RULES.len());
        assert!(out.contains("CONST_METHOD_LOCK"));
        let v: JsonVal = serde_json::from_str(&render_rules("json", false)).unwrap();
        assert_eq!(v[0]["id"], "MISSING_UNLOCKED_METHOD");
        assert_eq!(v[0]["severity"], "error");
    }
}
