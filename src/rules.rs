//! Rule engine.
//!
//! Rules are records in [`RULES`]: an id, a default severity, a one-line
//! summary, and a trigger. Class triggers run once per class profile, file
//! triggers once per file. The table order is the emission order.
//!
//! Every rule is a textual heuristic; a finding is a candidate for review.

use crate::models::{ClassProfile, Issue, Severity};
use crate::scan::vocab;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

/// Lines above and below a manual unlock searched for a RAII guard.
const GUARD_CONTEXT: usize = 10;
/// Lines above a const locking line searched for `mutable`.
const MUTABLE_CONTEXT_BEFORE: usize = 20;
const MUTABLE_CONTEXT_AFTER: usize = 5;

static LOCK_ORDER_DOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)lock\s+order|acquisition\s+order").unwrap_or_else(|_| panic!("Invalid Regex"))
});
static CONST_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bconst\b").unwrap_or_else(|_| panic!("Invalid Regex")));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleId {
    MissingUnlockedMethod,
    MultipleMutexes,
    ManualLockUnlock,
    PublicCallsPublic,
    MissingLockOrderDoc,
    CallbackUnderLock,
    ConstMethodLock,
    FileReadError,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::MissingUnlockedMethod => "MISSING_UNLOCKED_METHOD",
            RuleId::MultipleMutexes => "MULTIPLE_MUTEXES",
            RuleId::ManualLockUnlock => "MANUAL_LOCK_UNLOCK",
            RuleId::PublicCallsPublic => "PUBLIC_CALLS_PUBLIC",
            RuleId::MissingLockOrderDoc => "MISSING_LOCK_ORDER_DOC",
            RuleId::CallbackUnderLock => "CALLBACK_UNDER_LOCK",
            RuleId::ConstMethodLock => "CONST_METHOD_LOCK",
            RuleId::FileReadError => "FILE_READ_ERROR",
        }
    }

    pub fn parse(s: &str) -> Option<RuleId> {
        RULES
            .iter()
            .map(|r| r.id)
            .chain(std::iter::once(RuleId::FileReadError))
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a rule may look at for one file.
pub struct FileContext<'a> {
    pub file: &'a str,
    /// Raw lines, comments included.
    pub raw_lines: Vec<&'a str>,
    /// Code-view lines, same numbering as `raw_lines`.
    pub code_lines: Vec<&'a str>,
}

impl<'a> FileContext<'a> {
    pub fn new(file: &'a str, raw: &'a str, code: &'a str) -> Self {
        FileContext {
            file,
            raw_lines: raw.split('\n').collect(),
            code_lines: code.split('\n').collect(),
        }
    }
}

/// A rule hit before severity and file are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub line: usize,
    pub message: String,
    pub suggestion: Option<String>,
}

pub enum Trigger {
    Class(fn(&ClassProfile, &FileContext) -> Vec<Finding>),
    File(fn(&FileContext) -> Vec<Finding>),
}

pub struct Rule {
    pub id: RuleId,
    pub severity: Severity,
    pub summary: &'static str,
    pub trigger: Trigger,
}

/// The rule table, in emission order.
pub static RULES: &[Rule] = &[
    Rule {
        id: RuleId::MissingUnlockedMethod,
        severity: Severity::Error,
        summary: "public method acquires a lock but has no private *_unlocked counterpart",
        trigger: Trigger::Class(missing_unlocked_method),
    },
    Rule {
        id: RuleId::MultipleMutexes,
        severity: Severity::Warning,
        summary: "class declares more than one mutex; lock ordering must be verified",
        trigger: Trigger::Class(multiple_mutexes),
    },
    Rule {
        id: RuleId::ManualLockUnlock,
        severity: Severity::Error,
        summary: "manual unlock call with no RAII guard nearby",
        trigger: Trigger::File(manual_lock_unlock),
    },
    Rule {
        id: RuleId::PublicCallsPublic,
        severity: Severity::Warning,
        summary: "public locking method appears to call another public locking method",
        trigger: Trigger::Class(public_calls_public),
    },
    Rule {
        id: RuleId::MissingLockOrderDoc,
        severity: Severity::Warning,
        summary: "several locks taken on one line but no lock order documented in the file",
        trigger: Trigger::File(missing_lock_order_doc),
    },
    Rule {
        id: RuleId::CallbackUnderLock,
        severity: Severity::Error,
        summary: "callback mentioned on a line that acquires a lock",
        trigger: Trigger::File(callback_under_lock),
    },
    Rule {
        id: RuleId::ConstMethodLock,
        severity: Severity::Warning,
        summary: "const code locks but no mutable member is declared nearby",
        trigger: Trigger::File(const_method_lock),
    },
];

/// Rules evaluated by the class-grouped analysis, which searches whole
/// class bodies and has no per-method window.
const ANALYSIS_RULES: &[RuleId] = &[RuleId::MissingUnlockedMethod, RuleId::MultipleMutexes];

/// Per-rule enablement and severity overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSettings {
    pub disabled: HashSet<RuleId>,
    pub levels: BTreeMap<RuleId, Severity>,
}

/// Evaluates the enabled rules over one file's profiles and text.
pub struct RuleEngine {
    active: Vec<(&'static Rule, Severity)>,
}

impl RuleEngine {
    /// Engine for the full checker: every enabled rule.
    pub fn new(settings: &RuleSettings) -> Self {
        Self::select(settings, |_| true)
    }

    /// Engine for the class-grouped analysis.
    pub fn for_analysis(settings: &RuleSettings) -> Self {
        Self::select(settings, |r| ANALYSIS_RULES.contains(&r.id))
    }

    fn select(settings: &RuleSettings, keep: impl Fn(&Rule) -> bool) -> Self {
        let active = RULES
            .iter()
            .filter(|r| keep(*r) && !settings.disabled.contains(&r.id))
            .map(|r| (r, settings.levels.get(&r.id).copied().unwrap_or(r.severity)))
            .collect();
        RuleEngine { active }
    }

    /// Evaluate every active rule for a file, in table order.
    pub fn evaluate(&self, profiles: &[ClassProfile], ctx: &FileContext) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (rule, severity) in &self.active {
            match rule.trigger {
                Trigger::Class(check) => {
                    for p in profiles {
                        push_findings(&mut issues, rule.id, *severity, ctx.file, check(p, ctx));
                    }
                }
                Trigger::File(check) => {
                    push_findings(&mut issues, rule.id, *severity, ctx.file, check(ctx));
                }
            }
        }
        issues
    }
}

fn push_findings(
    issues: &mut Vec<Issue>,
    id: RuleId,
    severity: Severity,
    file: &str,
    findings: Vec<Finding>,
) {
    issues.extend(findings.into_iter().map(|f| Issue {
        severity,
        file: file.to_string(),
        line: f.line,
        message: f.message,
        suggestion: f.suggestion,
        rule: id.as_str().to_string(),
    }));
}

fn missing_unlocked_method(profile: &ClassProfile, _ctx: &FileContext) -> Vec<Finding> {
    profile
        .public_lock_methods
        .iter()
        .filter_map(|m| {
            let expected = format!("{}_unlocked", m.method_name);
            if profile.has_unlocked(&expected) {
                return None;
            }
            Some(Finding {
                line: m.line_number,
                message: format!(
                    "Public method '{}' acquires locks but has no private '{}' counterpart",
                    m.method_name, expected
                ),
                suggestion: Some(format!(
                    "Add private method: {}() that performs the work without acquiring locks",
                    expected
                )),
            })
        })
        .collect()
}

fn multiple_mutexes(profile: &ClassProfile, _ctx: &FileContext) -> Vec<Finding> {
    if profile.mutex_members.len() < 2 {
        return Vec::new();
    }
    vec![Finding {
        line: profile.start_line,
        message: format!(
            "Class '{}' has multiple mutexes ({}) - verify lock acquisition order",
            profile.name,
            profile.mutex_members.join(", ")
        ),
        suggestion: Some(
            "Document the lock acquisition order next to the mutex declarations".to_string(),
        ),
    }]
}

fn manual_lock_unlock(ctx: &FileContext) -> Vec<Finding> {
    let lines = &ctx.raw_lines;
    let mut out = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !vocab::has_manual_unlock(line.trim()) {
            continue;
        }
        let start = i.saturating_sub(GUARD_CONTEXT);
        let end = (i + GUARD_CONTEXT + 1).min(lines.len());
        if lines[start..end].iter().any(|l| vocab::has_raii_guard(l)) {
            continue;
        }
        out.push(Finding {
            line: i + 1,
            message: "Manual lock/unlock detected - use RAII lock guards instead".to_string(),
            suggestion: Some(
                "Replace with std::lock_guard<std::mutex> lock(mutex_name);".to_string(),
            ),
        });
    }
    out
}

/// For each public locking method, look through its forward window for a
/// call to another public locking method. Lines that are the callee's own
/// signature do not count.
fn public_calls_public(profile: &ClassProfile, ctx: &FileContext) -> Vec<Finding> {
    let methods = &profile.public_lock_methods;
    let mut names: Vec<&str> = Vec::new();
    for m in methods {
        if !names.contains(&m.method_name.as_str()) {
            names.push(&m.method_name);
        }
    }
    if names.len() < 2 {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut reported: HashSet<(&str, &str)> = HashSet::new();
    for caller in methods {
        for callee in &names {
            let pair = (caller.method_name.as_str(), *callee);
            if pair.0 == pair.1 || reported.contains(&pair) {
                continue;
            }
            let Ok(call) = Regex::new(&format!(r"\b{}\s*\(", regex::escape(callee))) else {
                continue;
            };
            let callee_lines: HashSet<usize> = methods
                .iter()
                .filter(|m| m.method_name == *callee)
                .map(|m| m.line_number)
                .collect();
            let first = caller.line_number;
            let last = caller.window_end.min(ctx.code_lines.len());
            let hit = (first..=last).find(|ln| {
                !callee_lines.contains(ln)
                    && ctx
                        .code_lines
                        .get(ln - 1)
                        .is_some_and(|l| call.is_match(strip_own_signature(l, caller, *ln)))
            });
            if let Some(ln) = hit {
                reported.insert(pair);
                out.push(Finding {
                    line: ln,
                    message: format!(
                        "Public method '{}' may call public method '{}' - potential deadlock risk",
                        caller.method_name, callee
                    ),
                    suggestion: Some(format!(
                        "Use '{}_unlocked()' instead if calling from within the same class",
                        callee
                    )),
                });
            }
        }
    }
    out
}

/// On the caller's own signature line only the body after the parameter
/// list is a call site.
fn strip_own_signature<'l>(
    line: &'l str,
    caller: &crate::models::MethodLockInfo,
    ln: usize,
) -> &'l str {
    if ln != caller.line_number {
        return line;
    }
    match line.find(&caller.method_name) {
        Some(pos) => match line[pos..].find(')') {
            Some(close) => &line[pos + close + 1..],
            None => "",
        },
        None => line,
    }
}

fn missing_lock_order_doc(ctx: &FileContext) -> Vec<Finding> {
    let multiple = ctx.raw_lines.iter().any(|l| vocab::lock_count(l) >= 2);
    if !multiple {
        return Vec::new();
    }
    if ctx.raw_lines.iter().any(|l| LOCK_ORDER_DOC.is_match(l)) {
        return Vec::new();
    }
    vec![Finding {
        line: 1,
        message: "Multiple locks detected but no lock acquisition order documented".to_string(),
        suggestion: Some(
            "Add comment documenting lock acquisition order to prevent deadlocks".to_string(),
        ),
    }]
}

fn callback_under_lock(ctx: &FileContext) -> Vec<Finding> {
    ctx.raw_lines
        .iter()
        .enumerate()
        .filter(|(_, l)| vocab::has_lock(l) && l.to_lowercase().contains("callback"))
        .map(|(i, _)| Finding {
            line: i + 1,
            message: "Potential callback invocation while holding lock - deadlock risk".to_string(),
            suggestion: Some(
                "Release locks before invoking callbacks or queue callbacks for later execution"
                    .to_string(),
            ),
        })
        .collect()
}

fn const_method_lock(ctx: &FileContext) -> Vec<Finding> {
    let lines = &ctx.raw_lines;
    let mut out = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !CONST_WORD.is_match(line) || !vocab::has_lock(line) {
            continue;
        }
        let start = i.saturating_sub(MUTABLE_CONTEXT_BEFORE);
        let end = (i + MUTABLE_CONTEXT_AFTER + 1).min(lines.len());
        if lines[start..end].iter().any(|l| l.contains("mutable")) {
            continue;
        }
        out.push(Finding {
            line: i + 1,
            message: "Const method acquires lock - ensure mutex is declared as mutable".to_string(),
            suggestion: Some("Declare mutex as 'mutable std::mutex mutex_name;'".to_string()),
        });
    }
    out
}
