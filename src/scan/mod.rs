//! Structural scanner for class bodies.
//!
//! Works on the text alone, without a grammar:
//! - class and struct regions are found by a header regex followed by
//!   brace-depth matching;
//! - each region is walked line by line, tracking the access section and the
//!   brace depth so that only member-level lines (depth 1) are read as
//!   declarations;
//! - a public method "acquires a lock" when a lock construct appears in a
//!   textual window around its signature. The window is an approximation:
//!   it can miss a lock far below a long signature, and can attribute a
//!   neighbor's lock to a short method.
//!
//! Callers pass the code view from [`strip::blank_comments_and_literals`];
//! with the raw text, braces inside comments and literals are counted too.

pub mod strip;
pub mod vocab;

use crate::models::{AccessState, ClassProfile, MethodLockInfo};
use regex::Regex;
use std::sync::LazyLock;

static CLASS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<kind>class|struct)\s+(?P<name>\w+)(?:\s+final)?(?:\s*:\s*[^{;]+)?\s*\{")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<name>~?\b\w+)\s*\([^)]*\)\s*(?:(?:const|noexcept|override|final)\b\s*)*(?:->\s*[\w:<>*&, ]+?\s*)?(?:=\s*(?:0|default|delete)\s*)?(?P<end>[{;]|$)",
    )
    .unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Words that may precede a parenthesis without making it a declaration.
const NON_TYPE_WORDS: &[&str] = &[
    "return", "operator", "new", "delete", "throw", "else", "case", "co_return", "co_await",
    "co_yield", "goto", "sizeof", "typeid",
];

/// Identifiers followed by `(` that are never method names.
const KEYWORD_CALLS: &[&str] = &[
    "if", "while", "for", "switch", "return", "sizeof", "decltype", "alignof", "alignas",
    "static_assert", "catch", "noexcept",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where to look for lock constructs belonging to a public method.
pub enum LockWindow {
    /// Anywhere in the class region.
    ClassBody,
    /// From `before` lines above the signature up to `after` lines starting
    /// at the signature (exclusive).
    Lines { before: usize, after: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub window: LockWindow,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            window: LockWindow::Lines {
                before: 2,
                after: 20,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Struct,
}

impl ClassKind {
    fn default_access(self) -> AccessState {
        match self {
            ClassKind::Class => AccessState::Private,
            ClassKind::Struct => AccessState::Public,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Byte span of one class body, from the header keyword to the closing brace.
pub struct ClassRegion {
    pub name: String,
    pub kind: ClassKind,
    pub start: usize,
    /// Offset of the closing brace (inclusive).
    pub end: usize,
}

/// Locate every class/struct header with a matched body.
///
/// Headers whose body never closes are skipped.
pub fn find_class_regions(code: &str) -> Vec<ClassRegion> {
    let mut regions = Vec::new();
    for caps in CLASS_HEADER.captures_iter(code) {
        let (Some(whole), Some(kind), Some(name)) =
            (caps.get(0), caps.name("kind"), caps.name("name"))
        else {
            continue;
        };
        if preceded_by_enum(code, whole.start()) {
            continue;
        }
        let open = whole.end() - 1;
        let Some(close) = matching_brace(code, open) else {
            continue;
        };
        regions.push(ClassRegion {
            name: name.as_str().to_string(),
            kind: if kind.as_str() == "struct" {
                ClassKind::Struct
            } else {
                ClassKind::Class
            },
            start: whole.start(),
            end: close,
        });
    }
    regions
}

fn preceded_by_enum(code: &str, at: usize) -> bool {
    let before = code[..at].trim_end();
    let Some(head) = before.strip_suffix("enum") else {
        return false;
    };
    !head
        .chars()
        .last()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Offset of the brace closing the one at `open`, counting every brace.
fn matching_brace(code: &str, open: usize) -> Option<usize> {
    let mut depth: usize = 0;
    for (i, b) in code.as_bytes()[open..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// 0-based line number of a byte offset.
fn line_of(code: &str, offset: usize) -> usize {
    code.as_bytes()[..offset].iter().filter(|b| **b == b'\n').count()
}

/// Scan a code view and return the threading-relevant class profiles.
pub fn scan(file: &str, code: &str, opts: &ScanOptions) -> Vec<ClassProfile> {
    find_class_regions(code)
        .into_iter()
        .map(|region| profile_region(file, code, &region, opts))
        .filter(ClassProfile::is_relevant)
        .collect()
}

/// Build the profile of one region. The result may be irrelevant; callers
/// filter with [`ClassProfile::is_relevant`].
pub fn profile_region(
    file: &str,
    code: &str,
    region: &ClassRegion,
    opts: &ScanOptions,
) -> ClassProfile {
    let body = &code[region.start..=region.end];
    let first_line = line_of(code, region.start);
    let lines: Vec<&str> = body.split('\n').collect();

    let mut profile = ClassProfile {
        name: region.name.clone(),
        source_file: file.to_string(),
        start_line: first_line + 1,
        mutex_members: vocab::mutex_members(body),
        public_lock_methods: Vec::new(),
        private_unlocked_methods: Vec::new(),
    };

    let mut access = region.kind.default_access();
    let mut depth: i64 = 0;
    for (k, line) in lines.iter().enumerate() {
        let depth_at_start = depth;
        depth += brace_delta(line);
        if depth_at_start != 1 {
            continue;
        }
        let trimmed = line.trim();
        if let Some(state) = AccessState::from_label(trimmed) {
            access = state;
            continue;
        }
        let Some(name) = match_signature(trimmed, next_code_line(&lines, k)) else {
            continue;
        };
        if name == region.name || name.starts_with('~') || name == "operator" {
            continue;
        }
        match access {
            AccessState::Public => {
                let (tags, window_end) = window_locks(body, &lines, k, opts.window);
                if !tags.is_empty() {
                    profile.public_lock_methods.push(MethodLockInfo {
                        method_name: name,
                        line_number: first_line + k + 1,
                        matched_lock_constructs: tags,
                        window_end: first_line + window_end + 1,
                    });
                }
            }
            AccessState::Private => {
                if name.ends_with("_unlocked") && !profile.has_unlocked(&name) {
                    profile.private_unlocked_methods.push(name);
                }
            }
            AccessState::Protected => {}
        }
    }
    profile
}

fn brace_delta(line: &str) -> i64 {
    line.bytes().fold(0, |acc, b| match b {
        b'{' => acc + 1,
        b'}' => acc - 1,
        _ => acc,
    })
}

fn next_code_line<'a>(lines: &[&'a str], k: usize) -> Option<&'a str> {
    lines[k + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
}

/// Lock tags inside the window of the signature at region line `k`, and the
/// last region line (0-based) the window covers.
fn window_locks(
    body: &str,
    lines: &[&str],
    k: usize,
    window: LockWindow,
) -> (Vec<&'static str>, usize) {
    match window {
        LockWindow::ClassBody => (vocab::lock_tags(body), lines.len().saturating_sub(1)),
        LockWindow::Lines { before, after } => {
            let start = k.saturating_sub(before);
            let end = (k + after).min(lines.len()).max(k + 1);
            let text = lines[start..end].join("\n");
            (vocab::lock_tags(&text), end - 1)
        }
    }
}

/// Recognize a method declaration or definition on one trimmed line.
///
/// The line must end its signature with `{`, `;`, or at end of line with
/// the next non-blank line opening a body. The identifier must be preceded
/// by something that reads as a return type, which rules out bare calls,
/// member calls, and initializer expressions.
pub fn match_signature(trimmed: &str, next: Option<&str>) -> Option<String> {
    let caps = SIGNATURE.captures(trimmed)?;
    let name = caps.name("name")?;
    let end = caps.name("end")?;
    if end.as_str().is_empty() && !next.is_some_and(|n| n.starts_with('{')) {
        return None;
    }
    let ident = name.as_str();
    if ident.starts_with('~') {
        return Some(ident.to_string());
    }
    if KEYWORD_CALLS.contains(&ident) {
        return None;
    }
    if !is_declaration_prefix(&trimmed[..name.start()]) {
        return None;
    }
    Some(ident.to_string())
}

fn is_declaration_prefix(prefix: &str) -> bool {
    let p = prefix.trim_end();
    if p.ends_with("->") || p.ends_with("::") {
        return false;
    }
    let Some(last) = p.chars().last() else {
        return false;
    };
    if !(last.is_alphanumeric() || matches!(last, '_' | '>' | '*' | '&')) {
        return false;
    }
    let last_word = p
        .rsplit(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or("");
    !NON_TYPE_WORDS.contains(&last_word)
}
