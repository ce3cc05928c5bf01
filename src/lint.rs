//! Pipeline runner: Loader -> Scanner -> Rule Engine over many files.
//!
//! Files are processed in parallel; `collect()` keeps discovery order, so
//! the result is identical to a sequential run. Each file is independent
//! and nothing here touches shared state.

use crate::config::Effective;
use crate::models::{CheckResult, ClassProfile, Issue, Summary};
use crate::rules::{FileContext, RuleEngine, RuleSettings};
use crate::scan::{self, LockWindow, ScanOptions};
use crate::source::{self, SourceFile};
use crate::utils::rel_to_wd;
use rayon::prelude::*;
use std::path::PathBuf;

/// Lines above a signature included in its lock window.
const WINDOW_LINES_BEFORE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Per-method windows and every rule.
    Check,
    /// Whole-class-body search and the class rules only.
    Analyze,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub flavor: Flavor,
    pub strip_comments: bool,
    pub method_window: usize,
    pub rules: RuleSettings,
}

impl RunOptions {
    pub fn from_effective(eff: &Effective, flavor: Flavor) -> Self {
        RunOptions {
            flavor,
            strip_comments: eff.strip_comments,
            method_window: eff.method_window,
            rules: eff.rules.clone(),
        }
    }

    fn scan_options(&self) -> ScanOptions {
        let window = match self.flavor {
            Flavor::Check => LockWindow::Lines {
                before: WINDOW_LINES_BEFORE,
                after: self.method_window,
            },
            Flavor::Analyze => LockWindow::ClassBody,
        };
        ScanOptions { window }
    }

    fn engine(&self) -> RuleEngine {
        match self.flavor {
            Flavor::Check => RuleEngine::new(&self.rules),
            Flavor::Analyze => RuleEngine::for_analysis(&self.rules),
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            flavor: Flavor::Check,
            strip_comments: true,
            method_window: 20,
            rules: RuleSettings::default(),
        }
    }
}

/// Outcome for one file.
#[derive(Debug, Default)]
pub struct FileReport {
    /// False when the file was unreadable or carried the ignore directive.
    pub scanned: bool,
    pub classes: Vec<ClassProfile>,
    pub issues: Vec<Issue>,
}

/// Scan and evaluate a loaded source file.
pub fn check_source(
    file: &SourceFile,
    scan_opts: &ScanOptions,
    engine: &RuleEngine,
) -> FileReport {
    if file.has_ignore_directive() {
        tracing::debug!("{}: ignore directive present, skipping", file.display);
        return FileReport::default();
    }
    let classes = scan::scan(&file.display, &file.code, scan_opts);
    tracing::trace!("{}: {} class profiles", file.display, classes.len());
    let ctx = FileContext::new(&file.display, &file.text, &file.code);
    let issues = engine.evaluate(&classes, &ctx);
    FileReport {
        scanned: true,
        classes,
        issues,
    }
}

/// Run the pipeline over `files` in order.
pub fn run(files: &[PathBuf], opts: &RunOptions) -> CheckResult {
    let scan_opts = opts.scan_options();
    let engine = opts.engine();

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| {
            let shown = rel_to_wd(path);
            tracing::debug!("scanning {}", shown);
            match source::load(path, &shown, opts.strip_comments) {
                Ok(file) => check_source(&file, &scan_opts, &engine),
                Err(issue) => {
                    tracing::warn!("{}: {}", shown, issue.message);
                    FileReport {
                        scanned: false,
                        classes: Vec::new(),
                        issues: vec![issue],
                    }
                }
            }
        })
        .collect();

    let mut result = CheckResult::default();
    let mut files_scanned = 0usize;
    for report in reports {
        if report.scanned {
            files_scanned += 1;
        }
        result.classes.extend(report.classes);
        result.issues.extend(report.issues);
    }
    result.summary = Summary {
        files: files_scanned,
        classes: result.classes.len(),
        ..Summary::tally(&result.issues)
    };
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use std::fs;
    use tempfile::tempdir;

    const UNPAIRED: &str = r#"class Player {
public:
    void play() {
        std::lock_guard<std::mutex> lock(m_mutex);
        start();
    }
private:
    std::mutex m_mutex;
};
"#;

    const PAIRED: &str = r#"class Player {
public:
    void play() {
        std::lock_guard<std::mutex> lock(m_mutex);
        play_unlocked();
    }
private:
    void play_unlocked();
    std::mutex m_mutex;
};
"#;

    #[test]
    fn test_run_collects_issues_in_file_order() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.h");
        let b = dir.path().join("b.h");
        fs::write(&a, UNPAIRED).unwrap();
        fs::write(&b, UNPAIRED).unwrap();
        let res = run(&[b.clone(), a.clone()], &RunOptions::default());
        assert_eq!(res.summary.files, 2);
        assert_eq!(res.summary.classes, 2);
        assert_eq!(res.summary.errors, 2);
        assert!(res.issues[0].file.ends_with("b.h"));
        assert!(res.issues[1].file.ends_with("a.h"));
    }

    #[test]
    fn test_paired_class_is_clean() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("player.h");
        fs::write(&a, PAIRED).unwrap();
        let res = run(&[a], &RunOptions::default());
        assert!(res.issues.is_empty(), "{:?}", res.issues);
        assert_eq!(res.summary.classes, 1);
    }

    #[test]
    fn test_missing_file_does_not_stop_the_run() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.cpp");
        let good = dir.path().join("good.h");
        fs::write(&good, UNPAIRED).unwrap();
        let res = run(&[missing, good], &RunOptions::default());
        assert_eq!(res.issues.len(), 2);
        assert_eq!(res.issues[0].rule, "FILE_READ_ERROR");
        assert_eq!(res.issues[0].severity, Severity::Warning);
        assert_eq!(res.issues[1].rule, "MISSING_UNLOCKED_METHOD");
        assert_eq!(res.summary.files, 1);
    }

    #[test]
    fn test_ignore_directive_skips_file() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("vendored.h");
        fs::write(&a, format!("// lockpair:ignore\n{}", UNPAIRED)).unwrap();
        let res = run(&[a], &RunOptions::default());
        assert!(res.issues.is_empty());
        assert!(res.classes.is_empty());
        assert_eq!(res.summary.files, 0);
    }

    #[test]
    fn test_analyze_flavor_searches_whole_class_body() {
        let src = r#"class Wide {
public:
    int idle() { return 0; }
    void busy() { m.lock(); }
private:
    void busy_unlocked();
    std::mutex m;
};
"#;
        let dir = tempdir().unwrap();
        let a = dir.path().join("wide.h");
        fs::write(&a, src).unwrap();
        let opts = RunOptions {
            flavor: Flavor::Analyze,
            ..RunOptions::default()
        };
        let res = run(&[a], &opts);
        let methods: Vec<&str> = res.classes[0]
            .public_lock_methods
            .iter()
            .map(|m| m.method_name.as_str())
            .collect();
        assert_eq!(methods, vec!["idle", "busy"]);
        assert_eq!(res.issues.len(), 1);
        assert!(res.issues[0].message.contains("'idle'"));
        // file-scoped rules do not run in this flavor
        assert!(res.issues.iter().all(|i| i.rule != "MANUAL_LOCK_UNLOCK"));
    }

    #[test]
    fn test_identical_input_gives_identical_output() {
        let dir = tempdir().unwrap();
        let files: Vec<PathBuf> = (0..8)
            .map(|i| {
                let p = dir.path().join(format!("f{}.h", i));
                fs::write(&p, if i % 2 == 0 { UNPAIRED } else { PAIRED }).unwrap();
                p
            })
            .collect();
        let first = run(&files, &RunOptions::default());
        let second = run(&files, &RunOptions::default());
        assert_eq!(first.issues, second.issues);
    }
}
