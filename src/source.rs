//! Source loading.
//!
//! Reads a file leniently (invalid UTF-8 is replaced, not rejected) and
//! prepares the code view used by the scanner. A read failure is reported
//! as a `FILE_READ_ERROR` warning instead of an error.

use crate::models::{Issue, Severity};
use crate::rules::RuleId;
use crate::scan::strip;
use std::fs;
use std::path::{Path, PathBuf};

/// Marker that excludes a file when it appears in its first lines.
pub const IGNORE_DIRECTIVE: &str = "lockpair:ignore";
const IGNORE_DIRECTIVE_LINES: usize = 5;

/// One loaded file: the raw text and a same-length code view.
pub struct SourceFile {
    pub path: PathBuf,
    /// Path as shown in reports.
    pub display: String,
    pub text: String,
    pub code: String,
}

impl SourceFile {
    /// Build from text already in memory.
    pub fn from_text(display: &str, text: String, strip_comments: bool) -> SourceFile {
        let code = if strip_comments {
            strip::blank_comments_and_literals(&text)
        } else {
            text.clone()
        };
        SourceFile {
            path: PathBuf::from(display),
            display: display.to_string(),
            text,
            code,
        }
    }

    pub fn has_ignore_directive(&self) -> bool {
        self.text
            .lines()
            .take(IGNORE_DIRECTIVE_LINES)
            .any(|line| line.contains(IGNORE_DIRECTIVE))
    }
}

/// Load `path`, or describe why it could not be read.
pub fn load(path: &Path, display: &str, strip_comments: bool) -> Result<SourceFile, Issue> {
    match fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let mut file = SourceFile::from_text(display, text, strip_comments);
            file.path = path.to_path_buf();
            Ok(file)
        }
        Err(e) => Err(Issue {
            severity: Severity::Warning,
            file: display.to_string(),
            line: 0,
            message: format!("Could not read file: {}", e),
            suggestion: None,
            rule: RuleId::FileReadError.as_str().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_is_warning() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.cpp");
        let err = match load(&missing, "nope.cpp", true) {
            Ok(_) => panic!("expected a read failure"),
            Err(e) => e,
        };
        assert_eq!(err.severity, Severity::Warning);
        assert_eq!(err.rule, "FILE_READ_ERROR");
        assert_eq!(err.line, 0);
        assert!(err.message.starts_with("Could not read file"));
    }

    #[test]
    fn test_load_replaces_invalid_utf8() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("latin1.h");
        fs::write(&p, b"// caf\xe9\nclass A {};\n").unwrap();
        let f = load(&p, "latin1.h", true).ok().unwrap();
        assert!(f.text.contains("class A {};"));
        assert_eq!(f.text.len(), f.code.len());
    }

    #[test]
    fn test_ignore_directive_only_in_header_lines() {
        let top = SourceFile::from_text("a.h", "// lockpair:ignore\nclass A {};".into(), true);
        assert!(top.has_ignore_directive());
        let deep = SourceFile::from_text(
            "b.h",
            "\n\n\n\n\n\n// lockpair:ignore\n".into(),
            true,
        );
        assert!(!deep.has_ignore_directive());
    }
}
