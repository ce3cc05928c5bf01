//! Small helpers shared by the binary and printers.

use owo_colors::OwoColorize;
use std::path::Path;

/// Whether human output should be colored. `NO_COLOR` disables it.
pub fn use_colors(format: &str) -> bool {
    format != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn prefix(label: &str, paint: fn(&str) -> String) -> String {
    if use_colors("human") {
        paint(label)
    } else {
        label.to_string()
    }
}

pub fn error_prefix() -> String {
    prefix("error:", |s| s.red().bold().to_string())
}

pub fn note_prefix() -> String {
    prefix("note:", |s| s.cyan().bold().to_string())
}

/// Display `path` relative to the working directory when it lies below it.
pub fn rel_to_wd(path: &Path) -> String {
    let shown = std::env::current_dir()
        .ok()
        .and_then(|wd| pathdiff::diff_paths(path, wd))
        .filter(|rel| !rel.starts_with(".."))
        .unwrap_or_else(|| path.to_path_buf());
    shown.to_string_lossy().to_string()
}
