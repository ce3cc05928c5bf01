//! Configuration discovery and effective settings resolution.
//!
//! Lockpair reads `lockpair.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults:
//! - `dirs`: `["src", "include"]`
//! - `extensions`: `cpp, cc, cxx, h, hh, hpp`
//! - `strict`, `fix_suggestions`: false
//! - `format`: `human`
//! - `scan.strip_comments`: true
//! - `scan.method_window`: 20
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{LockpairError, Result};
use crate::models::Severity;
use crate::rules::{RuleId, RuleSettings};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_NAMES: [&str; 3] = ["lockpair.toml", "lockpair.yaml", "lockpair.yml"];
const DEFAULT_DIRS: [&str; 2] = ["src", "include"];
const DEFAULT_EXTENSIONS: [&str; 6] = ["cpp", "cc", "cxx", "h", "hh", "hpp"];
const DEFAULT_METHOD_WINDOW: usize = 20;

#[derive(Debug, Default, Deserialize, Clone)]
/// Scanner section under `[scan]`.
pub struct ScanCfg {
    pub strip_comments: Option<bool>,
    pub method_window: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Per-rule override under `[rules.<ID>]`.
pub struct RuleCfg {
    pub enabled: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `lockpair.toml|yaml`.
pub struct LockpairConfig {
    pub dirs: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub strict: Option<bool>,
    pub fix_suggestions: Option<bool>,
    pub format: Option<String>,
    pub scan: Option<ScanCfg>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    /// Config file that was loaded, if any.
    pub source: Option<PathBuf>,
    pub dirs: Vec<String>,
    pub extensions: Vec<String>,
    pub strict: bool,
    pub fix_suggestions: bool,
    pub format: String,
    pub strip_comments: bool,
    pub method_window: usize,
    pub rules: RuleSettings,
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None` defers to the config file.
pub struct CliOverrides<'a> {
    pub repo_root: Option<&'a str>,
    pub strict: Option<bool>,
    pub fix_suggestions: Option<bool>,
    pub format: Option<&'a str>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `lockpair.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `LockpairConfig` from `lockpair.toml` or `lockpair.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<(LockpairConfig, PathBuf)>> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| LockpairError::Io {
            source,
            path: path.clone(),
        })?;
        let cfg: LockpairConfig = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|source| LockpairError::Toml {
                source,
                path: path.clone(),
            })?
        } else {
            serde_yaml::from_str(&s).map_err(|source| LockpairError::Yaml {
                source,
                path: path.clone(),
            })?
        };
        return Ok(Some((cfg, path)));
    }
    Ok(None)
}

/// Turn `[rules.<ID>]` tables into engine settings.
pub fn rule_settings(rules: &BTreeMap<String, RuleCfg>) -> Result<RuleSettings> {
    let mut settings = RuleSettings::default();
    for (key, rc) in rules {
        let id = RuleId::parse(key).ok_or_else(|| LockpairError::UnknownRule(key.clone()))?;
        if rc.enabled == Some(false) {
            settings.disabled.insert(id);
        }
        if let Some(level) = rc.level.as_deref() {
            let sev = Severity::parse(level).ok_or_else(|| LockpairError::InvalidLevel {
                rule: key.clone(),
                level: level.to_string(),
            })?;
            settings.levels.insert(id, sev);
        }
    }
    Ok(settings)
}

fn to_strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
/// Accept `human` or `json`; anything else is an error.
pub fn output_format(format: String) -> Result<String> {
    match format.as_str() {
        "human" | "json" => Ok(format),
        _ => Err(LockpairError::InvalidFormat(format)),
    }
}

pub fn resolve_effective(cli: &CliOverrides) -> Result<Effective> {
    let start = PathBuf::from(cli.repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let (cfg, source) = match load_config(&repo_root)? {
        Some((cfg, path)) => (cfg, Some(path)),
        None => (LockpairConfig::default(), None),
    };

    let format = cli
        .format
        .map(|s| s.to_string())
        .or(cfg.format)
        .unwrap_or_else(|| "human".to_string());
    let format = output_format(format)?;

    let scan = cfg.scan.unwrap_or_default();

    Ok(Effective {
        repo_root,
        source,
        dirs: cfg.dirs.unwrap_or_else(|| to_strings(&DEFAULT_DIRS)),
        extensions: cfg
            .extensions
            .unwrap_or_else(|| to_strings(&DEFAULT_EXTENSIONS)),
        strict: cli.strict.or(cfg.strict).unwrap_or(false),
        fix_suggestions: cli
            .fix_suggestions
            .or(cfg.fix_suggestions)
            .unwrap_or(false),
        format,
        strip_comments: scan.strip_comments.unwrap_or(true),
        method_window: scan.method_window.unwrap_or(DEFAULT_METHOD_WINDOW),
        rules: rule_settings(&cfg.rules)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn overrides(root: &Path) -> CliOverrides<'_> {
        CliOverrides {
            repo_root: root.to_str(),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_repo_root_walks_up_to_git() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("src/audio")).unwrap();
        assert_eq!(detect_repo_root(&root.join("src/audio")), root);
    }

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(&overrides(dir.path())).unwrap();
        assert!(eff.source.is_none());
        assert_eq!(eff.dirs, vec!["src", "include"]);
        assert_eq!(eff.extensions.len(), 6);
        assert!(!eff.strict);
        assert!(eff.strip_comments);
        assert_eq!(eff.method_window, 20);
        assert_eq!(eff.format, "human");
    }

    #[test]
    fn test_toml_values_and_cli_precedence() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("lockpair.toml"),
            r#"
dirs = ["engine"]
strict = true
format = "json"
[scan]
method_window = 30
[rules.CONST_METHOD_LOCK]
enabled = false
[rules.MULTIPLE_MUTEXES]
level = "error"
"#,
        )
        .unwrap();
        let mut cli = overrides(dir.path());
        cli.strict = Some(false);
        let eff = resolve_effective(&cli).unwrap();
        assert_eq!(eff.dirs, vec!["engine"]);
        assert!(!eff.strict, "CLI wins over file");
        assert_eq!(eff.format, "json");
        assert_eq!(eff.method_window, 30);
        assert!(eff.rules.disabled.contains(&RuleId::ConstMethodLock));
        assert_eq!(
            eff.rules.levels.get(&RuleId::MultipleMutexes),
            Some(&Severity::Error)
        );
    }

    #[test]
    fn test_yaml_config_is_read() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("lockpair.yaml"),
            "fix_suggestions: true\nextensions: [cpp]\n",
        )
        .unwrap();
        let eff = resolve_effective(&overrides(dir.path())).unwrap();
        assert!(eff.fix_suggestions);
        assert_eq!(eff.extensions, vec!["cpp"]);
        assert!(eff.source.unwrap().ends_with("lockpair.yaml"));
    }

    #[test]
    fn test_unknown_rule_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("lockpair.toml"),
            "[rules.NOT_A_RULE]\nenabled = false\n",
        )
        .unwrap();
        let err = resolve_effective(&overrides(dir.path())).unwrap_err();
        assert!(matches!(err, LockpairError::UnknownRule(ref id) if id == "NOT_A_RULE"));
    }

    #[test]
    fn test_malformed_toml_reports_path() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lockpair.toml"), "strict = [").unwrap();
        let err = resolve_effective(&overrides(dir.path())).unwrap_err();
        assert!(err.to_string().contains("lockpair.toml"));
    }

    #[test]
    fn test_invalid_format_rejected() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        let mut cli = overrides(dir.path());
        cli.format = Some("xml");
        assert!(matches!(
            resolve_effective(&cli),
            Err(LockpairError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_output_format_accepts_known_names_only() {
        assert_eq!(output_format("json".to_string()).unwrap(), "json");
        assert_eq!(output_format("human".to_string()).unwrap(), "human");
        assert!(matches!(
            output_format("yaml".to_string()),
            Err(LockpairError::InvalidFormat(f)) if f == "yaml"
        ));
    }
}
