//! Configuration discovery and effective settings resolution.
//!
//! wilayah reads `wilayah.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `csv_dir`: `csv`
//! - `json_dir`: `json`
//! - `output`: `human`
//! - `sync.indent`: 2, `sync.write`: false
//! - `validate.source`: `csv`, `validate.duplicates`: false
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use crate::models::{Level, Representation};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["wilayah.toml", "wilayah.yaml", "wilayah.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Synchronization settings under `[sync]`.
pub struct SyncCfg {
    /// Default write behavior for `wilayah sync` when CLI flags are absent
    pub write: Option<bool>,
    /// Indent width for generated JSON documents
    pub indent: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Validation settings under `[validate]`.
pub struct ValidateCfg {
    pub source: Option<String>, // csv|json
    pub duplicates: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `wilayah.toml|yaml`.
pub struct WilayahConfig {
    pub csv_dir: Option<String>,
    pub json_dir: Option<String>,
    pub output: Option<String>,
    #[serde(default)]
    pub sync: Option<SyncCfg>,
    #[serde(default)]
    pub validate: Option<ValidateCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub csv_dir: String,
    pub json_dir: String,
    pub output: String,
    pub indent: usize,
    pub sync_write: bool,
    pub source: Representation,
    pub check_duplicates: bool,
}

impl Effective {
    /// Defaults rooted at `repo_root`, ignoring any config file.
    pub fn with_root(repo_root: impl Into<PathBuf>) -> Self {
        Effective {
            repo_root: repo_root.into(),
            csv_dir: "csv".to_string(),
            json_dir: "json".to_string(),
            output: "human".to_string(),
            indent: 2,
            sync_write: false,
            source: Representation::Tabular,
            check_duplicates: false,
        }
    }

    /// Location of one dataset in the given serialization.
    pub fn dataset_path(&self, level: Level, repr: Representation) -> PathBuf {
        let dir = match repr {
            Representation::Tabular => &self.csv_dir,
            Representation::Document => &self.json_dir,
        };
        self.repo_root
            .join(dir)
            .join(format!("{}.{}", level.dataset(), repr.extension()))
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `wilayah.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `WilayahConfig` from `wilayah.toml` or `wilayah.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<WilayahConfig>, ConfigError> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<WilayahConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<WilayahConfig>(&s).map_err(|e| e.to_string())
        };
        return parsed
            .map(Some)
            .map_err(|message| ConfigError::Invalid { path, message });
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_output: Option<&str>,
    cli_source: Option<&str>,
) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root)?.unwrap_or_default();
    let mut eff = Effective::with_root(repo_root);

    if let Some(dir) = cfg.csv_dir {
        eff.csv_dir = dir;
    }
    if let Some(dir) = cfg.json_dir {
        eff.json_dir = dir;
    }

    eff.output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or(eff.output);
    if eff.output != "human" && eff.output != "json" {
        return Err(ConfigError::UnknownValue {
            what: "output mode",
            value: eff.output,
            expected: "human|json",
        });
    }

    if let Some(sync) = cfg.sync.as_ref() {
        eff.indent = sync.indent.unwrap_or(eff.indent);
        eff.sync_write = sync.write.unwrap_or(eff.sync_write);
    }

    let validate = cfg.validate.unwrap_or_default();
    if let Some(tok) = cli_source.map(|s| s.to_string()).or(validate.source) {
        eff.source = Representation::parse(&tok).ok_or(ConfigError::UnknownValue {
            what: "source",
            value: tok,
            expected: "csv|json",
        })?;
    }
    eff.check_duplicates = validate.duplicates.unwrap_or(false);
    Ok(eff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("wilayah.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
csv_dir = "data/csv"
output = "json"
[sync]
write = true
indent = 4
[validate]
duplicates = true
    "#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(root.to_str(), None, None).unwrap();
        assert_eq!(eff.csv_dir, "data/csv");
        assert_eq!(eff.json_dir, "json");
        assert_eq!(eff.output, "json");
        assert_eq!(eff.indent, 4);
        assert!(eff.sync_write);
        assert!(eff.check_duplicates);
        assert_eq!(
            eff.dataset_path(Level::Village, Representation::Tabular),
            root.join("data/csv/villages.csv")
        );
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("wilayah.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
json_dir: dist/json
validate:
  source: json
            "#
        )
        .unwrap();

        let eff = resolve_effective(root.to_str(), None, None).unwrap();
        assert_eq!(eff.json_dir, "dist/json");
        assert_eq!(eff.output, "human");
        assert_eq!(eff.indent, 2);
        assert!(!eff.sync_write);
        assert_eq!(eff.source, Representation::Document);
    }

    #[test]
    fn test_cli_takes_precedence_over_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("wilayah.toml"),
            "output = \"json\"\n[validate]\nsource = \"json\"\n",
        )
        .unwrap();
        let eff = resolve_effective(root.to_str(), Some("human"), Some("csv")).unwrap();
        assert_eq!(eff.output, "human");
        assert_eq!(eff.source, Representation::Tabular);
    }

    #[test]
    fn test_detect_root_walks_up_to_git() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("csv/nested")).unwrap();
        assert_eq!(detect_repo_root(&root.join("csv/nested")), root);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("wilayah.toml"), "csv_dir = [1, 2]\n").unwrap();
        assert!(matches!(
            resolve_effective(root.to_str(), None, None),
            Err(ConfigError::Invalid { .. })
        ));
        fs::remove_file(root.join("wilayah.toml")).unwrap();
        assert!(matches!(
            resolve_effective(root.to_str(), None, Some("xml")),
            Err(ConfigError::UnknownValue { what: "source", .. })
        ));
        assert!(matches!(
            resolve_effective(root.to_str(), Some("yaml"), None),
            Err(ConfigError::UnknownValue { .. })
        ));
    }
}
