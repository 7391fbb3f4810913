//! Supporting helpers: leveled log prefixes and path display.

use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;

/// Colors are on unless `NO_COLOR` is set.
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn prefix(label: &str, paint: fn(&str) -> String) -> String {
    if colors_enabled() {
        paint(label)
    } else {
        label.to_string()
    }
}

pub fn error_prefix() -> String {
    prefix("error:", |s| s.red().bold().to_string())
}

pub fn warn_prefix() -> String {
    prefix("warn:", |s| s.yellow().bold().to_string())
}

pub fn info_prefix() -> String {
    prefix("info:", |s| s.blue().bold().to_string())
}

pub fn note_prefix() -> String {
    prefix("note:", |s| s.bright_black().to_string())
}

/// `path` relative to `base` with forward slashes, or as-is when unrelated.
pub fn display_path(base: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, base)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}

/// `path` relative to the current working directory.
pub fn rel_to_wd(path: &Path) -> String {
    match std::env::current_dir() {
        Ok(wd) if path.is_absolute() => display_path(&wd, path),
        _ => path.to_string_lossy().to_string(),
    }
}

pub fn ensure_parent(p: &Path) -> std::io::Result<()> {
    match p.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_path_is_relative_to_base() {
        let base = Path::new("/repo");
        assert_eq!(
            display_path(base, Path::new("/repo/csv/provinces.csv")),
            "csv/provinces.csv"
        );
        assert_eq!(display_path(base, Path::new("/repo")), "/repo");
    }

    #[test]
    fn test_prefixes_carry_their_level() {
        // colored or not, the label text is present
        assert!(warn_prefix().contains("warn:"));
        assert!(info_prefix().contains("info:"));
        assert!(error_prefix().contains("error:"));
    }

    #[test]
    fn test_ensure_parent_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("json/nested/provinces.json");
        ensure_parent(&target).unwrap();
        assert!(dir.path().join("json/nested").is_dir());
    }
}
