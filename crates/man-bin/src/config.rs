//! Configuration and search-path resolution.
//!
//! An optional `manview.toml` supplies default and auxiliary database
//! directories. Discovery prefers the working directory, then the platform
//! configuration directory. Unknown fields are ignored so the file can
//! grow without breaking older binaries.

use std::{env, fs, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PathsConfig {
    /// Used when neither `-M` nor `MANPATH` is present.
    #[serde(default)]
    pub default: Vec<String>,
    /// Always appended, after any `-m` paths.
    #[serde(default)]
    pub aux: Vec<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Best-effort config path following platform conventions.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("manview.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("manview").join("manview.toml");
    }
    PathBuf::from("manview.toml")
}

/// Load the configuration, falling back to defaults when the file is
/// missing or malformed.
pub fn load_from(path: Option<PathBuf>) -> ConfigFile {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(path = %path.display(), "configuration loaded");
                file
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring malformed configuration");
                ConfigFile::default()
            }
        },
        Err(_) => ConfigFile::default(),
    }
}

/// Resolve the database search path. `-M` overrides everything; otherwise
/// the `MANPATH` environment, then the configured defaults, then the
/// compiled-in fallback. `-m` and configured aux paths are appended.
pub fn manpath(cfg: &ConfigFile, defpaths: Option<&str>, auxpaths: Option<&str>) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();

    if let Some(list) = defpaths {
        push_list(&mut out, list);
    } else if let Ok(list) = env::var("MANPATH") {
        push_list(&mut out, &list);
    } else if !cfg.paths.default.is_empty() {
        for p in &cfg.paths.default {
            push_unique(&mut out, p);
        }
    } else {
        push_unique(&mut out, "/usr/share/man");
    }

    if let Some(list) = auxpaths {
        push_list(&mut out, list);
    }
    for p in &cfg.paths.aux {
        push_unique(&mut out, p);
    }
    out
}

fn push_list(out: &mut Vec<PathBuf>, list: &str) {
    for p in list.split(':').filter(|p| !p.is_empty()) {
        push_unique(out, p);
    }
}

fn push_unique(out: &mut Vec<PathBuf>, p: &str) {
    let pb = PathBuf::from(p);
    if !out.contains(&pb) {
        out.push(pb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defpaths_flag_overrides_configuration() {
        let cfg = ConfigFile {
            paths: PathsConfig {
                default: vec!["/cfg/man".to_string()],
                aux: vec![],
            },
        };
        let paths = manpath(&cfg, Some("/a:/b::/a"), None);
        assert_eq!(
            paths,
            vec![PathBuf::from("/a"), PathBuf::from("/b")],
            "split on colons, drop empties and duplicates"
        );
    }

    #[test]
    fn aux_paths_are_appended() {
        let cfg = ConfigFile {
            paths: PathsConfig {
                default: vec!["/cfg/man".to_string()],
                aux: vec!["/cfg/aux".to_string()],
            },
        };
        let paths = manpath(&cfg, Some("/base"), Some("/extra"));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/base"),
                PathBuf::from("/extra"),
                PathBuf::from("/cfg/aux"),
            ]
        );
    }

    #[test]
    fn malformed_configuration_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manview.toml");
        fs::write(&path, "paths = 7").unwrap();
        let cfg = load_from(Some(path));
        assert!(cfg.paths.default.is_empty());
    }

    #[test]
    fn missing_configuration_is_default() {
        let cfg = load_from(Some(PathBuf::from("/nonexistent/manview.toml")));
        assert!(cfg.paths.default.is_empty());
        assert!(cfg.paths.aux.is_empty());
    }
}
