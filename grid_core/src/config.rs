//! # Editor Configuration
//!
//! Settings shared by the front ends, read from the environment:
//!
//! | Variable           | Default        | Meaning                                   |
//! |--------------------|----------------|-------------------------------------------|
//! | `BAYGRID_SNAPSHOT` | `baygrid.json` | Snapshot file                             |
//! | `BAYGRID_USER`     | OS user name   | Name written into the lock file           |
//! | `BAYGRID_LOG`      | `info`         | Log filter when `RUST_LOG` is unset       |
//! | `BAYGRID_AUTOSAVE` | on             | `0`, `false`, `off` or `no` turns it off  |

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const SNAPSHOT_ENV: &str = "BAYGRID_SNAPSHOT";
pub const USER_ENV: &str = "BAYGRID_USER";
pub const LOG_ENV: &str = "BAYGRID_LOG";
pub const AUTOSAVE_ENV: &str = "BAYGRID_AUTOSAVE";

pub const DEFAULT_SNAPSHOT_FILE: &str = "baygrid.json";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    pub snapshot_path: PathBuf,
    pub user_id: String,
    pub log_filter: String,
    pub autosave: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            user_id: whoami::username(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            autosave: true,
        }
    }
}

impl EditorConfig {
    /// Read the process environment
    pub fn from_env() -> Self {
        EditorConfig::from_os_vars(std::env::vars_os())
    }

    /// Build from raw environment pairs; entries that are not UTF-8 are skipped
    pub fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        let vars = vars
            .into_iter()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        EditorConfig::from_vars(vars)
    }

    /// Build from an explicit variable map; unset or blank values fall back to defaults
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());
        let defaults = EditorConfig::default();

        EditorConfig {
            snapshot_path: get(SNAPSHOT_ENV).map(PathBuf::from).unwrap_or(defaults.snapshot_path),
            user_id: get(USER_ENV).map(str::to_string).unwrap_or(defaults.user_id),
            log_filter: get(LOG_ENV).map(str::to_string).unwrap_or(defaults.log_filter),
            autosave: get(AUTOSAVE_ENV).map(parse_switch).unwrap_or(defaults.autosave),
        }
    }
}

fn parse_switch(value: &str) -> bool {
    !matches!(value.to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config = EditorConfig::from_vars(HashMap::new());
        assert_eq!(config.snapshot_path, PathBuf::from("baygrid.json"));
        assert_eq!(config.log_filter, "info");
        assert!(config.autosave);
        assert!(!config.user_id.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = EditorConfig::from_vars(vars(&[
            ("BAYGRID_SNAPSHOT", "/tmp/tower.json"),
            ("BAYGRID_USER", "pat"),
            ("BAYGRID_LOG", "grid_core=debug"),
            ("BAYGRID_AUTOSAVE", "off"),
        ]));
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/tower.json"));
        assert_eq!(config.user_id, "pat");
        assert_eq!(config.log_filter, "grid_core=debug");
        assert!(!config.autosave);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config =
            EditorConfig::from_vars(vars(&[("BAYGRID_SNAPSHOT", "  "), ("BAYGRID_AUTOSAVE", "")]));
        assert_eq!(config.snapshot_path, PathBuf::from(DEFAULT_SNAPSHOT_FILE));
        assert!(config.autosave);
    }

    #[test]
    fn test_default_user_is_the_os_user() {
        assert_eq!(EditorConfig::default().user_id, whoami::username());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_environment_is_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let garbage = OsString::from_vec(vec![0xff, 0xfe]);
        let config = EditorConfig::from_os_vars(vec![
            (OsString::from("UNRELATED"), garbage.clone()),
            (OsString::from(SNAPSHOT_ENV), garbage),
            (OsString::from(USER_ENV), OsString::from("pat")),
        ]);
        assert_eq!(config.snapshot_path, PathBuf::from(DEFAULT_SNAPSHOT_FILE));
        assert_eq!(config.user_id, "pat");
    }

    #[cfg(unix)]
    #[test]
    fn test_from_env_survives_non_utf8_variables() {
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var("BAYGRID_TEST_BYTES", std::ffi::OsStr::from_bytes(b"\xff\xfe"));
        let config = EditorConfig::from_env();
        std::env::remove_var("BAYGRID_TEST_BYTES");
        assert!(!config.log_filter.is_empty());
    }

    #[test]
    fn test_autosave_switch() {
        for off in ["0", "false", "FALSE", "no"] {
            assert!(!parse_switch(off));
        }
        for on in ["1", "true", "yes"] {
            assert!(parse_switch(on));
        }
    }
}
