//! Configuration loading and management.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. A YAML file: `--config`, `TODO_LIST_CONFIG_PATH`, `./.todo-list/config.yaml`,
//!    or `<config dir>/todo-list/config.yaml` (first one found)
//! 3. Environment variables: `TODO_LIST_DB_PATH`, `TODO_LIST_FORMAT`
//! 4. CLI flags, applied by the binary

use crate::format::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_PATH_ENV: &str = "TODO_LIST_CONFIG_PATH";
pub const DB_PATH_ENV: &str = "TODO_LIST_DB_PATH";
pub const FORMAT_ENV: &str = "TODO_LIST_FORMAT";

const APP_DIR: &str = "todo-list";
const PROJECT_CONFIG: &str = ".todo-list/config.yaml";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where tasks are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR).join("todo.db"))
        .unwrap_or_else(|| PathBuf::from(".todo-list/todo.db"))
}

/// How task lists are printed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the config file and apply environment overrides.
    ///
    /// An explicitly named file must exist; the implicit locations are
    /// optional. Returns the config and the file it came from, if any.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let (mut config, source) = match explicit {
            Some(path) => (Self::load(&path)?, Some(path)),
            None => match candidate_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => (Self::load(&path)?, Some(path)),
                None => (Self::default(), None),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        debug!(
            source = ?source,
            db_path = %config.storage.db_path.display(),
            "Loaded configuration"
        );

        Ok((config, source))
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = lookup(DB_PATH_ENV) {
            self.storage.db_path = PathBuf::from(db_path);
        }

        if let Some(format) = lookup(FORMAT_ENV) {
            match OutputFormat::from_str(&format) {
                Some(format) => self.display.format = format,
                None => warn!(value = %format, "Ignoring unknown {}", FORMAT_ENV),
            }
        }
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.storage.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(PROJECT_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR).join("config.yaml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_sections_use_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.display.format, OutputFormat::Text);
        assert!(config.storage.db_path.ends_with("todo.db"));
    }

    #[test]
    fn yaml_fields_override_defaults() {
        let yaml = "storage:\n  db_path: /tmp/tasks.db\ndisplay:\n  format: json\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/tasks.db"));
        assert_eq!(config.display.format, OutputFormat::Json);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> =
            HashMap::from([(DB_PATH_ENV, "/var/lib/todo.db"), (FORMAT_ENV, "json")]);
        let mut config = Config::default();

        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.storage.db_path, PathBuf::from("/var/lib/todo.db"));
        assert_eq!(config.display.format, OutputFormat::Json);
    }

    #[test]
    fn unknown_format_in_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|k| (k == FORMAT_ENV).then(|| "xml".to_string()));
        assert_eq!(config.display.format, OutputFormat::Text);
    }

    #[test]
    fn load_reads_file_and_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("todo.db");
        let config_path = dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            format!("storage:\n  db_path: {}\n", db_path.display()),
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        config.ensure_db_dir().unwrap();

        assert_eq!(config.storage.db_path, db_path);
        assert!(dir.path().join("nested").is_dir());
    }
}
