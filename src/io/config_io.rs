use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

pub const CONFIG_FILE: &str = "taskhive.toml";

/// Error type for configuration I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse taskhive.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Default data directory, respecting XDG_DATA_HOME
pub fn default_data_dir() -> PathBuf {
    let data_home = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    data_home.join("taskhive")
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read taskhive.toml from the data directory. A missing file means defaults.
pub fn read_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(AppConfig::default());
    }
    let config_text = fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&config_text)?)
}

pub const CONFIG_TEMPLATE: &str = r##"# TaskHive configuration

[storage]
# Slot key holding the task list inside the store file
key = "taskhive-tasks"
# Store file, relative to this directory
file = "storage.json"
# Reject writes once the store grows past this many bytes
# quota_bytes = 5242880

[ui]
# all, active, or completed
default_filter = "all"

[log]
# trace, debug, info, warn, error, or off
level = "warn"
"##;

/// Write the commented default config. Refuses to overwrite unless `force`.
/// Returns the path written.
pub fn write_default_config(data_dir: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        return Err(ConfigError::IoError(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists (use --force)", config_path.display()),
        )));
    }
    fs::create_dir_all(data_dir)?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::DEFAULT_SLOT_KEY;
    use crate::model::filter::StatusFilter;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config.storage.key, DEFAULT_SLOT_KEY);
    }

    #[test]
    fn template_parses_to_defaults() {
        let tmp = TempDir::new().unwrap();
        write_default_config(tmp.path(), false).unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config.storage.key, DEFAULT_SLOT_KEY);
        assert_eq!(config.storage.file, "storage.json");
        assert_eq!(config.ui.default_filter, StatusFilter::All);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn write_default_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        write_default_config(tmp.path(), false).unwrap();
        assert!(write_default_config(tmp.path(), false).is_err());
        assert!(write_default_config(tmp.path(), true).is_ok());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[storage\nkey = ").unwrap();
        assert!(matches!(
            read_config(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
