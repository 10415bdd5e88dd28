use serde::{Deserialize, Serialize};

use crate::model::filter::StatusFilter;

/// Slot key used when the config does not name one
pub const DEFAULT_SLOT_KEY: &str = "taskhive-tasks";

/// Configuration from taskhive.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key of the slot holding the task list
    #[serde(default = "default_key")]
    pub key: String,
    /// Store file name, relative to the data directory
    #[serde(default = "default_file")]
    pub file: String,
    /// Maximum total size of stored values in bytes (None = unlimited)
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            key: default_key(),
            file: default_file(),
            quota_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Filter applied by `list` and `shell` when none is given
    #[serde(default)]
    pub default_filter: StatusFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// trace, debug, info, warn, error, or off
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_level(),
        }
    }
}

fn default_key() -> String {
    DEFAULT_SLOT_KEY.to_string()
}

fn default_file() -> String {
    "storage.json".to_string()
}

fn default_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.storage.key, DEFAULT_SLOT_KEY);
        assert_eq!(config.storage.file, "storage.json");
        assert!(config.storage.quota_bytes.is_none());
        assert_eq!(config.ui.default_filter, StatusFilter::All);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn partial_tables_fill_in_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[storage]
quota_bytes = 4096

[ui]
default_filter = "active"
"#,
        )
        .unwrap();
        assert_eq!(config.storage.key, DEFAULT_SLOT_KEY);
        assert_eq!(config.storage.quota_bytes, Some(4096));
        assert_eq!(config.ui.default_filter, StatusFilter::Active);
    }
}
