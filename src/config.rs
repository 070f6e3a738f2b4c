use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::ticket_store::{DEFAULT_TABLE, DEFAULT_TIMESTAMP_COLUMN, is_identifier};

const APP_DIR_NAME: &str = "ticketboard";
const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_CONTAINER_ID: &str = "tickets";

/// Values persisted by `config init`. Every field is optional on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_anon_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Serialization(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Overlays `TICKETBOARD_*` variables found through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut Option<String>); 5] = [
            ("TICKETBOARD_SUPABASE_URL", &mut self.supabase_url),
            ("TICKETBOARD_SUPABASE_ANON_KEY", &mut self.supabase_anon_key),
            ("TICKETBOARD_TABLE", &mut self.table),
            ("TICKETBOARD_TIMESTAMP_COLUMN", &mut self.timestamp_column),
            ("TICKETBOARD_CONTAINER_ID", &mut self.container_id),
        ];
        for (key, slot) in fields {
            if let Some(value) = non_empty(lookup(key)) {
                *slot = Some(value);
            }
        }
    }

    /// Takes every non-empty value set in `other`.
    pub fn merge(&mut self, other: StoredConfig) {
        let pairs = [
            (&mut self.supabase_url, other.supabase_url),
            (&mut self.supabase_anon_key, other.supabase_anon_key),
            (&mut self.table, other.table),
            (&mut self.timestamp_column, other.timestamp_column),
            (&mut self.container_id, other.container_id),
        ];
        for (slot, value) in pairs {
            if let Some(value) = non_empty(value) {
                *slot = Some(value);
            }
        }
    }
}

/// Connection settings handed to the renderer at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub table: String,
    pub timestamp_column: String,
    pub container_id: String,
}

impl AppConfig {
    /// Stored file, then environment, then `overrides` (usually CLI flags).
    pub fn load(overrides: StoredConfig) -> AppResult<Self> {
        let mut stored = StoredConfig::load()?;
        stored.apply_env(|key| env::var(key).ok());
        stored.merge(overrides);
        Self::from_stored(stored)
    }

    pub fn from_stored(stored: StoredConfig) -> AppResult<Self> {
        let supabase_url = non_empty(stored.supabase_url).ok_or_else(|| {
            AppError::Configuration(
                "Supabase URL not configured (run `ticketboard config init` or set TICKETBOARD_SUPABASE_URL)"
                    .to_string(),
            )
        })?;
        if !supabase_url.starts_with("http://") && !supabase_url.starts_with("https://") {
            return Err(AppError::Configuration(format!(
                "Supabase URL must start with http:// or https://, got {supabase_url}"
            )));
        }
        let supabase_anon_key = non_empty(stored.supabase_anon_key).ok_or_else(|| {
            AppError::Configuration(
                "Supabase anon key not configured (run `ticketboard config init` or set TICKETBOARD_SUPABASE_ANON_KEY)"
                    .to_string(),
            )
        })?;

        let table = non_empty(stored.table).unwrap_or_else(|| DEFAULT_TABLE.to_string());
        if !is_identifier(&table) {
            return Err(AppError::Configuration(format!(
                "table name must contain only letters, digits and '_', got {table:?}"
            )));
        }
        let timestamp_column = non_empty(stored.timestamp_column)
            .unwrap_or_else(|| DEFAULT_TIMESTAMP_COLUMN.to_string());
        if !is_identifier(&timestamp_column) {
            return Err(AppError::Configuration(format!(
                "timestamp column must contain only letters, digits and '_', got {timestamp_column:?}"
            )));
        }

        Ok(Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            table,
            timestamp_column,
            container_id: non_empty(stored.container_id)
                .unwrap_or_else(|| DEFAULT_CONTAINER_ID.to_string()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("could not determine a configuration directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn stored(url: &str, key: &str) -> StoredConfig {
        StoredConfig {
            supabase_url: Some(url.to_string()),
            supabase_anon_key: Some(key.to_string()),
            ..StoredConfig::default()
        }
    }

    #[test]
    fn fills_defaults() {
        let cfg = AppConfig::from_stored(stored("https://abc.supabase.co/", "anon")).unwrap();
        assert_eq!(cfg.supabase_url, "https://abc.supabase.co");
        assert_eq!(cfg.supabase_anon_key, "anon");
        assert_eq!(cfg.table, "tickets");
        assert_eq!(cfg.timestamp_column, "inserted_at");
        assert_eq!(cfg.container_id, "tickets");
    }

    #[test]
    fn requires_url_and_key() {
        let err = AppConfig::from_stored(StoredConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Supabase URL not configured"));

        let mut missing_key = stored("https://abc.supabase.co", "");
        missing_key.supabase_anon_key = Some("   ".to_string());
        let err = AppConfig::from_stored(missing_key).unwrap_err();
        assert!(err.to_string().contains("anon key not configured"));
    }

    #[test]
    fn rejects_url_without_scheme() {
        let err = AppConfig::from_stored(stored("abc.supabase.co", "anon")).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn rejects_table_and_column_outside_identifier_charset() {
        for table in ["tickets/../users", "tickets?select=*", "tickets#x", "bug reports"] {
            let mut cfg = stored("https://abc.supabase.co", "anon");
            cfg.table = Some(table.to_string());
            let err = AppConfig::from_stored(cfg).unwrap_err();
            assert!(err.to_string().contains("table name"), "{table}");
        }

        let mut cfg = stored("https://abc.supabase.co", "anon");
        cfg.timestamp_column = Some("inserted_at.asc".to_string());
        let err = AppConfig::from_stored(cfg).unwrap_err();
        assert!(err.to_string().contains("timestamp column"));

        let mut cfg = stored("https://abc.supabase.co", "anon");
        cfg.table = Some(" bug_reports ".to_string());
        assert_eq!(AppConfig::from_stored(cfg).unwrap().table, "bug_reports");
    }

    #[test]
    fn env_overrides_stored_values() {
        let mut cfg = stored("https://file.supabase.co", "file-key");
        cfg.timestamp_column = Some("created_at".to_string());
        let env: HashMap<&str, &str> = HashMap::from([
            ("TICKETBOARD_SUPABASE_ANON_KEY", "env-key"),
            ("TICKETBOARD_TABLE", "bug_reports"),
            ("TICKETBOARD_CONTAINER_ID", "  "),
        ]);
        cfg.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.supabase_url.as_deref(), Some("https://file.supabase.co"));
        assert_eq!(cfg.supabase_anon_key.as_deref(), Some("env-key"));
        assert_eq!(cfg.table.as_deref(), Some("bug_reports"));
        assert_eq!(cfg.timestamp_column.as_deref(), Some("created_at"));
        assert_eq!(cfg.container_id, None);
    }

    #[test]
    fn flag_overrides_win_over_env() {
        let mut cfg = stored("https://file.supabase.co", "file-key");
        cfg.apply_env(|key| {
            (key == "TICKETBOARD_TABLE").then(|| "from_env".to_string())
        });
        cfg.merge(StoredConfig {
            table: Some("from_flag".to_string()),
            container_id: Some(String::new()),
            ..StoredConfig::default()
        });

        assert_eq!(cfg.table.as_deref(), Some("from_flag"));
        assert_eq!(cfg.container_id, None);
        assert_eq!(cfg.supabase_anon_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn round_trips_through_file() {
        let path = std::env::temp_dir()
            .join(format!("ticketboard-config-{}", std::process::id()))
            .join(CONFIG_FILE_NAME);
        let mut cfg = stored("https://abc.supabase.co", "anon");
        cfg.table = Some("tickets".to_string());
        cfg.save_to(&path).unwrap();

        assert_eq!(StoredConfig::load_from(&path).unwrap(), cfg);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_loads_empty_config() {
        let path = std::env::temp_dir().join("ticketboard-does-not-exist/config.json");
        assert_eq!(StoredConfig::load_from(&path).unwrap(), StoredConfig::default());
    }
}
