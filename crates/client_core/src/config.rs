use std::{collections::HashMap, fs, io, path::Path, time::Duration};

use serde::Serialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub database_url: String,
    pub identity_url: Option<String>,
    #[serde(skip_serializing)]
    pub identity_api_key: Option<String>,
    pub restore_delay_ms: u64,
    pub persist_theme: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/session.db".into(),
            identity_url: None,
            identity_api_key: None,
            restore_delay_ms: 0,
            persist_theme: false,
        }
    }
}

impl Settings {
    pub fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms)
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE))
}

/// Defaults, then the flat `key = "value"` table in `path` if it exists, then
/// environment overrides.
pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    match read_config_file(path) {
        Ok(Some(raw)) => match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, &file_cfg),
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring unparsable config file"),
        },
        Ok(None) => {}
        Err(err) => warn!(path = %path.display(), error = %err, "ignoring unreadable config file"),
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    settings
}

/// A missing file is `Ok(None)`; any other I/O failure is returned.
fn read_config_file(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn apply_file(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("database_url") {
        settings.database_url = v.clone();
    }
    if let Some(v) = file_cfg.get("identity_url") {
        settings.identity_url = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("identity_api_key") {
        settings.identity_api_key = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("restore_delay_ms") {
        set_parsed(&mut settings.restore_delay_ms, "restore_delay_ms", v);
    }
    if let Some(v) = file_cfg.get("persist_theme") {
        set_parsed(&mut settings.persist_theme, "persist_theme", v);
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SESSION_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = var("IDENTITY_URL") {
        settings.identity_url = Some(v);
    }
    if let Some(v) = var("APP__IDENTITY_URL") {
        settings.identity_url = Some(v);
    }

    if let Some(v) = var("IDENTITY_API_KEY") {
        settings.identity_api_key = Some(v);
    }
    if let Some(v) = var("APP__IDENTITY_API_KEY") {
        settings.identity_api_key = Some(v);
    }

    if let Some(v) = var("APP__RESTORE_DELAY_MS") {
        set_parsed(&mut settings.restore_delay_ms, "APP__RESTORE_DELAY_MS", &v);
    }
    if let Some(v) = var("APP__PERSIST_THEME") {
        set_parsed(&mut settings.persist_theme, "APP__PERSIST_THEME", &v);
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, name: &str, raw: &str) {
    match raw.trim().parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!(setting = name, value = raw, "ignoring unparsable setting"),
    }
}

pub fn prepare_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
