use std::{fs, time::Duration};

use client_core::{screens::ScreenSettings, DEFAULT_BASE_URL};
use toml::{Table, Value};
use tracing::warn;

pub const CONFIG_FILE: &str = "recipe.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub database_url: String,
    pub reveal_delay_ms: u64,
    pub debounce_ms: u64,
    pub artificial_latency_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.into(),
            database_url: "sqlite://./data/recipe.db".into(),
            reveal_delay_ms: 1000,
            debounce_ms: 500,
            artificial_latency_ms: 0,
        }
    }
}

impl Settings {
    /// Overrides from a `recipe.toml` body. Unknown keys are ignored.
    pub fn apply_file(&mut self, raw: &str) {
        let table = match raw.parse::<Table>() {
            Ok(table) => table,
            Err(err) => {
                warn!("config: ignoring unparsable {CONFIG_FILE}: {err}");
                return;
            }
        };

        if let Some(v) = table.get("api_base_url").and_then(Value::as_str) {
            self.api_base_url = v.to_string();
        }
        if let Some(v) = table.get("database_url").and_then(Value::as_str) {
            self.database_url = v.to_string();
        }
        if let Some(v) = millis(table.get("reveal_delay_ms")) {
            self.reveal_delay_ms = v;
        }
        if let Some(v) = millis(table.get("debounce_ms")) {
            self.debounce_ms = v;
        }
        if let Some(v) = millis(table.get("artificial_latency_ms")) {
            self.artificial_latency_ms = v;
        }
    }

    /// Overrides from the environment; `APP__*` names win over the legacy ones.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("RECIPE_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = var("APP__API_BASE_URL") {
            self.api_base_url = v;
        }

        if let Some(v) = var("DATABASE_URL") {
            self.database_url = v;
        }
        if let Some(v) = var("APP__DATABASE_URL") {
            self.database_url = v;
        }

        if let Some(v) = var("APP__REVEAL_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.reveal_delay_ms = v;
        }
        if let Some(v) = var("APP__DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            self.debounce_ms = v;
        }
        if let Some(v) = var("APP__ARTIFICIAL_LATENCY_MS").and_then(|v| v.parse().ok()) {
            self.artificial_latency_ms = v;
        }
    }

    pub fn screen_settings(&self) -> ScreenSettings {
        ScreenSettings {
            reveal_delay: Duration::from_millis(self.reveal_delay_ms),
            debounce: Duration::from_millis(self.debounce_ms),
            ..ScreenSettings::default()
        }
    }

    pub fn artificial_latency(&self) -> Duration {
        Duration::from_millis(self.artificial_latency_ms)
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(CONFIG_FILE) {
        settings.apply_file(&raw);
    }
    settings.apply_env(|name| std::env::var(name).ok());
    settings.database_url = normalize_database_url(&settings.database_url);

    settings
}

fn millis(value: Option<&Value>) -> Option<u64> {
    value
        .and_then(Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
