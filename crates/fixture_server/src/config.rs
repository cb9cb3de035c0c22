use std::{collections::HashMap, fs, path::PathBuf};

use tracing::warn;

use crate::faults::FixtureRoute;

pub const DEFAULT_CONFIG_FILE: &str = "fixture_server.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    /// JSON fixture file; the built-in seed set is served when unset.
    pub fixture_path: Option<PathBuf>,
    /// Mount point for the data routes, e.g. `/api`. Empty mounts them at the root.
    pub route_prefix: String,
    pub latency_ms: u64,
    /// Extra delay for one persona's recommendations, to reproduce out-of-order responses.
    pub slow_persona: Option<String>,
    pub slow_persona_latency_ms: u64,
    pub fail_routes: Vec<FixtureRoute>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            fixture_path: None,
            route_prefix: String::new(),
            latency_ms: 0,
            slow_persona: None,
            slow_persona_latency_ms: 1500,
            fail_routes: Vec::new(),
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string(DEFAULT_CONFIG_FILE).ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, toml::Value>>(raw) {
            Ok(file_cfg) => {
                for (key, value) in file_cfg {
                    let value = match value {
                        toml::Value::String(s) => s,
                        toml::Value::Array(items) => items
                            .iter()
                            .filter_map(|item| item.as_str())
                            .collect::<Vec<_>>()
                            .join(","),
                        other => other.to_string(),
                    };
                    apply(&mut settings, &key, &value);
                }
            }
            Err(error) => warn!(%error, file = DEFAULT_CONFIG_FILE, "ignoring unparsable config file"),
        }
    }

    if let Some(v) = env("FIXTURE_BIND") {
        settings.bind_addr = v;
    }
    for key in [
        "bind_addr",
        "fixture_path",
        "route_prefix",
        "latency_ms",
        "slow_persona",
        "slow_persona_latency_ms",
        "fail_routes",
    ] {
        if let Some(v) = env(&format!("APP__{}", key.to_ascii_uppercase())) {
            apply(&mut settings, key, &v);
        }
    }

    settings
}

fn apply(settings: &mut Settings, key: &str, value: &str) {
    match key {
        "bind_addr" => settings.bind_addr = value.to_string(),
        "fixture_path" => {
            settings.fixture_path = (!value.trim().is_empty()).then(|| PathBuf::from(value))
        }
        "route_prefix" => settings.route_prefix = normalize_route_prefix(value),
        "latency_ms" => {
            if let Some(parsed) = parse_millis(key, value) {
                settings.latency_ms = parsed;
            }
        }
        "slow_persona" => {
            settings.slow_persona = (!value.trim().is_empty()).then(|| value.trim().to_string())
        }
        "slow_persona_latency_ms" => {
            if let Some(parsed) = parse_millis(key, value) {
                settings.slow_persona_latency_ms = parsed;
            }
        }
        "fail_routes" => {
            settings.fail_routes = value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .filter_map(|part| match part.parse::<FixtureRoute>() {
                    Ok(route) => Some(route),
                    Err(()) => {
                        warn!(route = part, "ignoring unknown fail route");
                        None
                    }
                })
                .collect();
        }
        other => warn!(key = other, "ignoring unknown setting"),
    }
}

fn parse_millis(key: &str, value: &str) -> Option<u64> {
    match value.trim().parse::<u64>() {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            warn!(key, value, %error, "ignoring non-numeric setting");
            None
        }
    }
}

/// `api`, `/api` and `/api/` all mount at `/api`; blank or `/` mounts at the root.
pub fn normalize_route_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
