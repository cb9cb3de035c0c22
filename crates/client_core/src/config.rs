use std::{fs, io, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use shared::domain::PersonaId;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

/// What the recommendation panel shows while a new fetch is loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListPolicy {
    /// Keep the previous list visible until the new response lands.
    #[default]
    Retain,
    /// Empty the list as soon as loading starts.
    Clear,
}

impl FromStr for ListPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" => Ok(ListPolicy::Retain),
            "clear" => Ok(ListPolicy::Clear),
            other => Err(format!("expected 'retain' or 'clear', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSettings {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub recommendation_limit: Option<u32>,
    pub list_policy: ListPolicy,
    pub initial_persona: PersonaId,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            request_timeout_ms: 10_000,
            recommendation_limit: None,
            list_policy: ListPolicy::Retain,
            initial_persona: PersonaId::User1,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_ms: Option<u64>,
    recommendation_limit: Option<u32>,
    list_policy: Option<ListPolicy>,
    initial_persona: Option<PersonaId>,
}

impl DashboardSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.api_base_url.trim()).map_err(|err| ConfigError::InvalidValue {
            key: "api_base_url",
            value: self.api_base_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "api_base_url",
                value: self.api_base_url.clone(),
                reason: "scheme must be http or https".into(),
            });
        }
        Ok(url)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_ms",
                value: "0".into(),
                reason: "timeout must be positive".into(),
            });
        }
        if self.recommendation_limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "recommendation_limit",
                value: "0".into(),
                reason: "limit must be positive when set".into(),
            });
        }
        Ok(())
    }
}

/// Loads settings from `dashboard.toml` in the working directory and the process
/// environment. Called once at startup.
pub fn load_settings() -> Result<DashboardSettings, ConfigError> {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<DashboardSettings, ConfigError> {
    let mut settings = DashboardSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => merge_file(&mut settings, &raw, path)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    }

    apply_env_overrides(&mut settings, env)?;
    settings.validate()?;
    Ok(settings)
}

fn merge_file(settings: &mut DashboardSettings, raw: &str, path: &Path) -> Result<(), ConfigError> {
    let file_cfg: FileSettings = toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_ms {
        settings.request_timeout_ms = v;
    }
    if file_cfg.recommendation_limit.is_some() {
        settings.recommendation_limit = file_cfg.recommendation_limit;
    }
    if let Some(v) = file_cfg.list_policy {
        settings.list_policy = v;
    }
    if let Some(v) = file_cfg.initial_persona {
        settings.initial_persona = v;
    }
    Ok(())
}

fn apply_env_overrides(
    settings: &mut DashboardSettings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(v) = env("RECOMMENDER_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout_ms = parse_value("APP__REQUEST_TIMEOUT_MS", &v)?;
    }
    if let Some(v) = env("APP__RECOMMENDATION_LIMIT") {
        settings.recommendation_limit = Some(parse_value("APP__RECOMMENDATION_LIMIT", &v)?);
    }
    if let Some(v) = env("APP__LIST_POLICY") {
        settings.list_policy = parse_value("APP__LIST_POLICY", &v)?;
    }
    if let Some(v) = env("APP__INITIAL_PERSONA") {
        settings.initial_persona = parse_value("APP__INITIAL_PERSONA", &v)?;
    }
    Ok(())
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
