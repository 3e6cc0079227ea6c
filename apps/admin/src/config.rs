use std::{fs, path::Path, time::Duration};

use admin_core::AdminSession;
use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "bakery-admin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub access_token: Option<String>,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080/api".into(),
            access_token: None,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    access_token: Option<String>,
    request_timeout_seconds: Option<u64>,
}

/// Defaults, then the TOML file, then environment. CLI flags are applied by
/// the caller on top.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.access_token {
        settings.access_token = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_seconds {
        settings.request_timeout_seconds = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BAKERY_ADMIN_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("BAKERY_ADMIN_TOKEN") {
        settings.access_token = Some(v);
    }
    if let Some(v) = lookup("APP__TOKEN") {
        settings.access_token = Some(v);
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECONDS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_seconds = parsed,
            Err(err) => warn!(
                value = %v,
                error = %err,
                kept = settings.request_timeout_seconds,
                "ignoring invalid APP__REQUEST_TIMEOUT_SECONDS"
            ),
        }
    }
}

/// Validates the settings into a session for the admin relay.
pub fn build_session(settings: &Settings) -> anyhow::Result<AdminSession> {
    let api_url = settings.api_url.trim();
    let base_url =
        Url::parse(api_url).with_context(|| format!("invalid api url '{api_url}'"))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        bail!("api url must use http or https, got '{}'", base_url.scheme());
    }

    let Some(token) = settings
        .access_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        bail!("missing access token; set BAKERY_ADMIN_TOKEN or pass --token");
    };

    let mut session = AdminSession::new(base_url, token);
    if settings.request_timeout_seconds > 0 {
        session = session.with_timeout(Duration::from_secs(settings.request_timeout_seconds));
    }
    Ok(session)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
