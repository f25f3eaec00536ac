use std::{fs, io, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_EXPORT_FILE_NAME: &str = "loan_predictions.csv";
pub const SETTINGS_FILE: &str = "loan_client.toml";
pub const API_URL_ENV: &str = "LOAN_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub export_file_name: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    export_file_name: Option<String>,
}

/// Defaults, then `loan_client.toml` in the working directory, then
/// `LOAN_API_URL`.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(SETTINGS_FILE), std::env::var(API_URL_ENV).ok())
}

pub fn load_settings_from(
    path: &Path,
    api_url_env: Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid settings file '{}'", path.display()))?;
            if let Some(v) = file_cfg.api_base_url {
                settings.api_base_url = v;
            }
            if let Some(v) = file_cfg.export_file_name.filter(|v| !v.trim().is_empty()) {
                settings.export_file_name = v;
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    settings.with_api_url_override(api_url_env)
}

impl ClientSettings {
    /// Applies a higher-priority base URL (environment or command line) and
    /// normalizes the result.
    pub fn with_api_url_override(mut self, api_url: Option<String>) -> anyhow::Result<Self> {
        if let Some(v) = api_url.filter(|v| !v.trim().is_empty()) {
            self.api_base_url = v;
        }
        self.api_base_url = normalize_base_url(&self.api_base_url)?;
        Ok(self)
    }
}

pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(DEFAULT_API_BASE_URL.to_string());
    }

    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid API base url '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
        bail!("API base url must be an absolute http(s) url, got '{trimmed}'");
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
