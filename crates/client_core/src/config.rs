use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

use crate::controller::ControllerOptions;

pub const DEFAULT_SETTINGS_FILE: &str = "tracify.toml";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub undo_window_ms: u64,
    pub notice_ttl_ms: u64,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            undo_window_ms: 5000,
            notice_ttl_ms: 5000,
            request_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn undo_window(&self) -> Duration {
        Duration::from_millis(self.undo_window_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            undo_window: self.undo_window(),
            notice_ttl: self.notice_ttl(),
        }
    }

    pub fn with_api_base_url(mut self, raw: &str) -> Self {
        self.api_base_url = normalize_api_base_url(raw);
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    undo_window_ms: Option<u64>,
    notice_ttl_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `tracify.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    load_settings_with(path, |name| std::env::var(name).ok())
}

fn load_settings_with(path: &Path, var: impl Fn(&str) -> Option<String>) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!("ignoring malformed settings file {}: {err}", path.display()),
        }
    }

    apply_env_overrides(&mut settings, var);
    settings.api_base_url = normalize_api_base_url(&settings.api_base_url);
    settings
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.undo_window_ms {
        settings.undo_window_ms = v;
    }
    if let Some(v) = file_cfg.notice_ttl_ms {
        settings.notice_ttl_ms = v;
    }
    if file_cfg.request_timeout_secs.is_some() {
        settings.request_timeout_secs = file_cfg.request_timeout_secs;
    }
}

fn apply_env_overrides(settings: &mut ClientSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("TRACIFY_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = parse_env_u64(&var, "APP__UNDO_WINDOW_MS") {
        settings.undo_window_ms = v;
    }
    if let Some(v) = parse_env_u64(&var, "APP__NOTICE_TTL_MS") {
        settings.notice_ttl_ms = v;
    }
    if let Some(v) = parse_env_u64(&var, "APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = Some(v);
    }
}

fn parse_env_u64(var: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    let raw = var(name)?;
    match raw.trim().parse::<u64>() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("ignoring {name}={raw:?}: {err}");
            None
        }
    }
}

pub fn normalize_api_base_url(raw: &str) -> String {
    let raw = raw.trim();

    if raw.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    with_scheme.trim_end_matches('/').to_string()
}
