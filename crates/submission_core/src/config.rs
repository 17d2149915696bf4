use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::DEFAULT_MAX_ATTACHMENT_BYTES;
use tracing::warn;

pub const SETTINGS_FILE: &str = "submission.toml";
pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub submit_delay_ms: u64,
    pub max_attachment_bytes: u64,
    pub enforce_attachment_size_limit: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            submit_delay_ms: DEFAULT_SUBMIT_DELAY_MS,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            enforce_attachment_size_limit: true,
        }
    }
}

impl Settings {
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    /// The per-file limit admission applies, if any.
    pub fn attachment_limit(&self) -> Option<u64> {
        self.enforce_attachment_size_limit
            .then_some(self.max_attachment_bytes)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    submit_delay_ms: Option<u64>,
    max_attachment_bytes: Option<u64>,
    enforce_attachment_size_limit: Option<bool>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), "ignoring malformed settings file: {err}"),
        }
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.submit_delay_ms {
        settings.submit_delay_ms = v;
    }
    if let Some(v) = file_cfg.max_attachment_bytes {
        settings.max_attachment_bytes = v;
    }
    if let Some(v) = file_cfg.enforce_attachment_size_limit {
        settings.enforce_attachment_size_limit = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for name in ["SUBMIT_DELAY_MS", "APP__SUBMIT_DELAY_MS"] {
        if let Some(v) = parse_var::<u64>(&lookup, name) {
            settings.submit_delay_ms = v;
        }
    }

    if let Some(v) = parse_var::<u64>(&lookup, "APP__MAX_ATTACHMENT_BYTES") {
        settings.max_attachment_bytes = v;
    }

    if let Some(v) = parse_var::<bool>(&lookup, "APP__ENFORCE_ATTACHMENT_SIZE_LIMIT") {
        settings.enforce_attachment_size_limit = v;
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &dyn Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
