use std::{
    env, fs,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "automaton.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub remote_bind_host: IpAddr,
    /// Opens the remote control endpoint at startup when set.
    pub remote_port: Option<u16>,
    pub redraw_hz: u32,
    pub log_filter: String,
    /// Replaces native dialogs with scripted answers.
    pub headless: bool,
    /// The file headless dialogs pick for open and save.
    pub document: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote_bind_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            remote_port: None,
            redraw_hz: 60,
            log_filter: "info".into(),
            headless: false,
            document: None,
        }
    }
}

impl Settings {
    pub fn redraw_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.redraw_hz.max(1)))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    remote_bind_host: Option<IpAddr>,
    remote_port: Option<u16>,
    redraw_hz: Option<u32>,
    log_filter: Option<String>,
    headless: Option<bool>,
    document: Option<PathBuf>,
}

pub fn load_settings(path: &Path) -> Settings {
    load_settings_with(path, |key| env::var(key).ok())
}

/// Defaults, then the TOML file at `path` if it exists, then environment
/// variables looked up through `lookup`.
pub fn load_settings_with(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), %err, "ignoring unreadable config file"),
        }
    }

    if let Some(v) = var(&lookup, "REMOTE_BIND_HOST").and_then(|v| v.parse().ok()) {
        settings.remote_bind_host = v;
    }
    if let Some(v) = var(&lookup, "REMOTE_PORT").and_then(|v| v.parse().ok()) {
        settings.remote_port = Some(v);
    }
    if let Some(v) = var(&lookup, "REDRAW_HZ").and_then(|v| v.parse().ok()) {
        settings.redraw_hz = v;
    }
    if let Some(v) = var(&lookup, "LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = var(&lookup, "HEADLESS").and_then(|v| parse_flag(&v)) {
        settings.headless = v;
    }
    if let Some(v) = var(&lookup, "DOCUMENT") {
        settings.document = Some(PathBuf::from(v));
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.remote_bind_host {
        settings.remote_bind_host = v;
    }
    if let Some(v) = file_cfg.remote_port {
        settings.remote_port = Some(v);
    }
    if let Some(v) = file_cfg.redraw_hz {
        settings.redraw_hz = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.headless {
        settings.headless = v;
    }
    if let Some(v) = file_cfg.document {
        settings.document = Some(v);
    }
}

/// `APP__<KEY>` wins over `AUTOMATON_<KEY>`.
fn var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(&format!("APP__{key}")).or_else(|| lookup(&format!("AUTOMATON_{key}")))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
