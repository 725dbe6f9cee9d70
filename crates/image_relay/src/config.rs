use std::{fs, path::Path};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "image_relay.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub allowed_hosts: Vec<String>,
    pub max_image_bytes: usize,
    pub cache_max_age_secs: u64,
    pub upstream_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8787".into(),
            allowed_hosts: vec![
                "ggpht.com".into(),
                "googleusercontent.com".into(),
                "ytimg.com".into(),
            ],
            max_image_bytes: 5 * 1024 * 1024,
            cache_max_age_secs: 86_400,
            upstream_timeout_secs: 10,
        }
    }
}

impl Settings {
    /// Exact host or any subdomain of an allowed entry.
    pub fn host_allowed(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.allowed_hosts.iter().any(|allowed| {
            host == *allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind_addr: Option<String>,
    allowed_hosts: Option<Vec<String>>,
    max_image_bytes: Option<usize>,
    cache_max_age_secs: Option<u64>,
    upstream_timeout_secs: Option<u64>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file if present, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileConfig>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(error) => warn!(path = %path.display(), %error, "ignoring unreadable relay config"),
        }
    }

    if let Some(v) = env("IMAGE_RELAY_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = env("IMAGE_RELAY_ALLOWED_HOSTS") {
        settings.allowed_hosts = split_hosts(&v);
    }

    if let Some(v) = env("IMAGE_RELAY_MAX_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_image_bytes = parsed;
        }
    }
    if let Some(v) = env("IMAGE_RELAY_CACHE_MAX_AGE_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.cache_max_age_secs = parsed;
        }
    }
    if let Some(v) = env("IMAGE_RELAY_UPSTREAM_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.upstream_timeout_secs = parsed;
        }
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileConfig) {
    if let Some(v) = file_cfg.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file_cfg.allowed_hosts {
        settings.allowed_hosts = v.iter().flat_map(|host| split_hosts(host)).collect();
    }
    if let Some(v) = file_cfg.max_image_bytes {
        settings.max_image_bytes = v;
    }
    if let Some(v) = file_cfg.cache_max_age_secs {
        settings.cache_max_age_secs = v;
    }
    if let Some(v) = file_cfg.upstream_timeout_secs {
        settings.upstream_timeout_secs = v;
    }
}

fn split_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|host| host.trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|host| !host.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
