use std::{fs, path::Path};

use client_core::{images::DEFAULT_PLACEHOLDER_BASE_URL, DEFAULT_API_BASE_URL};
use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "swipe.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub image_relay_url: Option<String>,
    pub placeholder_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            image_relay_url: None,
            placeholder_base_url: DEFAULT_PLACEHOLDER_BASE_URL.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    image_relay_url: Option<String>,
    placeholder_base_url: Option<String>,
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileConfig>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_base_url {
                    settings.api_base_url = v;
                }
                if let Some(v) = file_cfg.image_relay_url {
                    settings.image_relay_url = Some(v);
                }
                if let Some(v) = file_cfg.placeholder_base_url {
                    settings.placeholder_base_url = v;
                }
            }
            Err(error) => warn!(path = %path.display(), %error, "ignoring unreadable config"),
        }
    }

    if let Some(v) = env("YOUTUBE_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("IMAGE_RELAY_URL") {
        settings.image_relay_url = Some(v).filter(|url| !url.trim().is_empty());
    }
    if let Some(v) = env("PLACEHOLDER_BASE_URL") {
        settings.placeholder_base_url = v;
    }

    settings
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn file_then_env_override_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("swipe_config_test_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join(SETTINGS_FILE);
        fs::write(
            &path,
            "api_base_url = \"http://localhost:9000/youtube/v3\"\nimage_relay_url = \"http://localhost:8787\"\n",
        )
        .expect("write config");

        let settings = load_settings_from(&path, |key| (key == "IMAGE_RELAY_URL").then(String::new));

        assert_eq!(settings.api_base_url, "http://localhost:9000/youtube/v3");
        assert_eq!(settings.image_relay_url, None);
        assert_eq!(settings.placeholder_base_url, DEFAULT_PLACEHOLDER_BASE_URL);

        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let settings = load_settings_from(Path::new("/nonexistent/swipe.toml"), |_| None);
        assert_eq!(settings, Settings::default());
    }
}
