use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `TUBELOOP__`) on top, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TUBELOOP")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("service.legacy_audio_prefixes")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.ui.tick_ms == 0 {
            return Err("[ui] tick_ms must be at least 1 (playback is checked every tick)".to_string());
        }
        if self.controls.volume_step > 100 {
            return Err(format!(
                "[controls] volume_step is a percentage, got {}",
                self.controls.volume_step
            ));
        }
        if self.service.base_url.trim().is_empty() {
            return Err("[service] base_url must point at the resolution service".to_string());
        }
        if self.service.audio_base_url.trim().is_empty() {
            return Err("[service] audio_base_url must not be empty".to_string());
        }
        Ok(())
    }

    /// Directory holding the audio cache, the saved playlist and the log file.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(default_data_dir)
            .unwrap_or_else(|| PathBuf::from(".tubeloop"))
    }
}

/// Resolve the config path from `TUBELOOP_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TUBELOOP_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/tubeloop/config.toml`
/// or `~/.config/tubeloop/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("tubeloop").join("config.toml"))
}

/// `$XDG_DATA_HOME/tubeloop`, or `~/.local/share/tubeloop`.
pub fn default_data_dir() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
    };

    data_home.map(|d| d.join("tubeloop"))
}
