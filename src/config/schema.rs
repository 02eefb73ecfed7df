use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tubeloop/config.toml` or `~/.config/tubeloop/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TUBELOOP__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub service: ServiceSettings,
    pub fetch: FetchSettings,
    pub storage: StorageSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Root of the resolution service; metadata is requested from `{base_url}/load`.
    pub base_url: String,
    /// Connect timeout for both metadata and audio requests (milliseconds).
    pub connect_timeout_ms: u64,
    /// Read timeout for both metadata and audio requests (milliseconds).
    pub read_timeout_ms: u64,
    /// Where audio for a video id lives now: `{audio_base_url}/{id}`.
    pub audio_base_url: String,
    /// Audio URL prefixes from older deployments. Persisted tracks whose audio
    /// URL starts with one of these are pointed at `audio_base_url` instead.
    pub legacy_audio_prefixes: Vec<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            connect_timeout_ms: 5_000,
            read_timeout_ms: 60_000,
            audio_base_url: "http://localhost:3000/api/audio".to_string(),
            legacy_audio_prefixes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Give up on an in-flight audio fetch after this long and move on to the
    /// next queued one (milliseconds). Set to 0 to wait forever.
    pub stall_timeout_ms: u64,
    /// Keep fetched audio in the local blob cache.
    pub cache_audio: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            stall_timeout_ms: 120_000,
            cache_audio: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Override for the data directory (audio cache, playlist, log file).
    pub data_dir: Option<PathBuf>,
    /// Key under which the playlist is stored.
    pub state_key: String,
    /// Keep everything in memory; nothing survives a restart.
    pub in_memory: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            state_key: "music-player:tracks".to_string(),
            in_memory: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// How often playback positions are checked (milliseconds).
    pub tick_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ loop the good part ~ ".to_string(),
            tick_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Seconds moved by the start/end nudge keys.
    pub time_step_seconds: u32,
    /// Percentage points moved by `+` / `-`.
    pub volume_step: u8,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            time_step_seconds: 5,
            volume_step: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `env_logger` filter, e.g. `info` or `tubeloop=debug`. `RUST_LOG` wins.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
