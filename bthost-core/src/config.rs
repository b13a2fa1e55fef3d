//! Embedded defaults merged with an optional user override file.

use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    service: ServiceConfig,
    #[serde(default)]
    audio: AudioConfig,
    #[serde(default)]
    offload: OffloadConfig,
    #[serde(default)]
    timers: TimerConfig,
}

#[derive(Deserialize, Default)]
struct ServiceConfig {
    name: Option<String>,
    ipc_socket_path: Option<String>,
}

#[derive(Deserialize, Default)]
struct AudioConfig {
    transport_dir: Option<String>,
    sink_queue_start_threshold: Option<usize>,
    sink_queue_max: Option<usize>,
}

#[derive(Deserialize, Default)]
struct OffloadConfig {
    enabled: Option<bool>,
    a2dp: Option<bool>,
    hfp: Option<bool>,
    lea: Option<bool>,
}

#[derive(Deserialize, Default)]
struct TimerConfig {
    connect_timeout_ms: Option<u64>,
    start_timeout_ms: Option<u64>,
    offload_timeout_ms: Option<u64>,
    retry_backoff_ms: Option<u64>,
}

pub struct Config {
    service: ServiceConfig,
    audio: AudioConfig,
    offload: OffloadConfig,
    timers: TimerConfig,
}

impl Config {
    pub fn load() -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_service(&mut base.service, user.service);
                            merge_audio(&mut base.audio, user.audio);
                            merge_offload(&mut base.offload, user.offload);
                            merge_timers(&mut base.timers, user.timers);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            service: base.service,
            audio: base.audio,
            offload: base.offload,
            timers: base.timers,
        }
    }

    /// Build a `Config` straight from a TOML string, bypassing the
    /// filesystem lookup. Used by tests and by callers embedding the
    /// service with a config they've already resolved.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(s)?;
        Ok(Config {
            service: file.service,
            audio: file.audio,
            offload: file.offload,
            timers: file.timers,
        })
    }

    pub fn service_name(&self) -> &str {
        self.service.name.as_deref().unwrap_or("bthost")
    }

    pub fn ipc_socket_path(&self) -> &str {
        self.service
            .ipc_socket_path
            .as_deref()
            .unwrap_or("/run/bthost/ipc.sock")
    }

    pub fn audio_transport_dir(&self) -> &str {
        self.audio.transport_dir.as_deref().unwrap_or("/run/bthost/audio")
    }

    pub fn sink_queue_start_threshold(&self) -> usize {
        self.audio.sink_queue_start_threshold.unwrap_or(5)
    }

    pub fn sink_queue_max(&self) -> usize {
        self.audio.sink_queue_max.unwrap_or(14)
    }

    pub fn offload_enabled(&self) -> bool {
        self.offload.enabled.unwrap_or(true)
    }

    pub fn offload_a2dp_enabled(&self) -> bool {
        self.offload_enabled() && self.offload.a2dp.unwrap_or(true)
    }

    pub fn offload_hfp_enabled(&self) -> bool {
        self.offload_enabled() && self.offload.hfp.unwrap_or(true)
    }

    pub fn offload_lea_enabled(&self) -> bool {
        self.offload_enabled() && self.offload.lea.unwrap_or(true)
    }

    pub fn connect_timeout_ms(&self) -> u64 {
        self.timers.connect_timeout_ms.unwrap_or(10_000)
    }

    pub fn start_timeout_ms(&self) -> u64 {
        self.timers.start_timeout_ms.unwrap_or(4_000)
    }

    pub fn offload_timeout_ms(&self) -> u64 {
        self.timers.offload_timeout_ms.unwrap_or(2_000)
    }

    pub fn retry_backoff_ms(&self) -> u64 {
        self.timers.retry_backoff_ms.unwrap_or(1_000)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bthost").join("config.toml"))
}

fn merge_service(base: &mut ServiceConfig, user: ServiceConfig) {
    if user.name.is_some() {
        base.name = user.name;
    }
    if user.ipc_socket_path.is_some() {
        base.ipc_socket_path = user.ipc_socket_path;
    }
}

fn merge_audio(base: &mut AudioConfig, user: AudioConfig) {
    if user.transport_dir.is_some() {
        base.transport_dir = user.transport_dir;
    }
    if user.sink_queue_start_threshold.is_some() {
        base.sink_queue_start_threshold = user.sink_queue_start_threshold;
    }
    if user.sink_queue_max.is_some() {
        base.sink_queue_max = user.sink_queue_max;
    }
}

fn merge_offload(base: &mut OffloadConfig, user: OffloadConfig) {
    if user.enabled.is_some() {
        base.enabled = user.enabled;
    }
    if user.a2dp.is_some() {
        base.a2dp = user.a2dp;
    }
    if user.hfp.is_some() {
        base.hfp = user.hfp;
    }
    if user.lea.is_some() {
        base.lea = user.lea;
    }
}

fn merge_timers(base: &mut TimerConfig, user: TimerConfig) {
    if user.connect_timeout_ms.is_some() {
        base.connect_timeout_ms = user.connect_timeout_ms;
    }
    if user.start_timeout_ms.is_some() {
        base.start_timeout_ms = user.start_timeout_ms;
    }
    if user.offload_timeout_ms.is_some() {
        base.offload_timeout_ms = user.offload_timeout_ms;
    }
    if user.retry_backoff_ms.is_some() {
        base.retry_backoff_ms = user.retry_backoff_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_parses_and_has_expected_defaults() {
        let config = Config::load();
        assert_eq!(config.service_name(), "bthost");
        assert_eq!(config.ipc_socket_path(), "/run/bthost/ipc.sock");
        assert_eq!(config.sink_queue_start_threshold(), 5);
        assert!(config.offload_a2dp_enabled());
    }

    #[test]
    fn user_override_replaces_only_set_fields() {
        let config = Config::from_toml_str(
            r#"
            [service]
            name = "custom"
            "#,
        )
        .unwrap();
        assert_eq!(config.service_name(), "custom");
        assert_eq!(config.connect_timeout_ms(), 10_000);
    }
}
