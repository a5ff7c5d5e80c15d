//! Substrate configuration.
//!
//! Queue sizes, drain caps, subscriber channel sizes and animation defaults
//! loaded from an INI configuration file. Provides defaults for safe startup
//! and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [queue]
//! capacity = 64
//! max_per_frame = 32
//!
//! [events]
//! channel_capacity = 128
//!
//! [animation]
//! hover_duration_ms = 150
//! easing = quad_out
//!
//! [monitor]
//! drive_poll_ms = 2000
//!
//! [frame]
//! target_fps = 60
//! ```

use crate::components::tween::Easing;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

/// Default safe values for startup
const DEFAULT_QUEUE_CAPACITY: usize = 64;
const DEFAULT_MAX_PER_FRAME: usize = 32;
const DEFAULT_CHANNEL_CAPACITY: usize = 128;
const DEFAULT_HOVER_DURATION_MS: u64 = 150;
const DEFAULT_DRIVE_POLL_MS: u64 = 2000;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_CONFIG_PATH: &str = "./syncframe.ini";

/// Substrate configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Bounded capacity of each entity's command queue.
    pub queue_capacity: usize,
    /// Maximum commands applied per entity per frame.
    pub max_per_frame: usize,
    /// Bounded capacity of each filtered subscription channel.
    pub channel_capacity: usize,
    /// Duration of hover colour fades.
    pub hover_duration: Duration,
    /// Easing used for hover colour fades.
    pub hover_easing: Easing,
    /// Period of the drive monitor.
    pub drive_poll: Duration,
    /// Target frames per second of the frame loop.
    pub target_fps: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_per_frame: DEFAULT_MAX_PER_FRAME,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            hover_duration: Duration::from_millis(DEFAULT_HOVER_DURATION_MS),
            hover_easing: Easing::default(),
            drive_poll: Duration::from_millis(DEFAULT_DRIVE_POLL_MS),
            target_fps: DEFAULT_TARGET_FPS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. Zero sizes are
    /// ignored since every queue and cap must hold at least one item.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [queue] section
        if let Some(v) = positive(config, "queue", "capacity") {
            self.queue_capacity = v as usize;
        }
        if let Some(v) = positive(config, "queue", "max_per_frame") {
            self.max_per_frame = v as usize;
        }

        // [events] section
        if let Some(v) = positive(config, "events", "channel_capacity") {
            self.channel_capacity = v as usize;
        }

        // [animation] section
        if let Some(ms) = config.getuint("animation", "hover_duration_ms").ok().flatten() {
            self.hover_duration = Duration::from_millis(ms);
        }
        if let Some(name) = config.get("animation", "easing") {
            match Easing::from_name(&name) {
                Some(easing) => self.hover_easing = easing,
                None => warn!("Unknown easing '{}' in config, keeping {}", name, self.hover_easing.name()),
            }
        }

        // [monitor] section
        if let Some(ms) = positive(config, "monitor", "drive_poll_ms") {
            self.drive_poll = Duration::from_millis(ms);
        }

        // [frame] section
        if let Some(fps) = positive(config, "frame", "target_fps") {
            self.target_fps = fps as u32;
        }

        info!(
            "Loaded config: queue={} (max {}/frame), channel={}, hover={}ms {}, drive_poll={}ms, fps={}",
            self.queue_capacity,
            self.max_per_frame,
            self.channel_capacity,
            self.hover_duration.as_millis(),
            self.hover_easing.name(),
            self.drive_poll.as_millis(),
            self.target_fps
        );
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("queue", "capacity", Some(self.queue_capacity.to_string()));
        config.set("queue", "max_per_frame", Some(self.max_per_frame.to_string()));
        config.set(
            "events",
            "channel_capacity",
            Some(self.channel_capacity.to_string()),
        );
        config.set(
            "animation",
            "hover_duration_ms",
            Some(self.hover_duration.as_millis().to_string()),
        );
        config.set(
            "animation",
            "easing",
            Some(self.hover_easing.name().to_string()),
        );
        config.set(
            "monitor",
            "drive_poll_ms",
            Some(self.drive_poll.as_millis().to_string()),
        );
        config.set("frame", "target_fps", Some(self.target_fps.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Frame period derived from `target_fps`.
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }
}

fn positive(config: &Ini, section: &str, key: &str) -> Option<u64> {
    config
        .getuint(section, key)
        .ok()
        .flatten()
        .filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SyncConfig::new();
        assert_eq!(cfg.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(cfg.max_per_frame, DEFAULT_MAX_PER_FRAME);
        assert_eq!(cfg.hover_duration, Duration::from_millis(150));
        assert!(matches!(cfg.hover_easing, Easing::QuadOut));
    }

    #[test]
    fn test_load_from_str_overrides() {
        let mut cfg = SyncConfig::new();
        cfg.load_from_str(
            "[queue]\ncapacity = 8\nmax_per_frame = 4\n[animation]\nhover_duration_ms = 200\neasing = linear\n",
        )
        .unwrap();
        assert_eq!(cfg.queue_capacity, 8);
        assert_eq!(cfg.max_per_frame, 4);
        assert_eq!(cfg.hover_duration, Duration::from_millis(200));
        assert!(matches!(cfg.hover_easing, Easing::Linear));
        // untouched
        assert_eq!(cfg.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_zero_sizes_are_ignored() {
        let mut cfg = SyncConfig::new();
        cfg.load_from_str("[queue]\ncapacity = 0\n").unwrap();
        assert_eq!(cfg.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_unknown_easing_keeps_default() {
        let mut cfg = SyncConfig::new();
        cfg.load_from_str("[animation]\neasing = wobble\n").unwrap();
        assert!(matches!(cfg.hover_easing, Easing::QuadOut));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut cfg = SyncConfig::with_path("/nonexistent/dir/syncframe.ini");
        assert!(cfg.load_from_file().is_err());
        assert_eq!(cfg.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("syncframe-test-{}.ini", std::process::id()));
        let mut cfg = SyncConfig::with_path(&path);
        cfg.queue_capacity = 5;
        cfg.hover_easing = Easing::CubicOut;
        cfg.save_to_file().unwrap();

        let mut loaded = SyncConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded.queue_capacity, 5);
        assert!(matches!(loaded.hover_easing, Easing::CubicOut));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_frame_period() {
        let mut cfg = SyncConfig::new();
        cfg.target_fps = 50;
        assert_eq!(cfg.frame_period(), Duration::from_millis(20));
    }
}
