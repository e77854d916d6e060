//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Engine settings, loadable from TOML.
///
/// Every field is optional in the file; missing fields take their defaults.
///
/// ```toml
/// sample_rate = 44100
/// block_size = 256
/// capture_timeout_secs = 30.0
/// modulation_interval_ms = 10.0
/// master_volume = 0.8
/// start_suspended = true
/// export_bits_per_sample = 24
/// seed = 42
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Render rate in Hz. Tracks at other rates are resampled on playback.
    pub sample_rate: u32,
    /// Frames per block for [`Engine::export_offline`](crate::Engine::export_offline).
    pub block_size: usize,
    /// Upper bound on one export, in seconds of rendered audio.
    pub capture_timeout_secs: f32,
    /// Period of modulation tasks.
    pub modulation_interval_ms: f32,
    /// Linear output gain.
    pub master_volume: f32,
    /// Whether the engine waits for [`Engine::resume`](crate::Engine::resume).
    pub start_suspended: bool,
    /// Bit depth of exported WAV files (8, 16, 24 or 32).
    pub export_bits_per_sample: u16,
    /// Seed for composite transforms. Random per session when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 512,
            capture_timeout_secs: 30.0,
            modulation_interval_ms: 10.0,
            master_volume: 1.0,
            start_suspended: true,
            export_bits_per_sample: 16,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the composite seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets whether the engine starts suspended.
    pub fn with_start_suspended(mut self, suspended: bool) -> Self {
        self.start_suspended = suspended;
        self
    }

    /// Sets the export timeout.
    pub fn with_capture_timeout(mut self, secs: f32) -> Self {
        self.capture_timeout_secs = secs;
        self
    }

    /// Checks every field for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(8000..=192_000).contains(&self.sample_rate) {
            return Err(ConfigError::invalid(
                "sample_rate",
                format!("{} Hz is outside 8000..=192000", self.sample_rate),
            ));
        }
        if self.block_size == 0 || self.block_size > 16384 {
            return Err(ConfigError::invalid(
                "block_size",
                format!("{} is outside 1..=16384", self.block_size),
            ));
        }
        if !(self.capture_timeout_secs.is_finite() && self.capture_timeout_secs > 0.0) {
            return Err(ConfigError::invalid(
                "capture_timeout_secs",
                "must be a positive number of seconds",
            ));
        }
        if !(self.modulation_interval_ms.is_finite() && self.modulation_interval_ms >= 1.0) {
            return Err(ConfigError::invalid(
                "modulation_interval_ms",
                "must be at least 1 ms",
            ));
        }
        if !(self.master_volume.is_finite() && (0.0..=4.0).contains(&self.master_volume)) {
            return Err(ConfigError::invalid(
                "master_volume",
                format!("{} is outside 0.0..=4.0", self.master_volume),
            ));
        }
        if !matches!(self.export_bits_per_sample, 8 | 16 | 24 | 32) {
            return Err(ConfigError::invalid(
                "export_bits_per_sample",
                format!("{} is not one of 8, 16, 24, 32", self.export_bits_per_sample),
            ));
        }
        Ok(())
    }

    /// Longest export, in frames.
    pub fn capture_limit_frames(&self) -> usize {
        (self.capture_timeout_secs * self.sample_rate as f32).round() as usize
    }

    /// Modulation period in seconds.
    pub fn modulation_interval_secs(&self) -> f32 {
        self.modulation_interval_ms / 1000.0
    }
}
