use crate::export::IntegrityConfig;
use crate::session::SessionConfig;
use crate::transcribe::{EngineConfig, ModelSize};
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub audio: AudioConfig,
    pub transcription: TranscriptionConfig,
    pub storage: StorageConfig,
    pub integrity: IntegrityConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Compute backend for the speech engine.
///
/// CUDA only takes effect when the crate is built with the `cuda` feature;
/// otherwise the selection is logged and inference runs on CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cpu,
    Cuda,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionConfig {
    /// Accuracy/latency tradeoff; resolves to models/ggml-<size>.bin
    pub model_size: ModelSize,
    /// Explicit model file, overriding the size convention
    pub model_path: Option<PathBuf>,
    pub device: Device,
    pub language: String,
    pub window_seconds: f64,
    pub overlap_seconds: f64,
    /// Bound on simultaneous engine calls across all sessions
    pub concurrency: usize,
    /// Whether a slow engine throttles its own session's ingest loop
    pub backpressure: bool,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Config {
    /// Load configuration: built-in defaults, overlaid by an optional TOML
    /// file.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("server.bind", "0.0.0.0")?
            .set_default("server.port", 3456)?
            .set_default("audio.sample_rate", 16000)?
            .set_default("audio.channels", 1)?
            .set_default("transcription.model_size", "base")?
            .set_default("transcription.device", "cpu")?
            .set_default("transcription.language", "en")?
            .set_default("transcription.window_seconds", 5.0)?
            .set_default("transcription.overlap_seconds", 1.0)?
            .set_default("transcription.concurrency", 2)?
            .set_default("transcription.backpressure", false)?
            .set_default("storage.path", "data/chunks")?
            .set_default("integrity.silence_threshold", 100)?
            .set_default("integrity.duration_tolerance_secs", 5.0)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Windowing/dispatch settings for the session registry.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            sample_rate: self.audio.sample_rate,
            window_seconds: self.transcription.window_seconds,
            overlap_seconds: self.transcription.overlap_seconds,
            backpressure: self.transcription.backpressure,
        }
    }

    /// Model settings for the speech engine.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            model_size: self.transcription.model_size,
            model_path: self.transcription.model_path.clone(),
            language: self.transcription.language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_file() {
        let cfg = Config::load(None).unwrap();
        assert_eq!(cfg.server.port, 3456);
        assert_eq!(cfg.audio.sample_rate, 16_000);
        assert_eq!(cfg.transcription.model_size, ModelSize::Base);
        assert_eq!(cfg.transcription.device, Device::Cpu);
        assert!(!cfg.transcription.backpressure);
        assert_eq!(cfg.integrity.silence_threshold, 100);
    }
}
