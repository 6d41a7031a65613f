//! Speech-to-text engine seam.
//!
//! The pipeline talks to the engine through the [`SpeechEngine`] trait so the
//! real Whisper backend can be swapped for a mock in tests. The Whisper
//! implementation requires the `whisper` feature (and cmake at build time):
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::error::{PipelineError, Result};
use std::path::PathBuf;

#[cfg(feature = "whisper")]
use std::sync::Mutex;
#[cfg(feature = "whisper")]
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// One recognized span, timestamps relative to the start of the window that
/// produced it. The worker re-bases these onto the session timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSegment {
    pub text: String,
    /// Seconds from window start
    pub start: f64,
    /// Seconds from window start
    pub end: f64,
}

/// Trait for speech-to-text engines.
///
/// Implementations must tolerate empty or near-silent windows by returning an
/// empty segment list rather than an error.
pub trait SpeechEngine: Send + Sync {
    /// Transcribe a window of 16-bit PCM mono 16 kHz samples.
    fn transcribe(&self, samples: &[i16]) -> Result<Vec<EngineSegment>>;

    /// Name of the loaded model, for logging.
    fn model_name(&self) -> &str;
}

/// Model size selection; trades accuracy against latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }
}

impl std::str::FromStr for ModelSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large" => Ok(ModelSize::Large),
            other => Err(format!("unknown model size: {}", other)),
        }
    }
}

/// Configuration for the Whisper engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model size; resolves to `models/ggml-<size>.bin` unless `model_path` is set
    pub model_size: ModelSize,
    /// Explicit model file path, overriding the size convention
    pub model_path: Option<PathBuf>,
    /// Language hint (e.g., "en")
    pub language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_size: ModelSize::Base,
            model_path: None,
            language: "en".to_string(),
        }
    }
}

impl EngineConfig {
    /// The model file this configuration resolves to.
    pub fn resolved_model_path(&self) -> PathBuf {
        self.model_path.clone().unwrap_or_else(|| {
            PathBuf::from(format!("models/ggml-{}.bin", self.model_size.as_str()))
        })
    }
}

/// Whisper-backed engine.
///
/// The WhisperContext is wrapped in a Mutex; one inference runs per context at
/// a time, and the worker's semaphore bounds how many callers queue here.
#[cfg(feature = "whisper")]
pub struct WhisperEngine {
    context: Mutex<WhisperContext>,
    config: EngineConfig,
    model_name: String,
}

/// Whisper engine placeholder compiled without the `whisper` feature.
///
/// Construction fails with instructions to rebuild; the serve path reports
/// this at startup instead of at the first window.
#[cfg(not(feature = "whisper"))]
pub struct WhisperEngine;

#[cfg(feature = "whisper")]
impl WhisperEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let model_path = config.resolved_model_path();
        if !model_path.exists() {
            return Err(PipelineError::EngineUnavailable {
                message: format!("model file not found: {}", model_path.display()),
            });
        }

        let model_name = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let context = WhisperContext::new_with_params(
            model_path.to_str().ok_or_else(|| PipelineError::EngineUnavailable {
                message: "invalid UTF-8 in model path".to_string(),
            })?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| PipelineError::EngineUnavailable {
            message: format!("failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    /// Convert i16 PCM to f32 normalized to [-1.0, 1.0], as Whisper expects.
    fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples.iter().map(|&s| s as f32 / 32768.0).collect()
    }
}

#[cfg(feature = "whisper")]
impl SpeechEngine for WhisperEngine {
    fn transcribe(&self, samples: &[i16]) -> Result<Vec<EngineSegment>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let audio_f32 = Self::convert_audio(samples);

        let context = self
            .context
            .lock()
            .map_err(|e| PipelineError::EngineUnavailable {
                message: format!("failed to acquire context lock: {}", e),
            })?;

        let mut state = context
            .create_state()
            .map_err(|e| PipelineError::EngineUnavailable {
                message: format!("failed to create Whisper state: {}", e),
            })?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.config.language));
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &audio_f32)
            .map_err(|e| PipelineError::EngineUnavailable {
                message: format!("Whisper inference failed: {}", e),
            })?;

        // Alignment: whisper reports segment boundaries in centiseconds from
        // the start of the supplied audio.
        let mut segments = Vec::new();
        for segment in state.as_iter() {
            let text = segment.to_string().trim().to_string();
            if text.is_empty() {
                continue;
            }
            segments.push(EngineSegment {
                text,
                start: segment.start_timestamp() as f64 / 100.0,
                end: segment.end_timestamp() as f64 / 100.0,
            });
        }

        Ok(segments)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperEngine {
    pub fn new(_config: EngineConfig) -> Result<Self> {
        Err(PipelineError::EngineUnavailable {
            message: concat!(
                "built without speech recognition; ",
                "rebuild with `cargo build --features whisper` (requires cmake)"
            )
            .to_string(),
        })
    }
}

#[cfg(not(feature = "whisper"))]
impl SpeechEngine for WhisperEngine {
    fn transcribe(&self, _samples: &[i16]) -> Result<Vec<EngineSegment>> {
        Err(PipelineError::EngineUnavailable {
            message: "whisper feature not enabled".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "unavailable"
    }
}

/// Mock engine for tests.
///
/// Returns one segment spanning the supplied window, or a configured failure.
#[derive(Debug, Clone)]
pub struct MockEngine {
    response: String,
    should_fail: bool,
    sample_rate: u32,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            response: "mock transcription".to_string(),
            should_fail: false,
            sample_rate: 16_000,
        }
    }

    /// Configure the text returned for every window.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechEngine for MockEngine {
    fn transcribe(&self, samples: &[i16]) -> Result<Vec<EngineSegment>> {
        if self.should_fail {
            return Err(PipelineError::EngineUnavailable {
                message: "mock transcription failure".to_string(),
            });
        }
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![EngineSegment {
            text: self.response.clone(),
            start: 0.0,
            end: samples.len() as f64 / self.sample_rate as f64,
        }])
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
