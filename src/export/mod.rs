//! Offline export of stored audio and its integrity report.
//!
//! Chunks arrive over an unreliable real-time channel, so dropped frames and
//! silent gaps are expected failure modes in the field. The integrity report
//! lets an operator detect them after the fact without inspecting waveform
//! data: it compares the duration implied by the sample count against the
//! span of the chunk timestamps, and flags recordings that never rose above
//! the silence threshold.

use crate::audio::{codec, FrameTimestamp};
use crate::error::{PipelineError, Result};
use crate::store::ChunkStore;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Thresholds for the integrity analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityConfig {
    /// Max absolute amplitude at or below which a recording is flagged silent
    pub silence_threshold: i32,

    /// Allowed difference between measured and expected duration, in seconds
    pub duration_tolerance_secs: f64,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            silence_threshold: 100,
            duration_tolerance_secs: 5.0,
        }
    }
}

/// The reconstructed recording: every stored chunk for one bot id,
/// concatenated in storage order.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub bot_id: String,
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    pub chunk_count: usize,
    pub first_timestamp: FrameTimestamp,
    pub last_timestamp: FrameTimestamp,
}

impl AudioArtifact {
    /// Duration implied by the sample count.
    pub fn measured_duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Duration implied by the span between the first and last chunk
    /// timestamps.
    pub fn expected_duration_secs(&self) -> f64 {
        self.last_timestamp.relative - self.first_timestamp.relative
    }

    /// Write the artifact as a standard PCM WAV file.
    pub fn write_wav(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {}", path.display()))?;

        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .context("failed to write sample to WAV")?;
        }

        writer.finalize().context("failed to finalize WAV file")?;

        info!(
            "exported {} ({:.1}s, {} Hz, {} channel) to {}",
            self.bot_id,
            self.measured_duration_secs(),
            self.sample_rate,
            self.channels,
            path.display()
        );

        Ok(())
    }
}

/// Diagnostic summary of an artifact. Never mutates or rejects the audio;
/// it reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub bot_id: String,
    pub chunk_count: usize,
    pub max_amplitude: i32,
    pub mean_amplitude: f64,
    pub measured_duration_secs: f64,
    pub expected_duration_secs: f64,
    pub silent: bool,
    pub duration_mismatch: bool,
}

pub struct Exporter {
    store: Arc<dyn ChunkStore>,
    integrity: IntegrityConfig,
}

impl Exporter {
    pub fn new(store: Arc<dyn ChunkStore>, integrity: IntegrityConfig) -> Self {
        Self { store, integrity }
    }

    /// Reconstruct the full recording for `bot_id`.
    ///
    /// Chunks are concatenated in the order the store returns them; storage
    /// order is authoritative, there is nothing else to sort by. A read
    /// failure aborts the export: a partial artifact would silently
    /// misrepresent the recording. A bot id with no stored chunks is its own
    /// error, distinct from a recording that exists but is silent.
    pub async fn export(&self, bot_id: &str) -> Result<AudioArtifact> {
        let chunks = self.store.fetch_ordered(bot_id).await?;

        let (first, last) = match (chunks.first(), chunks.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => {
                return Err(PipelineError::UnknownBot {
                    bot_id: bot_id.to_string(),
                })
            }
        };

        let mut samples = Vec::new();
        for chunk in &chunks {
            let decoded = codec::samples_from_bytes(&chunk.buffer).map_err(|e| {
                PipelineError::PersistenceRead {
                    bot_id: bot_id.to_string(),
                    message: format!("corrupt stored chunk: {}", e),
                }
            })?;
            samples.extend_from_slice(&decoded);
        }

        info!(
            bot_id = %bot_id,
            chunks = chunks.len(),
            samples = samples.len(),
            "reconstructed recording"
        );

        Ok(AudioArtifact {
            bot_id: bot_id.to_string(),
            samples,
            sample_rate: 16_000,
            channels: 1,
            chunk_count: chunks.len(),
            first_timestamp: first,
            last_timestamp: last,
        })
    }

    /// Compute the integrity report for an artifact.
    pub fn analyze(&self, artifact: &AudioArtifact) -> IntegrityReport {
        let mut max_amplitude: i32 = 0;
        let mut amplitude_sum: u64 = 0;
        for &sample in &artifact.samples {
            let amplitude = (sample as i32).abs();
            max_amplitude = max_amplitude.max(amplitude);
            amplitude_sum += amplitude as u64;
        }

        let mean_amplitude = if artifact.samples.is_empty() {
            0.0
        } else {
            amplitude_sum as f64 / artifact.samples.len() as f64
        };

        let measured = artifact.measured_duration_secs();
        let expected = artifact.expected_duration_secs();

        IntegrityReport {
            bot_id: artifact.bot_id.clone(),
            chunk_count: artifact.chunk_count,
            max_amplitude,
            mean_amplitude,
            measured_duration_secs: measured,
            expected_duration_secs: expected,
            silent: max_amplitude < self.integrity.silence_threshold,
            duration_mismatch: (measured - expected).abs() > self.integrity.duration_tolerance_secs,
        }
    }
}
