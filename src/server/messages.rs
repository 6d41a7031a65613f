//! Wire envelope for the meeting-bot audio push protocol.
//!
//! Each WebSocket text message is a JSON envelope. Only the audio-data event
//! is meaningful here; anything else is ignored by design so the platform can
//! add event types without breaking ingest.

use crate::audio::{codec, AudioFrame, FrameTimestamp};
use crate::error::{PipelineError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event name carrying mixed raw audio.
pub const AUDIO_EVENT: &str = "audio_mixed_raw.data";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireTimestamp {
    pub relative: f64,
    pub absolute: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioPayload {
    /// Base64-encoded PCM16LE mono 16 kHz
    pub buffer: String,
    pub timestamp: WireTimestamp,
}

/// Contents of `data` for an audio event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioEventData {
    pub data: AudioPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording: Option<ResourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<ResourceRef>,
}

/// One parsed inbound message.
#[derive(Debug)]
pub enum IngestMessage {
    Audio(AudioEventData),
    /// Recognized envelope, unrecognized event; not an error
    Ignored(String),
}

/// Parse a raw text message into an [`IngestMessage`].
///
/// A message that is not JSON, or an audio event with missing/invalid fields,
/// is a [`PipelineError::MalformedFrame`]; the caller drops that one message
/// and the connection survives.
pub fn parse_message(text: &str) -> Result<IngestMessage> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| PipelineError::MalformedFrame {
            reason: format!("invalid JSON: {}", e),
        })?;

    let event = value
        .get("event")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    if event != AUDIO_EVENT {
        return Ok(IngestMessage::Ignored(event));
    }

    let data = value
        .get("data")
        .cloned()
        .ok_or_else(|| PipelineError::MalformedFrame {
            reason: "audio event without data".to_string(),
        })?;

    let data: AudioEventData =
        serde_json::from_value(data).map_err(|e| PipelineError::MalformedFrame {
            reason: format!("invalid audio event data: {}", e),
        })?;

    Ok(IngestMessage::Audio(data))
}

impl AudioEventData {
    /// Decode the payload into raw PCM bytes plus the typed frame.
    ///
    /// The bytes are kept alongside the samples so the persistence copy can
    /// store exactly what arrived without re-encoding.
    pub fn decode(&self) -> Result<(AudioFrame, Vec<u8>)> {
        let bytes = codec::decode_bytes(&self.data.buffer)?;
        let samples = codec::samples_from_bytes(&bytes)?;

        let timestamp = FrameTimestamp {
            relative: self.data.timestamp.relative,
            absolute: parse_absolute(&self.data.timestamp.absolute)?,
        };

        Ok((AudioFrame { samples, timestamp }, bytes))
    }
}

/// Parse an absolute timestamp, accepting RFC 3339 or a naive ISO-8601
/// instant assumed UTC (test clients commonly send the latter).
fn parse_absolute(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| PipelineError::MalformedFrame {
            reason: format!("unparseable absolute timestamp {:?}: {}", text, e),
        })
}

/// Build an audio-event envelope; the test/simulation counterpart of
/// [`parse_message`].
pub fn audio_envelope(
    recording_id: &str,
    bot_id: &str,
    samples: &[i16],
    relative: f64,
    absolute: DateTime<Utc>,
) -> serde_json::Value {
    serde_json::json!({
        "event": AUDIO_EVENT,
        "data": {
            "data": {
                "buffer": codec::encode_samples(samples),
                "timestamp": {
                    "relative": relative,
                    "absolute": absolute.to_rfc3339(),
                }
            },
            "recording": { "id": recording_id },
            "bot": { "id": bot_id },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_audio_envelope() {
        let envelope = audio_envelope("rec-1", "bot-1", &[1, 2, 3], 0.5, Utc::now());
        let parsed = parse_message(&envelope.to_string()).unwrap();

        match parsed {
            IngestMessage::Audio(data) => {
                let (frame, bytes) = data.decode().unwrap();
                assert_eq!(frame.samples, vec![1, 2, 3]);
                assert_eq!(bytes.len(), 6);
                assert_eq!(frame.timestamp.relative, 0.5);
                assert_eq!(data.recording.unwrap().id, "rec-1");
                assert_eq!(data.bot.unwrap().id, "bot-1");
            }
            other => panic!("expected audio message, got {:?}", other),
        }
    }

    #[test]
    fn unknown_event_is_ignored() {
        let parsed = parse_message(r#"{"event":"participant.join","data":{}}"#).unwrap();
        assert!(matches!(parsed, IngestMessage::Ignored(event) if event == "participant.join"));
    }

    #[test]
    fn missing_event_is_ignored() {
        let parsed = parse_message(r#"{"data":{}}"#).unwrap();
        assert!(matches!(parsed, IngestMessage::Ignored(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            parse_message("not json"),
            Err(PipelineError::MalformedFrame { .. })
        ));
    }

    #[test]
    fn audio_event_without_timestamp_is_malformed() {
        let text = r#"{"event":"audio_mixed_raw.data","data":{"data":{"buffer":"AAAA"}}}"#;
        assert!(matches!(
            parse_message(text),
            Err(PipelineError::MalformedFrame { .. })
        ));
    }

    #[test]
    fn naive_absolute_timestamp_is_accepted() {
        let text = r#"{"event":"audio_mixed_raw.data","data":{"data":{"buffer":"AAAAAA==","timestamp":{"relative":0.0,"absolute":"2026-08-06T12:00:00.123456"}},"recording":{"id":"r"}}}"#;
        match parse_message(text).unwrap() {
            IngestMessage::Audio(data) => {
                let (frame, _) = data.decode().unwrap();
                assert_eq!(frame.samples.len(), 2);
            }
            other => panic!("expected audio message, got {:?}", other),
        }
    }
}
