//! Gemini Live WebSocket message types.
//!
//! This module defines the client and server frame types for the
//! `BidiGenerateContent` streaming protocol. All frames are JSON-encoded;
//! the server may deliver them in either text or binary WebSocket frames.
//!
//! Client frames (sent to server):
//! - setup - session configuration, sent once before anything else
//! - realtimeInput - PCM audio chunk, or the audio-stream-end commit marker
//! - clientContent - complete text turns
//!
//! Server frames (received from server):
//! - setupComplete - session accepted, streaming may begin
//! - serverContent - model audio/transcripts, interruption and turn flags
//! - sessionResumptionUpdate - new resumption handle issued
//! - goAway - advance warning of session termination

use serde::{Deserialize, Serialize};

// =============================================================================
// Client Frames
// =============================================================================

/// Top-level client frame. Serializes as a single-key object
/// (`{"setup": ...}`, `{"realtimeInput": ...}`, `{"clientContent": ...}`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientFrame {
    Setup(Setup),
    RealtimeInput(RealtimeInput),
    ClientContent(ClientContent),
}

/// Session setup, sent once immediately after connecting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    /// Model resource name (`models/<model>`).
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Presence enables transcription of the user's input audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_audio_transcription: Option<AudioTranscriptionConfig>,

    /// Presence enables transcription of the model's output audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_audio_transcription: Option<AudioTranscriptionConfig>,

    /// Presence asks the backend to issue resumption handles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_resumption: Option<SessionResumptionConfig>,
}

/// Generation configuration for the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_config: Option<VoiceConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Voice selection wrapper.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

/// Prebuilt voice selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

/// Empty marker object; presence in the setup frame enables the feature.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AudioTranscriptionConfig {}

/// Session resumption request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResumptionConfig {
    /// Handle from a previous session to resume, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

/// Realtime input: exactly one of `audio` or `audio_stream_end` is set.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Blob>,

    /// Marks the end of the audio stream for the current turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_stream_end: Option<bool>,
}

/// Inline binary payload, base64-encoded with a mime type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

impl Blob {
    /// Build a PCM audio blob with the rate/channel tagging the backend expects.
    pub fn pcm(data: &[u8], sample_rate: u32) -> Self {
        use base64::prelude::*;
        Self {
            mime_type: format!("audio/pcm;rate={};channels=1", sample_rate),
            data: BASE64_STANDARD.encode(data),
        }
    }
}

/// Complete content turns (used for text input).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContent {
    pub turns: Vec<Content>,
    pub turn_complete: bool,
}

impl ClientContent {
    /// A single complete user text turn.
    pub fn user_text(text: &str) -> Self {
        Self {
            turns: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(text.to_string()),
                    inline_data: None,
                }],
            }],
            turn_complete: true,
        }
    }
}

/// One content block: a role plus ordered parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A system-instruction content block.
    pub fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.to_string()),
                inline_data: None,
            }],
        }
    }
}

/// One part of a content block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
}

// =============================================================================
// Server Frames
// =============================================================================

/// Top-level server frame. The wire format is a struct of optional members
/// (a proto oneof plus flags); unknown members are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerFrame {
    pub setup_complete: Option<SetupComplete>,
    pub server_content: Option<ServerContent>,
    pub session_resumption_update: Option<SessionResumptionUpdate>,
    pub go_away: Option<GoAway>,
}

/// Setup acknowledgement; carries no fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetupComplete {}

/// Model output and turn signaling.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerContent {
    /// Model output parts (inline audio, occasionally text).
    pub model_turn: Option<Content>,
    /// The model finished its turn.
    pub turn_complete: Option<bool>,
    /// Generation was interrupted by user activity.
    pub interrupted: Option<bool>,
    /// Transcript fragment of the model's output audio.
    pub output_transcription: Option<Transcription>,
    /// Transcript fragment of the user's input audio.
    pub input_transcription: Option<Transcription>,
}

/// A transcription fragment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transcription {
    pub text: Option<String>,
    pub finished: Option<bool>,
}

/// New resumption handle notification.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionResumptionUpdate {
    pub new_handle: Option<String>,
    pub resumable: Option<bool>,
}

/// Advance warning that the backend will close the session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoAway {
    /// Remaining time budget, as a duration string (e.g. `"10s"`).
    pub time_left: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_frame_serialization() {
        let frame = ClientFrame::Setup(Setup {
            model: "models/gemini-live-2.5-flash-preview".to_string(),
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: Some(SpeechConfig {
                    voice_config: Some(VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: "Puck".to_string(),
                        },
                    }),
                    language_code: None,
                }),
            }),
            system_instruction: Some(Content::system("Be helpful.")),
            input_audio_transcription: Some(AudioTranscriptionConfig::default()),
            output_audio_transcription: Some(AudioTranscriptionConfig::default()),
            session_resumption: Some(SessionResumptionConfig::default()),
        });

        let json = serde_json::to_string(&frame).expect("Should serialize");
        assert!(json.contains(r#""setup":"#));
        assert!(json.contains(r#""model":"models/gemini-live-2.5-flash-preview""#));
        assert!(json.contains(r#""responseModalities":["AUDIO"]"#));
        assert!(json.contains(r#""voiceName":"Puck""#));
        assert!(json.contains(r#""sessionResumption":{}"#));
        // Unset language code must not appear
        assert!(!json.contains("languageCode"));
    }

    #[test]
    fn test_pcm_blob_mime_type() {
        let blob = Blob::pcm(&[0u8, 1, 2, 3], 16000);
        assert_eq!(blob.mime_type, "audio/pcm;rate=16000;channels=1");
        assert_eq!(blob.data, "AAECAw==");
    }

    #[test]
    fn test_realtime_input_audio_serialization() {
        let frame = ClientFrame::RealtimeInput(RealtimeInput {
            audio: Some(Blob::pcm(b"abcd", 16000)),
            audio_stream_end: None,
        });
        let json = serde_json::to_string(&frame).expect("Should serialize");
        assert!(json.contains(r#""realtimeInput":"#));
        assert!(json.contains(r#""mimeType":"audio/pcm;rate=16000;channels=1""#));
        assert!(!json.contains("audioStreamEnd"));
    }

    #[test]
    fn test_realtime_input_stream_end_serialization() {
        let frame = ClientFrame::RealtimeInput(RealtimeInput {
            audio: None,
            audio_stream_end: Some(true),
        });
        let json = serde_json::to_string(&frame).expect("Should serialize");
        assert!(json.contains(r#""audioStreamEnd":true"#));
        assert!(!json.contains("\"audio\":"));
    }

    #[test]
    fn test_client_content_text_turn() {
        let frame = ClientFrame::ClientContent(ClientContent::user_text("explain gravity"));
        let json = serde_json::to_string(&frame).expect("Should serialize");
        assert!(json.contains(r#""clientContent":"#));
        assert!(json.contains(r#""role":"user""#));
        assert!(json.contains(r#""text":"explain gravity""#));
        assert!(json.contains(r#""turnComplete":true"#));
    }

    #[test]
    fn test_server_frame_setup_complete() {
        let frame: ServerFrame =
            serde_json::from_str(r#"{"setupComplete": {}}"#).expect("Should deserialize");
        assert!(frame.setup_complete.is_some());
        assert!(frame.server_content.is_none());
    }

    #[test]
    fn test_server_frame_model_turn_audio() {
        let json = r#"{
            "serverContent": {
                "modelTurn": {
                    "parts": [
                        {"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": "AAEC"}}
                    ]
                }
            }
        }"#;
        let frame: ServerFrame = serde_json::from_str(json).expect("Should deserialize");
        let content = frame.server_content.expect("Should have serverContent");
        let turn = content.model_turn.expect("Should have modelTurn");
        assert_eq!(turn.parts.len(), 1);
        let blob = turn.parts[0].inline_data.as_ref().expect("inline data");
        assert_eq!(blob.data, "AAEC");
    }

    #[test]
    fn test_server_frame_turn_flags() {
        let json = r#"{"serverContent": {"turnComplete": true, "interrupted": true}}"#;
        let frame: ServerFrame = serde_json::from_str(json).expect("Should deserialize");
        let content = frame.server_content.unwrap();
        assert_eq!(content.turn_complete, Some(true));
        assert_eq!(content.interrupted, Some(true));
    }

    #[test]
    fn test_server_frame_resumption_update() {
        let json = r#"{"sessionResumptionUpdate": {"newHandle": "h-42", "resumable": true}}"#;
        let frame: ServerFrame = serde_json::from_str(json).expect("Should deserialize");
        let update = frame.session_resumption_update.unwrap();
        assert_eq!(update.new_handle.as_deref(), Some("h-42"));
        assert_eq!(update.resumable, Some(true));
    }

    #[test]
    fn test_server_frame_go_away() {
        let json = r#"{"goAway": {"timeLeft": "9.5s"}}"#;
        let frame: ServerFrame = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(frame.go_away.unwrap().time_left.as_deref(), Some("9.5s"));
    }

    #[test]
    fn test_server_frame_ignores_unknown_members() {
        let json = r#"{"usageMetadata": {"totalTokenCount": 42}}"#;
        let frame: ServerFrame = serde_json::from_str(json).expect("Should deserialize");
        assert!(frame.setup_complete.is_none());
        assert!(frame.server_content.is_none());
    }
}
