//! Gemini Live WebSocket client.
//!
//! Connects to the `BidiGenerateContent` endpoint, performs the setup
//! handshake, then runs a single socket task that multiplexes outgoing
//! commands and incoming frames. The connection is handed back split into
//! the [`LiveSink`]/[`LiveEvents`] halves the relay is built around.

use base64::prelude::*;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};

use async_trait::async_trait;

use super::config::{GEMINI_LIVE_HOST, GEMINI_LIVE_URL, GeminiLiveConfig};
use super::messages::{
    AudioTranscriptionConfig, Blob, ClientContent, ClientFrame, Content, GenerationConfig,
    PrebuiltVoiceConfig, RealtimeInput, ServerContent, ServerFrame, SessionResumptionConfig,
    Setup, SpeechConfig, VoiceConfig,
};
use crate::core::live::base::{
    LiveConnection, LiveError, LiveEvent, LiveEvents, LiveResult, LiveSink, SessionHandle,
};

/// Capacity of the outgoing command channel.
const SINK_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the translated event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Commands accepted by the socket task.
#[derive(Debug)]
enum SinkCommand {
    Audio { data: Bytes, sample_rate: u32 },
    Commit,
    Text(String),
    Close,
}

// =============================================================================
// Connection
// =============================================================================

/// Gemini Live session factory.
pub struct GeminiLive;

impl GeminiLive {
    /// Connect and complete the setup handshake.
    ///
    /// Returns once the backend has acknowledged the setup frame with
    /// `setupComplete`; audio may be streamed immediately afterwards.
    pub async fn connect(config: GeminiLiveConfig) -> LiveResult<LiveConnection> {
        if config.api_key.is_empty() {
            return Err(LiveError::AuthenticationFailed(
                "API key is required".to_string(),
            ));
        }

        let mut url = url::Url::parse(GEMINI_LIVE_URL)
            .map_err(|e| LiveError::InvalidConfiguration(e.to_string()))?;
        url.query_pairs_mut().append_pair("key", &config.api_key);

        let request = http::Request::builder()
            .uri(url.as_str())
            .header("Host", GEMINI_LIVE_HOST)
            .header("Connection", "Upgrade")
            .header("Upgrade", "websocket")
            .header("Sec-WebSocket-Version", "13")
            .header(
                "Sec-WebSocket-Key",
                tungstenite::handshake::client::generate_key(),
            )
            .body(())
            .map_err(|e| LiveError::ConnectionFailed(e.to_string()))?;

        let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| LiveError::ConnectionFailed(e.to_string()))?;

        tracing::info!(model = %config.model, "Connected to Gemini Live");

        let (mut ws_sink, mut ws_stream) = ws_stream.split();

        // Setup frame must be the first thing on the wire.
        let setup = ClientFrame::Setup(build_setup(&config));
        let json = serde_json::to_string(&setup)
            .map_err(|e| LiveError::SerializationError(e.to_string()))?;
        ws_sink
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| LiveError::WebSocketError(e.to_string()))?;

        // Wait for the setup acknowledgement before streaming anything.
        loop {
            match ws_stream.next().await {
                Some(Ok(msg)) => {
                    if let Message::Ping(data) = &msg {
                        let _ = ws_sink.send(Message::Pong(data.clone())).await;
                        continue;
                    }
                    let Some(text) = frame_text(&msg) else {
                        continue;
                    };
                    match serde_json::from_str::<ServerFrame>(text) {
                        Ok(frame) if frame.setup_complete.is_some() => break,
                        Ok(_) => {
                            tracing::warn!("Unexpected frame before setup acknowledgement");
                        }
                        Err(e) => {
                            tracing::warn!("Failed to parse frame during setup: {}", e);
                        }
                    }
                }
                Some(Err(e)) => return Err(LiveError::WebSocketError(e.to_string())),
                None => {
                    return Err(LiveError::ConnectionFailed(
                        "connection closed during setup".to_string(),
                    ));
                }
            }
        }

        tracing::debug!("Gemini Live setup complete");

        let (cmd_tx, mut cmd_rx) = mpsc::channel::<SinkCommand>(SINK_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<LiveEvent>(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            'socket: loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let frame = match cmd {
                            None | Some(SinkCommand::Close) => {
                                let _ = ws_sink.send(Message::Close(None)).await;
                                break 'socket;
                            }
                            Some(SinkCommand::Audio { data, sample_rate }) => {
                                ClientFrame::RealtimeInput(RealtimeInput {
                                    audio: Some(Blob::pcm(&data, sample_rate)),
                                    audio_stream_end: None,
                                })
                            }
                            Some(SinkCommand::Commit) => {
                                ClientFrame::RealtimeInput(RealtimeInput {
                                    audio: None,
                                    audio_stream_end: Some(true),
                                })
                            }
                            Some(SinkCommand::Text(text)) => {
                                ClientFrame::ClientContent(ClientContent::user_text(&text))
                            }
                        };

                        let json = match serde_json::to_string(&frame) {
                            Ok(j) => j,
                            Err(e) => {
                                tracing::error!("Failed to serialize client frame: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                            tracing::warn!("Failed to send to Gemini Live: {}", e);
                            break 'socket;
                        }
                    }

                    frame = ws_stream.next() => {
                        match frame {
                            Some(Ok(Message::Ping(data))) => {
                                if let Err(e) = ws_sink.send(Message::Pong(data)).await {
                                    tracing::warn!("Failed to send pong: {}", e);
                                    break 'socket;
                                }
                            }
                            Some(Ok(Message::Close(_))) => {
                                tracing::info!("Gemini Live closed the session");
                                break 'socket;
                            }
                            Some(Ok(msg)) => {
                                let Some(text) = frame_text(&msg) else { continue };
                                match serde_json::from_str::<ServerFrame>(text) {
                                    Ok(server_frame) => {
                                        for event in translate_frame(server_frame) {
                                            if event_tx.send(event).await.is_err() {
                                                break 'socket;
                                            }
                                        }
                                    }
                                    Err(e) => {
                                        tracing::warn!("Failed to parse server frame: {}", e);
                                    }
                                }
                            }
                            Some(Err(e)) => {
                                tracing::warn!("Gemini Live socket error: {}", e);
                                break 'socket;
                            }
                            None => break 'socket,
                        }
                    }
                }
            }
            tracing::debug!("Gemini Live socket task ended");
        });

        Ok(LiveConnection {
            sink: std::sync::Arc::new(GeminiSink { tx: cmd_tx }),
            events: Box::new(GeminiEvents { rx: event_rx }),
        })
    }
}

/// Build the setup frame from session configuration.
fn build_setup(config: &GeminiLiveConfig) -> Setup {
    Setup {
        model: config.model_resource(),
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["AUDIO".to_string()],
            speech_config: Some(SpeechConfig {
                voice_config: Some(VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: config.voice.clone(),
                    },
                }),
                language_code: config.language_code.clone(),
            }),
        }),
        system_instruction: config
            .system_instruction
            .as_deref()
            .map(Content::system),
        input_audio_transcription: Some(AudioTranscriptionConfig::default()),
        output_audio_transcription: Some(AudioTranscriptionConfig::default()),
        session_resumption: Some(SessionResumptionConfig {
            handle: config.resume_handle.clone(),
        }),
    }
}

/// Extract the JSON text of a frame. The backend sends JSON in both text
/// and binary WebSocket frames.
fn frame_text(msg: &Message) -> Option<&str> {
    match msg {
        Message::Text(text) => Some(text.as_str()),
        Message::Binary(data) => std::str::from_utf8(data).ok(),
        _ => None,
    }
}

/// Translate one server frame into the ordered events it carries.
///
/// A single frame can carry several semantic events; turn-complete is always
/// emitted last so it follows any audio or transcript from the same frame.
fn translate_frame(frame: ServerFrame) -> Vec<LiveEvent> {
    let mut events = Vec::new();

    if let Some(update) = frame.session_resumption_update
        && update.resumable.unwrap_or(false)
        && let Some(handle) = update.new_handle
    {
        events.push(LiveEvent::SessionResumption {
            handle: SessionHandle::new(handle),
        });
    }

    if let Some(go_away) = frame.go_away {
        events.push(LiveEvent::GoingAway {
            time_left: go_away.time_left,
        });
    }

    if let Some(content) = frame.server_content {
        let ServerContent {
            model_turn,
            turn_complete,
            interrupted,
            output_transcription,
            input_transcription,
        } = content;

        if interrupted.unwrap_or(false) {
            events.push(LiveEvent::Interrupted);
        }

        if let Some(turn) = model_turn {
            for part in turn.parts {
                if let Some(blob) = part.inline_data {
                    match BASE64_STANDARD.decode(&blob.data) {
                        Ok(bytes) => events.push(LiveEvent::Audio {
                            data: Bytes::from(bytes),
                        }),
                        Err(e) => tracing::warn!("Failed to decode model audio: {}", e),
                    }
                }
            }
        }

        if let Some(transcription) = output_transcription
            && let Some(text) = transcription.text
            && !text.is_empty()
        {
            events.push(LiveEvent::OutputTranscript { text });
        }

        if let Some(transcription) = input_transcription
            && let Some(text) = transcription.text
            && !text.is_empty()
        {
            events.push(LiveEvent::InputTranscript { text });
        }

        if turn_complete.unwrap_or(false) {
            events.push(LiveEvent::TurnComplete);
        }
    }

    events
}

// =============================================================================
// Session Halves
// =============================================================================

/// Send half: forwards commands to the socket task.
struct GeminiSink {
    tx: mpsc::Sender<SinkCommand>,
}

#[async_trait]
impl LiveSink for GeminiSink {
    async fn send_audio(&self, data: Bytes, sample_rate: u32) -> LiveResult<()> {
        self.tx
            .send(SinkCommand::Audio { data, sample_rate })
            .await
            .map_err(|_| LiveError::Closed)
    }

    async fn commit_turn(&self) -> LiveResult<()> {
        self.tx
            .send(SinkCommand::Commit)
            .await
            .map_err(|_| LiveError::Closed)
    }

    async fn send_text(&self, text: &str) -> LiveResult<()> {
        self.tx
            .send(SinkCommand::Text(text.to_string()))
            .await
            .map_err(|_| LiveError::Closed)
    }

    async fn close(&self) -> LiveResult<()> {
        // Already-closed sessions are fine; close is idempotent.
        let _ = self.tx.send(SinkCommand::Close).await;
        Ok(())
    }
}

/// Receive half: yields translated events until the socket task ends.
struct GeminiEvents {
    rx: mpsc::Receiver<LiveEvent>,
}

#[async_trait]
impl LiveEvents for GeminiEvents {
    async fn next(&mut self) -> Option<LiveEvent> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_requires_api_key() {
        let result = GeminiLive::connect(GeminiLiveConfig::default()).await;
        match result {
            Err(LiveError::AuthenticationFailed(_)) => {}
            _ => panic!("Expected AuthenticationFailed error"),
        }
    }

    #[test]
    fn test_build_setup_defaults() {
        let config = GeminiLiveConfig {
            api_key: "k".to_string(),
            system_instruction: Some("Teach.".to_string()),
            ..Default::default()
        };
        let setup = build_setup(&config);
        assert_eq!(setup.model, "models/gemini-live-2.5-flash-preview");
        assert!(setup.system_instruction.is_some());
        assert!(setup.input_audio_transcription.is_some());
        assert!(setup.output_audio_transcription.is_some());
        assert!(setup.session_resumption.is_some());
    }

    #[test]
    fn test_translate_audio_and_turn_complete_order() {
        let json = r#"{
            "serverContent": {
                "modelTurn": {"parts": [{"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": "AAEC"}}]},
                "turnComplete": true
            }
        }"#;
        let frame: ServerFrame = serde_json::from_str(json).unwrap();
        let events = translate_frame(frame);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], LiveEvent::Audio { .. }));
        assert!(matches!(events[1], LiveEvent::TurnComplete));
    }

    #[test]
    fn test_translate_interrupted() {
        let json = r#"{"serverContent": {"interrupted": true}}"#;
        let frame: ServerFrame = serde_json::from_str(json).unwrap();
        let events = translate_frame(frame);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], LiveEvent::Interrupted));
    }

    #[test]
    fn test_translate_resumption_requires_resumable() {
        let json = r#"{"sessionResumptionUpdate": {"newHandle": "h-1", "resumable": false}}"#;
        let frame: ServerFrame = serde_json::from_str(json).unwrap();
        assert!(translate_frame(frame).is_empty());

        let json = r#"{"sessionResumptionUpdate": {"newHandle": "h-1", "resumable": true}}"#;
        let frame: ServerFrame = serde_json::from_str(json).unwrap();
        let events = translate_frame(frame);
        match &events[0] {
            LiveEvent::SessionResumption { handle } => assert_eq!(handle.as_str(), "h-1"),
            other => panic!("Expected SessionResumption, got {:?}", other),
        }
    }

    #[test]
    fn test_translate_transcripts() {
        let json = r#"{
            "serverContent": {
                "outputTranscription": {"text": "hello"},
                "inputTranscription": {"text": "hi there"}
            }
        }"#;
        let frame: ServerFrame = serde_json::from_str(json).unwrap();
        let events = translate_frame(frame);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            LiveEvent::OutputTranscript { text } if text == "hello"
        ));
        assert!(matches!(
            &events[1],
            LiveEvent::InputTranscript { text } if text == "hi there"
        ));
    }

    #[test]
    fn test_translate_empty_frame() {
        let frame = ServerFrame::default();
        assert!(translate_frame(frame).is_empty());
    }

    #[test]
    fn test_frame_text_variants() {
        let text_msg = Message::Text("{}".into());
        assert_eq!(frame_text(&text_msg), Some("{}"));

        let bin_msg = Message::Binary(Bytes::from_static(b"{\"a\":1}"));
        assert_eq!(frame_text(&bin_msg), Some("{\"a\":1}"));

        let ping = Message::Ping(Bytes::new());
        assert_eq!(frame_text(&ping), None);
    }
}
