//! Base traits and types for streaming voice-inference sessions.
//!
//! This module defines the abstraction the relay depends on: a connected
//! session is a pair of halves, a send half ([`LiveSink`]) and a receive
//! half ([`LiveEvents`]). The send half is used by the session bridge for
//! audio and turn commits, and by the inbound router for direct text turns;
//! the receive half is consumed exclusively by the turn/event state machine.
//!
//! # Audio Format
//!
//! Input audio is raw PCM 16-bit signed little-endian, mono, tagged per
//! chunk with the sample rate the client declared for it.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during live-session operations.
#[derive(Debug, Error)]
pub enum LiveError {
    /// Connection to the backend failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Session-level error reported by the backend
    #[error("Session error: {0}")]
    SessionError(String),

    /// Not connected
    #[error("Not connected")]
    NotConnected,

    /// The session was closed and can no longer accept input
    #[error("Session closed")]
    Closed,
}

/// Result type for live-session operations.
pub type LiveResult<T> = Result<T, LiveError>;

// =============================================================================
// Session Handle
// =============================================================================

/// Opaque resumption token issued by the backend.
///
/// The current handle is always the most recent one received. The relay
/// captures it and surfaces it to the client; resuming a session with it is
/// left to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle(String);

impl SessionHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Events
// =============================================================================

/// One event from the backend's output stream.
///
/// The wire protocol is a struct of optional members; the client translates
/// each frame into a sequence of these before the relay ever sees it, so the
/// state machine switches on the tag and never probes for field presence.
#[derive(Debug, Clone)]
pub enum LiveEvent {
    /// Synthesized audio payload (raw PCM bytes, already base64-decoded).
    Audio { data: Bytes },
    /// Fragment of the model's output transcript.
    OutputTranscript { text: String },
    /// Fragment of the transcription of the user's input audio.
    InputTranscript { text: String },
    /// The model's turn was interrupted by user activity.
    Interrupted,
    /// The model finished its turn.
    TurnComplete,
    /// A new resumption handle was issued.
    SessionResumption { handle: SessionHandle },
    /// The backend will terminate the session within the stated budget.
    GoingAway { time_left: Option<String> },
}

// =============================================================================
// Session Traits
// =============================================================================

/// Send half of a live session.
///
/// Methods take `&self` so the handle can be shared between the session
/// bridge (audio, commits) and the inbound router (direct text turns);
/// implementations serialize writes internally.
#[async_trait]
pub trait LiveSink: Send + Sync {
    /// Forward one chunk of raw PCM audio, tagged with its sample rate.
    async fn send_audio(&self, data: Bytes, sample_rate: u32) -> LiveResult<()>;

    /// Commit the current user turn (no more audio will follow for it).
    async fn commit_turn(&self) -> LiveResult<()>;

    /// Send a complete text turn.
    async fn send_text(&self, text: &str) -> LiveResult<()>;

    /// Close the session. Idempotent; later sends fail with [`LiveError::Closed`].
    async fn close(&self) -> LiveResult<()>;
}

/// Receive half of a live session.
///
/// `next` returns `None` when the backend stream ends, which is the relay's
/// terminal "remote stream end" condition.
#[async_trait]
pub trait LiveEvents: Send {
    async fn next(&mut self) -> Option<LiveEvent>;
}

/// A connected live session, split into its two halves.
pub struct LiveConnection {
    pub sink: Arc<dyn LiveSink>,
    pub events: Box<dyn LiveEvents>,
}
