//! Live relay WebSocket message types.
//!
//! This module defines the browser-facing protocol: raw binary frames carry
//! PCM audio, JSON text frames carry control messages. The schema is
//! backend-agnostic; backend event names never leak through it.

use serde::{Deserialize, Serialize};

// =============================================================================
// Incoming Messages (Client -> Server)
// =============================================================================

/// Incoming JSON control messages from the client.
///
/// Binary WebSocket frames are not represented here; they carry one audio
/// chunk each at the session's negotiated sample rate.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// One audio chunk, base64-encoded, with an optional declared rate.
    #[serde(rename = "audio")]
    Audio {
        /// Base64-encoded PCM bytes
        #[serde(default)]
        data: String,
        /// Sample rate of this chunk; updates the session's negotiated rate
        #[serde(default)]
        rate: Option<u32>,
    },

    /// Commit the current audio turn.
    #[serde(rename = "end")]
    End,

    /// A complete text turn.
    #[serde(rename = "text")]
    Text {
        /// Text content
        data: String,
    },

    /// Client requests shutdown.
    #[serde(rename = "close")]
    Close,
}

// =============================================================================
// Outgoing Messages (Server -> Client)
// =============================================================================

/// Outgoing JSON messages to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Transport accepted, not yet bound to a backend session.
    #[serde(rename = "ready")]
    Ready,

    /// Backend session established.
    #[serde(rename = "connected")]
    Connected {
        /// Model in use
        model: String,
    },

    /// Synthesized audio chunk.
    #[serde(rename = "audio")]
    Audio {
        /// Base64-encoded PCM bytes
        data: String,
    },

    /// Output transcript fragment.
    #[serde(rename = "text")]
    Text {
        /// Transcript text
        data: String,
    },

    /// The model finished its turn.
    #[serde(rename = "turn_complete")]
    TurnComplete,

    /// The client may begin a new turn. Always follows `turn_complete`.
    #[serde(rename = "ready_for_input")]
    ReadyForInput,

    /// The model's turn was interrupted.
    #[serde(rename = "interrupted")]
    Interrupted {
        /// Human-readable reason
        data: String,
    },

    /// A new resumable session handle was issued.
    #[serde(rename = "session_id")]
    SessionId {
        /// Opaque resumption handle
        data: String,
    },

    /// Error message.
    #[serde(rename = "error")]
    Error {
        /// Error code (optional)
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        /// Error message
        message: String,
    },
}

// =============================================================================
// Message Routing
// =============================================================================

/// Routing envelope for the outbound dispatcher task.
#[derive(Debug)]
pub enum OutboundRoute {
    /// JSON message to serialize onto the socket
    Message(ServerMessage),
    /// Close the connection
    Close,
}

/// One frame read from the client transport, already classified by kind.
///
/// The upgrade handler maps WebSocket messages into this; the router only
/// ever sees this type, which keeps it drivable from tests without a socket.
#[derive(Debug)]
pub enum ClientFrame {
    /// Raw binary audio at the negotiated sample rate
    Binary(bytes::Bytes),
    /// JSON control message, not yet parsed
    Text(String),
    /// Transport closed (close frame or read error)
    Close,
}
