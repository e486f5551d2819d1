//! Streaming voice-inference session abstractions.
//!
//! The relay never talks to a backend directly; it depends on the
//! [`LiveSink`]/[`LiveEvents`] pair defined in `base`, and the supervisor
//! picks a concrete implementation at connect time. One backend ships
//! in-tree:
//!
//! - **Gemini Live** (`BidiGenerateContent`) - full duplex audio with
//!   turn signaling, interruption, transcription, and session resumption.

mod base;
pub mod gemini;

pub use base::{
    LiveConnection, LiveError, LiveEvent, LiveEvents, LiveResult, LiveSink, SessionHandle,
};
pub use gemini::{GeminiLive, GeminiLiveConfig};
