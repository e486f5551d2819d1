//! Gemini Live backend client.
//!
//! Implements the [`crate::core::live`] session capability on top of the
//! Gemini Live `BidiGenerateContent` WebSocket protocol.

mod client;
pub mod config;
pub mod messages;

pub use client::GeminiLive;
pub use config::{
    DEFAULT_LIVE_MODEL, DEFAULT_VOICE, GEMINI_LIVE_URL, GEMINI_RECEIVE_SAMPLE_RATE,
    GeminiLiveConfig,
};
