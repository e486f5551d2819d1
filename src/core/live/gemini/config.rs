//! Gemini Live API configuration types and constants.

/// Gemini Live WebSocket endpoint (`BidiGenerateContent`, v1beta).
pub const GEMINI_LIVE_URL: &str =
    "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Host header value for the WebSocket handshake.
pub const GEMINI_LIVE_HOST: &str = "generativelanguage.googleapis.com";

/// Default live model.
pub const DEFAULT_LIVE_MODEL: &str = "gemini-live-2.5-flash-preview";

/// Default prebuilt voice for synthesized audio.
pub const DEFAULT_VOICE: &str = "Puck";

/// Sample rate of audio received from the backend (PCM 16-bit mono).
pub const GEMINI_RECEIVE_SAMPLE_RATE: u32 = 24000;

/// Configuration for one Gemini Live session.
#[derive(Debug, Clone)]
pub struct GeminiLiveConfig {
    /// API key (AI Studio).
    pub api_key: String,
    /// Model identifier, without the `models/` prefix.
    pub model: String,
    /// Prebuilt voice name for audio output.
    pub voice: String,
    /// BCP-47 language code; `None` lets the backend pick.
    pub language_code: Option<String>,
    /// System instruction sent in the setup frame.
    pub system_instruction: Option<String>,
    /// Previous resumption handle to resume from, if any.
    pub resume_handle: Option<String>,
}

impl Default for GeminiLiveConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_LIVE_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            language_code: None,
            system_instruction: None,
            resume_handle: None,
        }
    }
}

impl GeminiLiveConfig {
    /// Fully-qualified model resource name (`models/<model>`).
    pub fn model_resource(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeminiLiveConfig::default();
        assert!(config.api_key.is_empty());
        assert_eq!(config.model, DEFAULT_LIVE_MODEL);
        assert_eq!(config.voice, DEFAULT_VOICE);
        assert!(config.language_code.is_none());
    }

    #[test]
    fn test_model_resource() {
        let config = GeminiLiveConfig {
            model: "gemini-live-2.5-flash-preview".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.model_resource(),
            "models/gemini-live-2.5-flash-preview"
        );

        let config = GeminiLiveConfig {
            model: "models/custom".to_string(),
            ..Default::default()
        };
        assert_eq!(config.model_resource(), "models/custom");
    }
}
