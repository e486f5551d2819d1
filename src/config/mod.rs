//! Configuration module for the Scholar Gateway.
//!
//! Handles server configuration from `.env` files, environment variables,
//! and YAML files. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Example
//! ```rust,no_run
//! use scholar_gateway::config::ServerConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from a YAML file with environment variable fallback
//! let config = ServerConfig::from_file(Path::new("config.yaml"))?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use thiserror::Error;

mod yaml;

pub use yaml::YamlConfig;

use crate::core::live::gemini::{DEFAULT_LIVE_MODEL, DEFAULT_VOICE};

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8765;

/// Default sample rate for client input audio (16-bit PCM, mono).
pub const DEFAULT_INPUT_SAMPLE_RATE: u32 = 16000;

/// Default audio ingress queue capacity.
pub const DEFAULT_AUDIO_QUEUE_CAPACITY: usize = 8;

/// System instruction used when none is configured.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are Scholar, an AI assistant integrated into smart glasses designed for learning and knowledge acquisition. Your primary purpose is education and deep understanding. You excel at teaching complex concepts by breaking them down into understandable parts, providing detailed explanations, examples, and step-by-step guidance. Whether someone asks about programming, mathematics, science, technology, history, languages, or any academic subject, you go deep into the topic to ensure thorough understanding. You're like having a brilliant professor or tutor always available through these smart glasses. Make learning engaging, interactive, and comprehensive. Always encourage curiosity and deeper exploration of topics.";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value is missing
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    /// A value failed to parse or validate
    #[error("Invalid configuration for {0}: {1}")]
    Invalid(&'static str, String),

    /// Configuration file could not be read
    #[error("Failed to read {0}: {1}")]
    Io(String, String),

    /// Configuration file could not be parsed
    #[error("Failed to parse {0}: {1}")]
    Yaml(String, String),
}

/// Server configuration.
///
/// Contains everything needed to run the gateway: bind address, backend
/// credentials and session parameters, and the relay's tuning knobs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    /// Google API key (AI Studio) for the live backend
    pub google_api_key: Option<String>,

    // Live session settings
    pub model: String,
    pub voice: String,
    /// BCP-47 language code; `None` lets the backend pick
    pub language_code: Option<String>,
    pub system_instruction: String,

    // Relay settings
    /// Default sample rate assumed for client audio until a frame declares one
    pub input_sample_rate: u32,
    /// Capacity of the per-client audio ingress queue (backpressure bound)
    pub audio_queue_capacity: usize,

    // Security settings
    /// Comma-separated allowed CORS origins, or `*`; `None` is same-origin only
    pub cors_allowed_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            google_api_key: None,
            model: DEFAULT_LIVE_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            language_code: None,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            input_sample_rate: DEFAULT_INPUT_SAMPLE_RATE,
            audio_queue_capacity: DEFAULT_AUDIO_QUEUE_CAPACITY,
            cors_allowed_origins: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (and `.env`, if the
    /// caller loaded one beforehand).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: env_string("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT")?.unwrap_or(defaults.port),
            google_api_key: env_string("GOOGLE_API_KEY"),
            model: env_string("LIVE_MODEL").unwrap_or(defaults.model),
            voice: env_string("LIVE_VOICE").unwrap_or(defaults.voice),
            language_code: env_string("LIVE_LANGUAGE"),
            system_instruction: env_string("SYSTEM_INSTRUCTION")
                .unwrap_or(defaults.system_instruction),
            input_sample_rate: env_parse("INPUT_SAMPLE_RATE")?
                .unwrap_or(defaults.input_sample_rate),
            audio_queue_capacity: env_parse("AUDIO_QUEUE_CAPACITY")?
                .unwrap_or(defaults.audio_queue_capacity),
            cors_allowed_origins: env_string("CORS_ALLOWED_ORIGINS"),
        })
    }

    /// Load configuration from a YAML file, with environment variables as
    /// fallback for anything the file leaves unset.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = YamlConfig::from_file(path)?;
        let base = Self::from_env()?;
        Ok(base.merge_yaml(yaml))
    }

    /// Apply YAML values on top of this configuration.
    fn merge_yaml(mut self, yaml: YamlConfig) -> Self {
        if let Some(server) = yaml.server {
            if let Some(host) = server.host {
                self.host = host;
            }
            if let Some(port) = server.port {
                self.port = port;
            }
        }
        if let Some(live) = yaml.live {
            if let Some(model) = live.model {
                self.model = model;
            }
            if let Some(voice) = live.voice {
                self.voice = voice;
            }
            if let Some(language) = live.language {
                self.language_code = Some(language);
            }
            if let Some(instruction) = live.system_instruction {
                self.system_instruction = instruction;
            }
            if let Some(rate) = live.input_sample_rate {
                self.input_sample_rate = rate;
            }
            if let Some(capacity) = live.audio_queue_capacity {
                self.audio_queue_capacity = capacity;
            }
        }
        if let Some(security) = yaml.security {
            if let Some(origins) = security.cors_allowed_origins {
                self.cors_allowed_origins = Some(origins);
            }
        }
        if let Some(providers) = yaml.providers {
            if let Some(key) = providers.google_api_key {
                self.google_api_key = Some(key);
            }
        }
        self
    }

    /// Socket address string (`host:port`).
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration for startup.
    ///
    /// A missing API key is fatal here rather than per-connection.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .google_api_key
            .as_deref()
            .is_none_or(|key| key.is_empty())
        {
            return Err(ConfigError::Missing("GOOGLE_API_KEY"));
        }
        if self.input_sample_rate == 0 {
            return Err(ConfigError::Invalid(
                "INPUT_SAMPLE_RATE",
                "must be greater than zero".to_string(),
            ));
        }
        if self.audio_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "AUDIO_QUEUE_CAPACITY",
                "must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid(key, e.to_string())),
    }
}
