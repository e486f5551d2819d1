//! YAML configuration file loading.

use serde::Deserialize;
use std::path::Path;

/// Complete YAML configuration structure.
///
/// All fields are optional to allow partial configuration; anything left
/// unset falls back to the environment or to defaults.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8765
///
/// live:
///   model: "gemini-live-2.5-flash-preview"
///   voice: "Puck"
///   language: "en-US"
///   input_sample_rate: 16000
///   audio_queue_capacity: 8
///   system_instruction: "You are Scholar..."
///
/// security:
///   cors_allowed_origins: "*"
///
/// providers:
///   google_api_key: "your-api-key"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub live: Option<LiveYaml>,
    pub security: Option<SecurityYaml>,
    pub providers: Option<ProvidersYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Live session configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LiveYaml {
    pub model: Option<String>,
    pub voice: Option<String>,
    pub language: Option<String>,
    pub system_instruction: Option<String>,
    pub input_sample_rate: Option<u32>,
    pub audio_queue_capacity: Option<usize>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
}

/// Provider credentials from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    pub google_api_key: Option<String>,
}

impl YamlConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, super::ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| super::ConfigError::Io(path.display().to_string(), e.to_string()))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| super::ConfigError::Yaml(path.display().to_string(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9000

live:
  model: "gemini-live-2.5-flash-preview"
  voice: "Kore"
  language: "de-DE"
  input_sample_rate: 48000
  audio_queue_capacity: 16

security:
  cors_allowed_origins: "https://app.example.com"

providers:
  google_api_key: "yaml-key"
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).expect("Should parse");
        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(9000));

        let live = config.live.unwrap();
        assert_eq!(live.voice.as_deref(), Some("Kore"));
        assert_eq!(live.language.as_deref(), Some("de-DE"));
        assert_eq!(live.input_sample_rate, Some(48000));
        assert_eq!(live.audio_queue_capacity, Some(16));

        assert_eq!(
            config.providers.unwrap().google_api_key.as_deref(),
            Some("yaml-key")
        );
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
server:
  port: 8888
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).expect("Should parse");
        let server = config.server.unwrap();
        assert!(server.host.is_none());
        assert_eq!(server.port, Some(8888));
        assert!(config.live.is_none());
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").expect("Should parse");
        assert!(config.server.is_none());
        assert!(config.live.is_none());
        assert!(config.security.is_none());
        assert!(config.providers.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "server:\n  port: 7001").expect("write");

        let config = YamlConfig::from_file(file.path()).expect("Should load");
        assert_eq!(config.server.unwrap().port, Some(7001));
    }

    #[test]
    fn test_from_file_not_found() {
        let result = YamlConfig::from_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(super::super::ConfigError::Io(..))));
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "server: [not a map").expect("write");

        let result = YamlConfig::from_file(file.path());
        assert!(matches!(result, Err(super::super::ConfigError::Yaml(..))));
    }
}
