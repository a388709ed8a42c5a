use serde::Deserialize;
use std::path::Path;

use super::ConfigError;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present here
/// override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3000
///
/// providers:
///   openai_api_key: "sk-..."
///
/// realtime:
///   url: "wss://api.openai.com/v1/realtime"
///   model: "gpt-4o-realtime-preview-2024-10-01"
///   voice: "alloy"
///   instructions: "You are a helpful assistant on a phone call."
///   temperature: 0.8
///   max_response_output_tokens: 4096
///   transcription_model: "whisper-1"
///   connect_timeout_seconds: 10
///   turn_detection:
///     threshold: 0.5
///     prefix_padding_ms: 300
///     silence_duration_ms: 200
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub providers: Option<ProvidersYaml>,
    pub realtime: Option<RealtimeYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Provider API keys from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    /// OpenAI API key for the Realtime API
    pub openai_api_key: Option<String>,
}

/// Realtime session settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RealtimeYaml {
    pub url: Option<String>,
    pub model: Option<String>,
    /// One of alloy, ash, ballad, coral, echo, sage, shimmer, verse
    pub voice: Option<String>,
    pub instructions: Option<String>,
    /// Sampling temperature (0.6 - 1.2)
    pub temperature: Option<f32>,
    pub max_response_output_tokens: Option<u32>,
    pub transcription_model: Option<String>,
    pub connect_timeout_seconds: Option<u64>,
    pub turn_detection: Option<TurnDetectionYaml>,
}

/// Server VAD settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TurnDetectionYaml {
    /// Speech probability threshold (0.0 - 1.0)
    pub threshold: Option<f32>,
    /// Audio kept before detected speech (ms)
    pub prefix_padding_ms: Option<u32>,
    /// Silence that ends a turn (ms)
    pub silence_duration_ms: Option<u32>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Load(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("Failed to parse YAML config: {e}")))?;

        Ok(config)
    }
}
