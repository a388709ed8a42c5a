//! Configuration module for the call bridge server
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `env`: Environment variable loading
//! - `yaml`: YAML configuration file loading
//!
//! # Example
//! ```rust,no_run
//! use waav_call_bridge::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use thiserror::Error;

use crate::core::realtime::RealtimeConfig;
use crate::core::realtime::openai::{OpenAIRealtimeVoice, TEMPERATURE_RANGE};

mod env;
mod yaml;

pub use yaml::{ProvidersYaml, RealtimeYaml, ServerYaml, TurnDetectionYaml, YamlConfig};

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read or parsed
    #[error("{0}")]
    Load(String),

    /// A setting has a value that cannot be parsed
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    /// The merged configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Server configuration
///
/// Contains everything needed to run the call bridge:
/// - Server settings (host, port)
/// - The OpenAI API key
/// - Realtime session settings applied to every call
///
/// A missing API key is not an error here. Every call then fails to open its
/// realtime session with a configuration error instead.
#[derive(Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    /// OpenAI API key for the Realtime API
    pub openai_api_key: Option<String>,

    /// Realtime session settings. Its `api_key` is left empty; see
    /// [`ServerConfig::realtime_config`].
    pub realtime: RealtimeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            openai_api_key: None,
            realtime: RealtimeConfig::default(),
        }
    }
}

/// Zeroize the API key when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.openai_api_key {
            key.zeroize();
        }
        self.realtime.api_key.zeroize();
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "***"),
            )
            .field("realtime", &self.realtime)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to defaults. The .env file is loaded in
    /// main.rs before this is called.
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or the resulting
    /// configuration fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        env::apply_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml_config = YamlConfig::from_file(path)?;

        let mut config = Self::default();
        env::apply_env(&mut config)?;
        config.apply_yaml(yaml_config)?;
        config.validate()?;

        Ok(config)
    }

    fn apply_yaml(&mut self, yaml: YamlConfig) -> Result<(), ConfigError> {
        if let Some(server) = yaml.server {
            if let Some(host) = server.host {
                self.host = host;
            }
            if let Some(port) = server.port {
                self.port = port;
            }
        }

        if let Some(key) = yaml.providers.and_then(|p| p.openai_api_key)
            && !key.is_empty()
        {
            self.openai_api_key = Some(key);
        }

        let Some(realtime) = yaml.realtime else {
            return Ok(());
        };
        if let Some(url) = realtime.url {
            self.realtime.url = url;
        }
        if let Some(model) = realtime.model {
            self.realtime.model = model;
        }
        if let Some(voice) = realtime.voice {
            self.realtime.voice = parse_voice(&voice)?;
        }
        if let Some(instructions) = realtime.instructions {
            self.realtime.instructions = instructions;
        }
        if let Some(temperature) = realtime.temperature {
            self.realtime.temperature = temperature;
        }
        if let Some(tokens) = realtime.max_response_output_tokens {
            self.realtime.max_response_output_tokens = tokens;
        }
        if let Some(model) = realtime.transcription_model {
            self.realtime.transcription_model = model;
        }
        if let Some(timeout) = realtime.connect_timeout_seconds {
            self.realtime.connect_timeout_seconds = timeout;
        }
        if let Some(vad) = realtime.turn_detection {
            let turn_detection = &mut self.realtime.turn_detection;
            if let Some(threshold) = vad.threshold {
                turn_detection.threshold = threshold;
            }
            if let Some(padding) = vad.prefix_padding_ms {
                turn_detection.prefix_padding_ms = padding;
            }
            if let Some(silence) = vad.silence_duration_ms {
                turn_detection.silence_duration_ms = silence;
            }
        }

        Ok(())
    }

    /// Check the merged configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if !TEMPERATURE_RANGE.contains(&self.realtime.temperature) {
            return Err(ConfigError::Validation(format!(
                "realtime temperature {} outside {}..={}",
                self.realtime.temperature,
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            )));
        }
        let threshold = self.realtime.turn_detection.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Validation(format!(
                "turn detection threshold {threshold} outside 0.0..=1.0"
            )));
        }
        if self.realtime.connect_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "realtime connect timeout must be non-zero".to_string(),
            ));
        }
        if self.realtime.url.is_empty() {
            return Err(ConfigError::Validation(
                "realtime url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if the OpenAI API key is configured
    pub fn has_openai_api_key(&self) -> bool {
        self.openai_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Realtime settings with the API key filled in, ready for a client.
    pub fn realtime_config(&self) -> RealtimeConfig {
        let mut config = self.realtime.clone();
        config.api_key = self.openai_api_key.clone().unwrap_or_default();
        config
    }
}

fn parse_voice(value: &str) -> Result<OpenAIRealtimeVoice, ConfigError> {
    OpenAIRealtimeVoice::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        name: "voice",
        reason: format!("unknown voice '{value}'"),
    })
}
