use std::env;
use std::str::FromStr;

use super::{ConfigError, ServerConfig, parse_voice};

/// Read a variable, treating unset and empty the same.
fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                name,
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Overlay environment variables onto `config`.
pub(super) fn apply_env(config: &mut ServerConfig) -> Result<(), ConfigError> {
    if let Some(host) = env_var("HOST") {
        config.host = host;
    }
    if let Some(port) = parse_env::<u16>("PORT")? {
        config.port = port;
    }
    if let Some(key) = env_var("OPENAI_API_KEY") {
        config.openai_api_key = Some(key);
    }
    if let Some(url) = env_var("OPENAI_REALTIME_URL") {
        config.realtime.url = url;
    }
    if let Some(model) = env_var("OPENAI_REALTIME_MODEL") {
        config.realtime.model = model;
    }
    if let Some(voice) = env_var("OPENAI_REALTIME_VOICE") {
        config.realtime.voice = parse_voice(&voice)?;
    }
    if let Some(instructions) = env_var("REALTIME_INSTRUCTIONS") {
        config.realtime.instructions = instructions;
    }
    if let Some(timeout) = parse_env::<u64>("REALTIME_CONNECT_TIMEOUT_SECONDS")? {
        config.realtime.connect_timeout_seconds = timeout;
    }
    Ok(())
}
