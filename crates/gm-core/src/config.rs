//! Configuration management for the Game Master
//!
//! Loads configuration with priority:
//! 1. `GM_*` environment variables
//! 2. config.toml (explicit path, `GM_CONFIG`, or searched upward)
//! 3. Defaults

use crate::auth::{CredentialChain, CredentialSource};
use crate::types::SamplingParams;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable Bedrock reads its API key from
pub const BEDROCK_TOKEN_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// Environment variable holding the tool host bearer token
pub const TOOL_TOKEN_ENV: &str = "GM_AUTH_TOKEN";

const DEFAULT_SYSTEM_PROMPT: &str = "You are the Game Master of a fantasy tabletop role-playing game. \
Narrate vividly but concisely. Use the available tools to roll dice, create or look up characters, \
and consult the rules and lore instead of inventing results.";

/// Game Master configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GmConfig {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Inference endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Overrides the regional Bedrock runtime endpoint
    pub endpoint: Option<String>,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,

    /// Answer with labelled canned replies instead of calling the model
    #[serde(default)]
    pub degraded_mode: bool,

    /// API key (can reference env var with ${VAR_NAME})
    pub api_key: Option<String>,

    pub api_key_file: Option<PathBuf>,
}

/// Tool collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Tool host URL; when unset the built-in tools run in-process
    pub remote_url: Option<String>,

    /// Bearer token shared with the tool host
    pub auth_token: Option<String>,

    pub auth_token_file: Option<PathBuf>,

    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_tool_host_port")]
    pub tool_host_port: u16,
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            region: default_region(),
            endpoint: None,
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_model_timeout(),
            degraded_mode: false,
            api_key: None,
            api_key_file: None,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            auth_token: None,
            auth_token_file: None,
            timeout_secs: default_tool_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tool_host_port: default_tool_host_port(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            service_name: default_service_name(),
        }
    }
}

impl ModelConfig {
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    /// Bedrock runtime base URL for the configured region
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", self.region))
    }

    /// Credential sources for the inference endpoint, in lookup order
    pub fn credentials(&self) -> CredentialChain {
        let mut chain = CredentialChain::new()
            .with(CredentialSource::Explicit(self.api_key.clone()))
            .with(CredentialSource::Env(BEDROCK_TOKEN_ENV.to_string()));
        if let Some(ref path) = self.api_key_file {
            chain = chain.with(CredentialSource::File(path.clone()));
        }
        chain
    }
}

impl ToolsConfig {
    /// Credential sources for the tool host token, in lookup order
    pub fn credentials(&self) -> CredentialChain {
        let mut chain = CredentialChain::new()
            .with(CredentialSource::Explicit(self.auth_token.clone()))
            .with(CredentialSource::Env(TOOL_TOKEN_ENV.to_string()));
        if let Some(ref path) = self.auth_token_file {
            chain = chain.with(CredentialSource::File(path.clone()));
        }
        chain
    }
}

impl GmConfig {
    /// Load configuration from `GM_CONFIG` or the nearest config.toml,
    /// falling back to defaults when neither exists.
    pub fn load() -> Result<Self> {
        let path = env::var("GM_CONFIG").ok().map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    /// Load configuration from a specific file
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::find_config_file()?,
        };

        let mut config = match config_path {
            Some(config_path) => {
                tracing::debug!("Loading configuration from: {:?}", config_path);
                let contents = fs::read_to_string(&config_path)
                    .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
                Self::from_toml(&contents)
                    .with_context(|| format!("Failed to parse config file: {:?}", config_path))?
            }
            None => {
                tracing::debug!("No config.toml found, using defaults");
                GmConfig::default()
            }
        };

        config.resolve_env_vars();
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Find config.toml by searching current directory and parents
    fn find_config_file() -> Result<Option<PathBuf>> {
        let mut current = env::current_dir()?;

        loop {
            let config_path = current.join("config.toml");
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Resolve ${VAR_NAME} references to environment variables
    fn resolve_env_vars(&mut self) {
        for slot in [
            &mut self.model.api_key,
            &mut self.model.endpoint,
            &mut self.tools.remote_url,
            &mut self.tools.auth_token,
        ] {
            if let Some(value) = slot.take() {
                *slot = Self::resolve_env_var(&value);
            }
        }
    }

    /// Resolve a single ${VAR_NAME} reference
    fn resolve_env_var(value: &str) -> Option<String> {
        if value.starts_with("${") && value.ends_with('}') {
            let var_name = &value[2..value.len() - 1];
            env::var(var_name).ok()
        } else {
            Some(value.to_string())
        }
    }

    /// Apply `GM_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GM_MODEL_ID") {
            self.model.model_id = v;
        }
        if let Some(v) = lookup("GM_REGION") {
            self.model.region = v;
        }
        if let Some(v) = lookup("GM_SYSTEM_PROMPT") {
            self.model.system_prompt = v;
        }
        if let Some(v) = lookup("GM_MAX_TOKENS") {
            self.model.max_tokens = parse_override("GM_MAX_TOKENS", &v)?;
        }
        if let Some(v) = lookup("GM_TEMPERATURE") {
            self.model.temperature = parse_override("GM_TEMPERATURE", &v)?;
        }
        if let Some(v) = lookup("GM_TOP_P") {
            self.model.top_p = parse_override("GM_TOP_P", &v)?;
        }
        if let Some(v) = lookup("GM_DEGRADED_MODE") {
            self.model.degraded_mode = parse_override("GM_DEGRADED_MODE", &v)?;
        }
        if let Some(v) = lookup("GM_REMOTE_URL") {
            self.tools.remote_url = Some(v);
        }
        if let Some(v) = lookup("GM_AUTH_TOKEN") {
            self.tools.auth_token = Some(v);
        }
        if let Some(v) = lookup("GM_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("GM_PORT") {
            self.server.port = parse_override("GM_PORT", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.model_id.trim().is_empty() {
            return Err(anyhow!("model.model_id must not be empty"));
        }
        if self.model.max_tokens == 0 {
            return Err(anyhow!("model.max_tokens must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.model.temperature) {
            return Err(anyhow!("model.temperature must be within 0.0..=1.0"));
        }
        if !(0.0..=1.0).contains(&self.model.top_p) {
            return Err(anyhow!("model.top_p must be within 0.0..=1.0"));
        }
        match self.observability.log_format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(anyhow!(
                "observability.log_format must be \"pretty\" or \"json\", got {:?}",
                other
            )),
        }
    }

    /// Create test-friendly defaults (no credentials required)
    pub fn test_defaults() -> Self {
        let mut config = GmConfig::default();
        config.model.model_id = "test-model".to_string();
        config.model.api_key = Some("test-api-key".to_string());
        config.tools.auth_token = Some("test-tool-token".to_string());
        config
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("{} has an invalid value: {:?}", key, value))
}

fn default_model_id() -> String {
    "anthropic.claude-3-haiku-20240307-v1:0".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_model_timeout() -> u64 {
    30
}

fn default_tool_timeout() -> u64 {
    15
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_tool_host_port() -> u16 {
    8081
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_service_name() -> String {
    "game-master".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GmConfig::default();
        assert_eq!(config.model.region, "us-east-1");
        assert_eq!(config.server.port, 8080);
        assert!(!config.model.degraded_mode);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.model.endpoint_url(),
            "https://bedrock-runtime.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_parse_toml_sections() {
        let config = GmConfig::from_toml(
            r#"
            [model]
            model_id = "anthropic.claude-3-sonnet"
            temperature = 0.2
            degraded_mode = true

            [tools]
            remote_url = "http://localhost:8081"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.model.model_id, "anthropic.claude-3-sonnet");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.model.top_p, 0.9);
        assert!(config.model.degraded_mode);
        assert_eq!(
            config.tools.remote_url.as_deref(),
            Some("http://localhost:8081")
        );
        assert_eq!(config.tools.timeout_secs, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_env_var() {
        unsafe {
            env::set_var("GM_CONFIG_TEST_VAR", "test_value");
        }

        let resolved = GmConfig::resolve_env_var("${GM_CONFIG_TEST_VAR}");
        assert_eq!(resolved, Some("test_value".to_string()));

        let not_var = GmConfig::resolve_env_var("plain_value");
        assert_eq!(not_var, Some("plain_value".to_string()));

        unsafe {
            env::remove_var("GM_CONFIG_TEST_VAR");
        }
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GM_MODEL_ID", "override-model"),
            ("GM_TOP_P", "0.5"),
            ("GM_DEGRADED_MODE", "true"),
            ("GM_REMOTE_URL", "http://tools.local:8081"),
            ("GM_PORT", "9000"),
        ]
        .into_iter()
        .collect();

        let mut config = GmConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.model.model_id, "override-model");
        assert_eq!(config.model.top_p, 0.5);
        assert!(config.model.degraded_mode);
        assert_eq!(
            config.tools.remote_url.as_deref(),
            Some("http://tools.local:8081")
        );
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut config = GmConfig::default();
        let err = config
            .apply_overrides(|key| (key == "GM_MAX_TOKENS").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("GM_MAX_TOKENS"));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = GmConfig::default();
        config.model.temperature = 1.5;
        assert!(config.validate().is_err());

        let mut config = GmConfig::default();
        config.observability.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sampling_from_model_config() {
        let config = GmConfig::test_defaults();
        let sampling = config.model.sampling();
        assert_eq!(sampling.max_tokens, 1024);
        assert_eq!(sampling.temperature, 0.7);
    }

    #[test]
    fn test_model_credentials_prefer_config() {
        let config = GmConfig::test_defaults();
        let resolved = config.model.credentials().resolve().unwrap();
        assert_eq!(resolved.token, "test-api-key");
    }
}
