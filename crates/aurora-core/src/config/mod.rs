//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Environment variables checked for the API key, in order
pub const API_KEY_ENV_VARS: [&str; 3] = ["AURORA_API_KEY", "GEMINI_API_KEY", "API_KEY"];

/// Substituted when no API key is configured
pub const PLACEHOLDER_API_KEY: &str = "PLACEHOLDER_API_KEY";

/// Hosted generation API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Aurora configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub image: ImageConfig,
    pub vision: VisionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<i32>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub model: String,
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub model: String,
    pub default_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: "gemini-2.5-flash".to_string(),
            temperature: None,
            thinking_budget: None,
            timeout_secs: 120,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-image".to_string(),
            aspect_ratio: "1:1".to_string(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            default_prompt: "Describe this image in detail.".to_string(),
        }
    }
}

impl LlmConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(API_KEY_ENV_VARS
            .iter()
            .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty())))
    }

    /// Resolve the API key, substituting a placeholder when none is set.
    ///
    /// Requests are never blocked client-side; the service rejects the
    /// placeholder with an authentication error.
    pub fn api_key_or_placeholder(&self) -> anyhow::Result<String> {
        match self.resolved_api_key()? {
            Some(key) => Ok(key),
            None => {
                warn!(
                    vars = %API_KEY_ENV_VARS.join(", "),
                    "API key not set, requests will use a placeholder key"
                );
                Ok(PLACEHOLDER_API_KEY.to_string())
            }
        }
    }

    pub fn redacted_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolved_api_key().map(|opt| opt.map(|key| redact(&key)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }
}

fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        "***".to_string()
    } else {
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("***{}", suffix)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("AURORA_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("aurora")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or return defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.llm.enforce_env_only()?;

        if let Some(temp) = self.llm.temperature
            && !(0.0..=2.0).contains(&temp)
        {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0"));
        }
        if let Some(budget) = self.llm.thinking_budget
            && budget < -1
        {
            return Err(anyhow!("Thinking budget must be -1 (dynamic) or non-negative"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(anyhow!("Timeout must be at least 1 second"));
        }
        if crate::image::AspectRatio::parse(&self.image.aspect_ratio).is_none() {
            return Err(anyhow!(
                "Invalid aspect ratio: {}. Valid options: {}",
                self.image.aspect_ratio,
                crate::image::AspectRatio::all_labels().join(", ")
            ));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            // LLM settings
            "llm.base_url" => Ok(self.llm.base_url.clone()),
            "llm.default_model" => Ok(self.llm.default_model.clone()),
            "llm.temperature" => Ok(optional_to_string(self.llm.temperature)),
            "llm.thinking_budget" => Ok(optional_to_string(self.llm.thinking_budget)),
            "llm.timeout_secs" => Ok(self.llm.timeout_secs.to_string()),

            // Image settings
            "image.model" => Ok(self.image.model.clone()),
            "image.aspect_ratio" => Ok(self.image.aspect_ratio.clone()),

            // Vision settings
            "vision.model" => Ok(self.vision.model.clone()),
            "vision.default_prompt" => Ok(self.vision.default_prompt.clone()),

            // API key (special handling - show redacted)
            "llm.api_key" | "api_key" => match self.llm.redacted_api_key()? {
                Some(redacted) => Ok(redacted),
                None => Ok(format!("(not set - use {} env var)", API_KEY_ENV_VARS.join(" or "))),
            },

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `aurora config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            // LLM settings
            "llm.base_url" => {
                let url = value.trim().trim_end_matches('/');
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(anyhow!("Base URL must start with http:// or https://"));
                }
                self.llm.base_url = url.to_string();
            }
            "llm.default_model" => {
                self.llm.default_model = non_empty(key, value)?;
            }
            "llm.temperature" => {
                if is_unset(value) {
                    self.llm.temperature = None;
                } else {
                    let temp: f32 = value
                        .parse()
                        .with_context(|| format!("Invalid temperature value: {}", value))?;
                    if !(0.0..=2.0).contains(&temp) {
                        return Err(anyhow!("Temperature must be between 0.0 and 2.0"));
                    }
                    self.llm.temperature = Some(temp);
                }
            }
            "llm.thinking_budget" => {
                if is_unset(value) {
                    self.llm.thinking_budget = None;
                } else {
                    let budget: i32 = value
                        .parse()
                        .with_context(|| format!("Invalid thinking_budget value: {}", value))?;
                    if budget < -1 {
                        return Err(anyhow!(
                            "Thinking budget must be -1 (dynamic) or non-negative"
                        ));
                    }
                    self.llm.thinking_budget = Some(budget);
                }
            }
            "llm.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("Timeout must be at least 1 second"));
                }
                self.llm.timeout_secs = secs;
            }

            // Image settings
            "image.model" => {
                self.image.model = non_empty(key, value)?;
            }
            "image.aspect_ratio" => {
                let ratio = crate::image::AspectRatio::parse(value).ok_or_else(|| {
                    anyhow!(
                        "Invalid aspect ratio: {}. Valid options: {}",
                        value,
                        crate::image::AspectRatio::all_labels().join(", ")
                    )
                })?;
                self.image.aspect_ratio = ratio.to_string();
            }

            // Vision settings
            "vision.model" => {
                self.vision.model = non_empty(key, value)?;
            }
            "vision.default_prompt" => {
                self.vision.default_prompt = non_empty(key, value)?;
            }

            // API key cannot be set via config
            "llm.api_key" | "api_key" => {
                return Err(anyhow!(
                    "API keys cannot be stored in configuration for security. \
                     Set the {} environment variable instead.",
                    API_KEY_ENV_VARS[0]
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `aurora config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "llm.base_url",
            "llm.default_model",
            "llm.temperature",
            "llm.thinking_budget",
            "llm.timeout_secs",
            "llm.api_key",
            "image.model",
            "image.aspect_ratio",
            "vision.model",
            "vision.default_prompt",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

fn optional_to_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "(default)".to_string())
}

fn is_unset(value: &str) -> bool {
    matches!(value.trim(), "" | "default" | "none")
}

fn non_empty(key: &str, value: &str) -> anyhow::Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(anyhow!("{} cannot be empty", key));
    }
    Ok(value.to_string())
}
