//! LLM configuration persistence and provider selection.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use docops_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 8000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Hosted model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Groq,
    OpenAI,
    Anthropic,
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Groq => write!(f, "groq"),
            LlmProvider::OpenAI => write!(f, "openai"),
            LlmProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(LlmProvider::Groq),
            "openai" => Ok(LlmProvider::OpenAI),
            "anthropic" => Ok(LlmProvider::Anthropic),
            other => Err(Error::Config(format!("unknown LLM provider: {other}"))),
        }
    }
}

/// Provider, model and key picked by [`LlmConfig::resolve_provider`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProvider {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: String,
}

/// Stored LLM configuration (persisted to `llm-config.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    /// `auto` or a provider name.
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}
fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            preferred_provider: default_preferred(),
            groq_api_key: None,
            openai_api_key: None,
            anthropic_api_key: None,
            groq_model: default_groq_model(),
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            config_path: PathBuf::new(),
        }
    }
}

/// Partial update from an admin request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfigUpdate {
    pub preferred_provider: Option<String>,
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub groq_model: Option<String>,
    pub openai_model: Option<String>,
    pub anthropic_model: Option<String>,
}

/// Public view of the configuration. Keys are never returned in full.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfigResponse {
    pub preferred_provider: String,
    pub groq_key: Option<String>,
    pub openai_key: Option<String>,
    pub anthropic_key: Option<String>,
    pub groq_model: String,
    pub openai_model: String,
    pub anthropic_model: String,
    pub active_provider: Option<String>,
    pub active_model: Option<String>,
}

fn non_empty(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

fn env_key(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

/// `gsk_abcdef123456` -> `gsk_…3456`.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

impl LlmConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: LlmConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        config.config_path = config_path.to_path_buf();

        config.groq_api_key = non_empty(config.groq_api_key.take()).or_else(|| env_key("GROQ_API_KEY"));
        config.openai_api_key =
            non_empty(config.openai_api_key.take()).or_else(|| env_key("OPENAI_API_KEY"));
        config.anthropic_api_key =
            non_empty(config.anthropic_api_key.take()).or_else(|| env_key("ANTHROPIC_API_KEY"));

        config
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved LLM config to {}", self.config_path.display());
        Ok(())
    }

    /// Merge an update into the current config. Blank keys clear the stored key.
    pub fn apply_update(&mut self, update: &LlmConfigUpdate) {
        if let Some(p) = &update.preferred_provider {
            self.preferred_provider = p.trim().to_lowercase();
        }
        if let Some(k) = &update.groq_api_key {
            self.groq_api_key = non_empty(Some(k.clone()));
        }
        if let Some(k) = &update.openai_api_key {
            self.openai_api_key = non_empty(Some(k.clone()));
        }
        if let Some(k) = &update.anthropic_api_key {
            self.anthropic_api_key = non_empty(Some(k.clone()));
        }
        if let Some(m) = &update.groq_model {
            self.groq_model = m.clone();
        }
        if let Some(m) = &update.openai_model {
            self.openai_model = m.clone();
        }
        if let Some(m) = &update.anthropic_model {
            self.anthropic_model = m.clone();
        }
    }

    fn candidate(&self, provider: LlmProvider) -> Option<ResolvedProvider> {
        let (key, model) = match provider {
            LlmProvider::Groq => (&self.groq_api_key, &self.groq_model),
            LlmProvider::OpenAI => (&self.openai_api_key, &self.openai_model),
            LlmProvider::Anthropic => (&self.anthropic_api_key, &self.anthropic_model),
        };
        key.as_ref().map(|k| ResolvedProvider {
            provider,
            model: model.clone(),
            api_key: k.clone(),
        })
    }

    /// Resolve which provider and model to use, or `None` when no key is set.
    pub fn resolve_provider(&self) -> Option<ResolvedProvider> {
        if self.preferred_provider != "auto" {
            return self
                .preferred_provider
                .parse()
                .ok()
                .and_then(|p| self.candidate(p));
        }

        // Auto mode: Groq > OpenAI > Anthropic
        [LlmProvider::Groq, LlmProvider::OpenAI, LlmProvider::Anthropic]
            .into_iter()
            .find_map(|p| self.candidate(p))
    }

    /// Build the public config response (API keys masked).
    pub fn to_response(&self) -> LlmConfigResponse {
        let resolved = self.resolve_provider();
        LlmConfigResponse {
            preferred_provider: self.preferred_provider.clone(),
            groq_key: self.groq_api_key.as_deref().map(mask_key),
            openai_key: self.openai_api_key.as_deref().map(mask_key),
            anthropic_key: self.anthropic_api_key.as_deref().map(mask_key),
            groq_model: self.groq_model.clone(),
            openai_model: self.openai_model.clone(),
            anthropic_model: self.anthropic_model.clone(),
            active_provider: resolved.as_ref().map(|r| r.provider.to_string()),
            active_model: resolved.map(|r| r.model),
        }
    }
}
