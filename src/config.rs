use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            max_retries: 3,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Hard cap on contract text length before prompting; longer text is
    /// truncated with an explicit marker to stay inside the model's context.
    pub max_contract_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_contract_chars: 50_000,
        }
    }
}

/// Load configuration from a TOML file, falling back to defaults when the
/// file does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    match config.model.provider.as_str() {
        "openai" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown model provider: '{}'. Must be openai or disabled.",
            other
        ),
    }

    if config.analysis.max_contract_chars == 0 {
        anyhow::bail!("analysis.max_contract_chars must be > 0");
    }

    if config.model.timeout_secs == 0 {
        anyhow::bail!("model.timeout_secs must be > 0");
    }

    Ok(config)
}
