//! Builder configuration stored in `game-builder.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::state::DEFAULT_MAX_ITERATIONS;

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "game-builder.toml";

/// Builder configuration (TOML).
///
/// Missing fields default to the values the pipeline was tuned with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BuilderConfig {
    pub llm: LlmConfig,
    pub build: BuildConfig,
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier, e.g. `gemini-2.5-pro`.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// REST base URL up to (not including) `/models`.
    pub base_url: String,

    pub temperature: f32,

    pub max_output_tokens: u32,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-pro".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: 0.3,
            max_output_tokens: 8192,
            request_timeout_secs: 10 * 60,
        }
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    /// Implement↔Validate round budget.
    pub max_iterations: u32,

    /// Directory the canonical files are written to.
    pub output_dir: PathBuf,

    /// Plan characters embedded in the Validate prompt.
    pub validation_plan_chars: usize,

    /// Plan characters embedded in the Instructions prompt.
    pub instructions_plan_chars: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            output_dir: PathBuf::from("generated_game"),
            validation_plan_chars: 3000,
            instructions_plan_chars: 2000,
        }
    }
}

impl BuilderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(anyhow!("llm.model must be non-empty"));
        }
        if self.llm.api_key_env.trim().is_empty() {
            return Err(anyhow!("llm.api_key_env must be non-empty"));
        }
        if !self.llm.base_url.starts_with("http://") && !self.llm.base_url.starts_with("https://")
        {
            return Err(anyhow!("llm.base_url must be an http(s) URL"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(anyhow!("llm.temperature must be within 0.0..=2.0"));
        }
        if self.llm.max_output_tokens == 0 {
            return Err(anyhow!("llm.max_output_tokens must be > 0"));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(anyhow!("llm.request_timeout_secs must be > 0"));
        }
        if self.build.max_iterations == 0 {
            return Err(anyhow!("build.max_iterations must be > 0"));
        }
        if self.build.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("build.output_dir must be non-empty"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.request_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BuilderConfig::default()`.
pub fn load_config(path: &Path) -> Result<BuilderConfig> {
    if !path.exists() {
        let cfg = BuilderConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BuilderConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &BuilderConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
