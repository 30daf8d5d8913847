use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Default instruction sent ahead of every source file.
pub const DEFAULT_PROMPT: &str = "summarize this code by identifying important functions and classes.  \
Ignore all helper functions, built in calls, and focus just on the most important code.  \
Conciseness matters. Here is the code:\n\n {content}";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aispec: AispecConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub walk: WalkConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sizes: SizesConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
pub struct AispecConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AispecConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Inference endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Request a newline-delimited streamed response instead of a single JSON body
    #[serde(default = "default_true")]
    pub stream: bool,
    /// Extra attempts after the first failed one
    #[serde(default = "default_inference_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Prompt template; `{content}` is replaced by the file contents
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Environment variable holding a bearer token
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Command (argv) printing a bearer token on stdout; takes precedence over `api_key_env`
    #[serde(default)]
    pub credential_command: Option<Vec<String>>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            stream: true,
            max_retries: default_inference_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            prompt: default_prompt(),
            api_key_env: None,
            credential_command: None,
        }
    }
}

/// Tree walk configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WalkConfig {
    /// Source-code extension allow-list
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Ignore files looked up in the walk root and combined
    #[serde(default = "default_ignore_files")]
    pub ignore_files: Vec<String>,
    #[serde(default)]
    pub include_hidden: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_files: default_ignore_files(),
            include_hidden: false,
        }
    }
}

/// Combined document output
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_summary_file")]
    pub summary_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary_file: default_summary_file(),
        }
    }
}

/// Size report configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SizesConfig {
    /// Top-level directories left out of the report
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

impl Default for SizesConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

/// Key-value store upload configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_chunk_bytes")]
    pub max_chunk_bytes: usize,
    #[serde(default = "default_upload_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_jitter_min_ms")]
    pub jitter_min_ms: u64,
    #[serde(default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: default_max_chunk_bytes(),
            max_retries: default_upload_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            jitter_min_ms: default_jitter_min_ms(),
            jitter_max_ms: default_jitter_max_ms(),
            region: None,
            endpoint_url: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_url() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_model() -> String {
    "codellama:34b".to_string()
}

fn default_true() -> bool {
    true
}

fn default_inference_retries() -> usize {
    1
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_extensions() -> Vec<String> {
    ["py", "js", "java", "cpp", "c", "cs", "ts", "php", "rb", "go"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ignore_files() -> Vec<String> {
    vec![".gitignore".to_string(), ".aispecignore".to_string()]
}

fn default_summary_file() -> PathBuf {
    PathBuf::from("aispec_summaries.md")
}

fn default_exclude_dirs() -> Vec<String> {
    vec!["node_modules".to_string()]
}

fn default_max_chunk_bytes() -> usize {
    300 * 1024
}

fn default_upload_retries() -> u32 {
    8
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_jitter_min_ms() -> u64 {
    3000
}

fn default_jitter_max_ms() -> u64 {
    10000
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from a .env file (if present) first.
    /// Looks for the config file in this order:
    /// 1. Path specified in the AISPEC_CONFIG environment variable (must exist)
    /// 2. ./aispec.toml in the current directory
    /// 3. Built-in defaults when neither is present
    pub fn load() -> Result<Self> {
        // Optional; a missing .env is not an error
        let _ = dotenv::dotenv();

        let config = match std::env::var("AISPEC_CONFIG") {
            Ok(path) => Self::from_file(&PathBuf::from(path))?,
            Err(_) => {
                let local = PathBuf::from("aispec.toml");
                if local.is_file() {
                    Self::from_file(&local)?
                } else {
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without validating it
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.inference.api_url.trim().is_empty() {
            anyhow::bail!("inference.api_url must not be empty");
        }
        url::Url::parse(&self.inference.api_url).with_context(|| {
            format!("inference.api_url is not a valid URL: {}", self.inference.api_url)
        })?;

        if self.inference.model.trim().is_empty() {
            anyhow::bail!("inference.model must not be empty");
        }

        if let Some(cmd) = &self.inference.credential_command {
            if cmd.is_empty() {
                anyhow::bail!("inference.credential_command must name a program");
            }
        }

        if self.walk.extensions.is_empty() {
            anyhow::bail!("walk.extensions must list at least one extension");
        }

        if self.upload.max_chunk_bytes == 0 {
            anyhow::bail!("upload.max_chunk_bytes must be greater than 0");
        }

        if self.upload.jitter_min_ms > self.upload.jitter_max_ms {
            anyhow::bail!("upload.jitter_min_ms must not exceed upload.jitter_max_ms");
        }

        Ok(())
    }
}
