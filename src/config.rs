use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the document intake service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Base URL used when building storage URLs; derived from the bound port when absent.
    pub public_base_url: Option<String>,
    /// Root directory of the local object store.
    pub storage_dir: String,
    /// Upper bound on accepted upload bodies, in bytes.
    pub max_upload_bytes: usize,
    /// Generative model backend used for summaries and image descriptions.
    pub summarization_provider: SummarizationProvider,
    /// Optional override for the Ollama endpoint.
    pub ollama_url: Option<String>,
    /// Model identifier used for text summaries.
    pub summarization_model: String,
    /// Model identifier used for image descriptions.
    pub vision_model: String,
    /// Transport timeout for fetching stored files.
    pub fetch_timeout_secs: u64,
    /// Transport timeout for a single model call.
    pub generation_timeout_secs: u64,
    /// Timeout wrapped around one full pipeline invocation.
    pub pipeline_timeout_secs: u64,
}

/// Supported generative model backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummarizationProvider {
    /// Model calls are disabled; every summarization attempt fails.
    None,
    /// Local Ollama runtime.
    Ollama,
}

const DEFAULT_STORAGE_DIR: &str = "data/uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_SUMMARIZATION_MODEL: &str = "llama3.2";
const DEFAULT_VISION_MODEL: &str = "llava";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PIPELINE_TIMEOUT_SECS: u64 = 300;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server_port: parse_optional("SERVER_PORT")?,
            public_base_url: load_env_optional("PUBLIC_BASE_URL")
                .map(|value| value.trim_end_matches('/').to_string()),
            storage_dir: load_env_optional("STORAGE_DIR")
                .unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string()),
            max_upload_bytes: parse_optional("MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            summarization_provider: match load_env_optional("SUMMARIZATION_PROVIDER") {
                Some(value) => value.parse().map_err(|()| {
                    ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".to_string())
                })?,
                None => SummarizationProvider::Ollama,
            },
            ollama_url: load_env_optional("OLLAMA_URL"),
            summarization_model: load_env_optional("SUMMARIZATION_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZATION_MODEL.to_string()),
            vision_model: load_env_optional("VISION_MODEL")
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            fetch_timeout_secs: parse_optional("FETCH_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            generation_timeout_secs: parse_optional("GENERATION_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS),
            pipeline_timeout_secs: parse_optional("PIPELINE_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_PIPELINE_TIMEOUT_SECS),
        })
    }

    /// Timeout applied to file fetches.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Timeout applied to individual model calls.
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Timeout wrapped around a whole pipeline run.
    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline_timeout_secs)
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "disabled" => Ok(Self::None),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        server_port = ?config.server_port,
        storage_dir = %config.storage_dir,
        provider = ?config.summarization_provider,
        summarization_model = %config.summarization_model,
        vision_model = %config.vision_model,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
