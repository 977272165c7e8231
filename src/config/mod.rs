use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub request: RequestConfig,
    pub logging: LoggingConfig,
    pub eval: EvalConfig,
}

/// Model endpoint configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f64>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

/// Dataset and job log locations
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub dataset_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let llm = LlmConfig {
            api_key: env::var("OPENAI_API_KEY").map_err(|_| AppError::Config {
                message: "OPENAI_API_KEY is required".to_string(),
            })?,
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: env::var("MODEL_NAME").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            temperature: env::var("MODEL_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok()),
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(120_000),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let eval = EvalConfig {
            dataset_dir: PathBuf::from(
                env::var("DATASET_DIR").unwrap_or_else(|_| "./dataset".to_string()),
            ),
            log_dir: PathBuf::from(env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string())),
        };

        Ok(Config {
            llm,
            request,
            logging,
            eval,
        })
    }

    /// Replace the configured model name, e.g. from a `--model` flag.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.llm.model = model;
        }
        self
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 120_000,
        }
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from("./dataset"),
            log_dir: PathBuf::from("./logs"),
        }
    }
}
