use crate::core::errors::ConfigError;
use std::env;
use tracing::Level;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub log_level: Level,
    pub frontend_dir: String,
}

/// Local model configuration
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Identifier reported by the health endpoint
    pub name: String,
    /// Directory holding the exported ONNX model and vocabulary
    pub model_dir: String,
    /// Decode length bound for local translations
    pub max_output_tokens: usize,
}

/// Request limits
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_input_chars: usize,
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// LRU capacity; the cache never holds more entries than this
    pub max_entries: usize,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub limits: LimitsConfig,
    pub cache: CacheConfig,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = Self::load_from_env();
        config.validate()?;
        Ok(config)
    }

    fn load_from_env() -> Self {
        // Parse log level
        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "trace" => Some(Level::TRACE),
                "debug" => Some(Level::DEBUG),
                "info" => Some(Level::INFO),
                "warn" | "warning" => Some(Level::WARN),
                "error" => Some(Level::ERROR),
                _ => None,
            })
            .unwrap_or(Level::INFO);

        Self {
            server: ServerConfig {
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8000),
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                log_level,
                frontend_dir: env::var("FRONTEND_DIR").unwrap_or_else(|_| "frontend".to_string()),
            },
            model: ModelConfig {
                name: env::var("MODEL_NAME")
                    .unwrap_or_else(|_| "Helsinki-NLP/opus-mt-en-hi".to_string()),
                model_dir: env::var("LOCAL_MODEL_DIR")
                    .unwrap_or_else(|_| "models/opus-mt-en-hi".to_string()),
                max_output_tokens: env::var("MAX_OUTPUT_TOKENS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(256),
            },
            limits: LimitsConfig {
                max_input_chars: env::var("MAX_INPUT_CHARS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            },
            cache: CacheConfig {
                max_entries: env::var("MAX_CACHE_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(200),
            },
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_input_chars == 0 {
            return Err(ConfigError::InvalidInputLimit(self.limits.max_input_chars));
        }

        if self.cache.max_entries == 0 {
            return Err(ConfigError::InvalidCacheSize(self.cache.max_entries));
        }

        if !(1..=4096).contains(&self.model.max_output_tokens) {
            return Err(ConfigError::InvalidOutputTokens(self.model.max_output_tokens));
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        Ok(())
    }

    pub fn server_host(&self) -> &str {
        &self.server.host
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn log_level(&self) -> Level {
        self.server.log_level
    }

    pub fn model_name(&self) -> &str {
        &self.model.name
    }

    pub fn max_input_chars(&self) -> usize {
        self.limits.max_input_chars
    }

    pub fn max_cache_entries(&self) -> usize {
        self.cache.max_entries
    }
}

// Note: No Default implementation because Config::new() can fail
// Users should explicitly call Config::new()? and handle errors
