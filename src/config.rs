use std::{env, time::Duration};

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Mongo => "mongo",
            StorageBackend::Memory => "memory",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub quiz_collection: String,
    pub storage_backend: StorageBackend,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub openai_api_key: SecretString,
    pub openai_api_base: Option<String>,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,
    pub llm_max_attempts: u32,
    pub llm_backoff_base_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub min_content_words: usize,
    pub content_token_budget: usize,
    pub topic_token_budget: usize,
    pub prompts_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "quizforge-local".to_string()),
            quiz_collection: env::var("QUIZ_COLLECTION").unwrap_or_else(|_| "quizzes".to_string()),
            storage_backend: match env::var("STORAGE_BACKEND")
                .unwrap_or_default()
                .trim()
                .to_lowercase()
                .as_str()
            {
                "memory" => StorageBackend::Memory,
                _ => StorageBackend::Mongo,
            },
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: parse_env("WEB_SERVER_PORT", 8080),
            openai_api_key: SecretString::from(env::var("OPENAI_API_KEY").unwrap_or_default()),
            openai_api_base: env::var("OPENAI_API_BASE").ok().filter(|v| !v.trim().is_empty()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            llm_temperature: parse_env("LLM_TEMPERATURE", 0.3),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30),
            llm_max_attempts: parse_env("LLM_MAX_ATTEMPTS", 3),
            llm_backoff_base_ms: parse_env("LLM_BACKOFF_BASE_MS", 500),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            min_content_words: parse_env("MIN_CONTENT_WORDS", 300),
            content_token_budget: parse_env("CONTENT_TOKEN_BUDGET", 3500),
            topic_token_budget: parse_env("TOPIC_TOKEN_BUDGET", 2000),
            prompts_dir: env::var("PROMPTS_DIR").ok().filter(|v| !v.trim().is_empty()),
        }
    }

    /// Rejects configuration the pipeline cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.openai_api_key.expose_secret().trim().is_empty() {
            return Err(AppError::InternalError(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }

        if self.llm_max_attempts == 0 {
            return Err(AppError::InternalError(
                "LLM_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        if self.llm_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(AppError::InternalError(
                "LLM_TIMEOUT_SECS and REQUEST_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        if self.content_token_budget == 0 || self.topic_token_budget == 0 {
            return Err(AppError::InternalError(
                "CONTENT_TOKEN_BUDGET and TOPIC_TOKEN_BUDGET must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn llm_backoff_base(&self) -> Duration {
        Duration::from_millis(self.llm_backoff_base_ms)
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quizforge-test".to_string(),
            quiz_collection: "quizzes".to_string(),
            storage_backend: StorageBackend::Memory,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            openai_api_key: SecretString::from("test-key".to_string()),
            openai_api_base: None,
            llm_model: "gpt-4o-mini".to_string(),
            llm_temperature: 0.3,
            llm_timeout_secs: 5,
            llm_max_attempts: 3,
            llm_backoff_base_ms: 0,
            request_timeout_secs: 5,
            user_agent: "quizforge-test".to_string(),
            min_content_words: 300,
            content_token_budget: 3500,
            topic_token_budget: 2000,
            prompts_dir: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
