// src/config.rs

use std::{env, fmt, str::FromStr};

use dotenvy::dotenv;

/// Lifetime of an issued bearer token (24 hours).
pub const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Errors raised while reading configuration at startup.
#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, value } => write!(f, "{key} has an invalid value: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Which generative-text backend to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    OpenAi,
}

impl FromStr for LlmProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" => Ok(LlmProvider::OpenAi),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// Inclusive count range used when asking for lessons or questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    pub lessons: CountRange,
    pub quizzes: CountRange,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            lessons: CountRange { min: 3, max: 4 },
            quizzes: CountRange { min: 15, max: 20 },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Overrides the database named in `database_url` when set.
    pub database_name: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub llm: LlmConfig,
    pub generation: GenerationSettings,
    /// Allowed CORS origins; `["*"]` allows any origin.
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let database_name = optional("DB_NAME");
        let jwt_secret = required("JWT_SECRET")?;
        let jwt_expiration = parsed_or("JWT_EXPIRATION_SECS", TOKEN_TTL_SECS)?;

        let provider = match optional("LLM_PROVIDER") {
            Some(value) => value
                .parse::<LlmProvider>()
                .map_err(|_| ConfigError::Invalid { key: "LLM_PROVIDER", value })?,
            None => LlmProvider::Gemini,
        };

        let (key_fallback, default_model, default_base_url) = match provider {
            LlmProvider::Gemini => (
                "GOOGLE_API_KEY",
                "gemini-1.5-flash-latest",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            LlmProvider::OpenAi => ("OPENAI_API_KEY", "gpt-4o-mini", "https://api.openai.com/v1"),
        };

        let api_key = optional("LLM_API_KEY")
            .or_else(|| optional(key_fallback))
            .ok_or(ConfigError::Missing("LLM_API_KEY"))?;

        let llm = LlmConfig {
            provider,
            api_key,
            model: optional("LLM_MODEL").unwrap_or_else(|| default_model.to_string()),
            base_url: optional("LLM_BASE_URL").unwrap_or_else(|| default_base_url.to_string()),
        };

        let defaults = GenerationSettings::default();
        let generation = GenerationSettings {
            lessons: count_range("COURSE_LESSONS_MIN", "COURSE_LESSONS_MAX", defaults.lessons)?,
            quizzes: count_range("COURSE_QUIZZES_MIN", "COURSE_QUIZZES_MAX", defaults.quizzes)?,
        };

        let cors_origins = optional("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let port = parsed_or("PORT", 8001)?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            database_name,
            jwt_secret,
            jwt_expiration,
            llm,
            generation,
            cors_origins,
            port,
            rust_log,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parsed_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn count_range(
    min_key: &'static str,
    max_key: &'static str,
    default: CountRange,
) -> Result<CountRange, ConfigError> {
    let min = parsed_or(min_key, default.min)?;
    let max = parsed_or(max_key, default.max)?;
    if min == 0 || min > max {
        return Err(ConfigError::Invalid {
            key: max_key,
            value: format!("{min}-{max}"),
        });
    }
    Ok(CountRange { min, max })
}
