use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub aws_region: String,
    pub audio_bucket: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Synthesis provider
    pub elevenlabs_api_key: String,
    pub elevenlabs_base_url: String,
    // Cache coordination
    pub lock_duration_secs: u64,
    pub retry_hint_ms: u64,
    pub signed_url_ttl_days: u64,
    pub url_cache_enabled: bool,
    // Admission
    pub narration_rate_limit: u32,
    pub narration_rate_window_secs: u64,
    pub voice_create_rate_limit: u32,
    pub voice_create_rate_window_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            audio_bucket: env::var("AUDIO_BUCKET")?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            elevenlabs_api_key: env::var("ELEVENLABS_API_KEY")?,
            elevenlabs_base_url: env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string()),
            lock_duration_secs: env::var("LOCK_DURATION_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()?,
            retry_hint_ms: env::var("RETRY_HINT_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()?,
            signed_url_ttl_days: env::var("SIGNED_URL_TTL_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            url_cache_enabled: env::var("URL_CACHE_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<String>()
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
            narration_rate_limit: env::var("NARRATION_RATE_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            narration_rate_window_secs: env::var("NARRATION_RATE_WINDOW_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            voice_create_rate_limit: env::var("VOICE_CREATE_RATE_LIMIT")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            voice_create_rate_window_secs: env::var("VOICE_CREATE_RATE_WINDOW_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
