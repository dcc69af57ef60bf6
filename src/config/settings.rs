//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::constants::{
    DEFAULT_CORS_ALLOWED_ORIGINS, DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS,
    DEFAULT_MPESA_CALLBACK_URL, DEFAULT_MPESA_COMPLETION_DELAY_SECONDS,
    DEFAULT_MPESA_FAILURE_RATE, DEFAULT_MPESA_PASSKEY, DEFAULT_MPESA_SHORTCODE,
    DEFAULT_PRODUCT_CACHE_TTL_SECONDS, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, MIN_JWT_SECRET_LENGTH,
};

/// Settings for the simulated M-Pesa gateway.
#[derive(Clone)]
pub struct MpesaConfig {
    pub shortcode: String,
    passkey: String,
    pub callback_url: String,
    /// Probability in `[0, 1]` of an immediate decline
    pub failure_rate: f64,
    pub completion_delay: Duration,
}

impl MpesaConfig {
    pub fn new(
        shortcode: impl Into<String>,
        passkey: impl Into<String>,
        callback_url: impl Into<String>,
        failure_rate: f64,
        completion_delay: Duration,
    ) -> Self {
        Self {
            shortcode: shortcode.into(),
            passkey: passkey.into(),
            callback_url: callback_url.into(),
            failure_rate: failure_rate.clamp(0.0, 1.0),
            completion_delay,
        }
    }

    pub fn passkey(&self) -> &str {
        &self.passkey
    }
}

impl Default for MpesaConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_MPESA_SHORTCODE,
            DEFAULT_MPESA_PASSKEY,
            DEFAULT_MPESA_CALLBACK_URL,
            DEFAULT_MPESA_FAILURE_RATE,
            Duration::from_secs(DEFAULT_MPESA_COMPLETION_DELAY_SECONDS),
        )
    }
}

impl std::fmt::Debug for MpesaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpesaConfig")
            .field("shortcode", &self.shortcode)
            .field("passkey", &"[REDACTED]")
            .field("callback_url", &self.callback_url)
            .field("failure_rate", &self.failure_rate)
            .field("completion_delay", &self.completion_delay)
            .finish()
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub product_cache_ttl_seconds: u64,
    pub cors_allowed_origins: Vec<String>,
    pub mpesa: MpesaConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("product_cache_ttl_seconds", &self.product_cache_ttl_seconds)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("mpesa", &self.mpesa)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set in release builds or is too short.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let mpesa = MpesaConfig::new(
            env_or("MPESA_SHORTCODE", DEFAULT_MPESA_SHORTCODE),
            env_or("MPESA_PASSKEY", DEFAULT_MPESA_PASSKEY),
            env_or("MPESA_CALLBACK_URL", DEFAULT_MPESA_CALLBACK_URL),
            parse_or("MPESA_FAILURE_RATE", DEFAULT_MPESA_FAILURE_RATE),
            Duration::from_secs(parse_or(
                "MPESA_COMPLETION_DELAY_SECONDS",
                DEFAULT_MPESA_COMPLETION_DELAY_SECONDS,
            )),
        );

        Self {
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            redis_url: env_or("REDIS_URL", DEFAULT_REDIS_URL),
            jwt_secret,
            jwt_expiration_hours: parse_or("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env_or("SERVER_HOST", DEFAULT_SERVER_HOST),
            server_port: parse_or("SERVER_PORT", DEFAULT_SERVER_PORT),
            product_cache_ttl_seconds: parse_or(
                "PRODUCT_CACHE_TTL_SECONDS",
                DEFAULT_PRODUCT_CACHE_TTL_SECONDS,
            ),
            cors_allowed_origins: split_origins(&env_or(
                "CORS_ALLOWED_ORIGINS",
                DEFAULT_CORS_ALLOWED_ORIGINS,
            )),
            mpesa,
        }
    }

    /// Build a configuration with explicit values (tests and embedding).
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            product_cache_ttl_seconds: DEFAULT_PRODUCT_CACHE_TTL_SECONDS,
            cors_allowed_origins: split_origins(DEFAULT_CORS_ALLOWED_ORIGINS),
            mpesa: MpesaConfig::default(),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
