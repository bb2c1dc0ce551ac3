use std::env;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::auth::jwt::{JwtConfig, DEFAULT_EXPIRY_MINS};
use crate::oauth::kakao::{KakaoConfig, DEFAULT_API_BASE_URL, DEFAULT_AUTH_BASE_URL};

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::SecurityHeaders;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/invitation";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_REDIRECT_URI: &str = "http://localhost:3001/api/members/kakao";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub kakao: KakaoConfig,
    pub cors_allowed_origins: Vec<String>,
    /// Enables HSTS.
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let store = match get("STORE_BACKEND", "postgres").to_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: get("DATABASE_URL", DEFAULT_DATABASE_URL),
                max_connections: parse_number(
                    "DATABASE_MAX_CONNECTIONS",
                    lookup("DATABASE_MAX_CONNECTIONS"),
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            expiry_mins: parse_number("JWT_EXPIRY_MINS", lookup("JWT_EXPIRY_MINS"), DEFAULT_EXPIRY_MINS)?,
        };

        let kakao = KakaoConfig {
            client_id: required("KAKAO_API_KEY")?,
            redirect_uri: get("KAKAO_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            auth_base_url: get("KAKAO_AUTH_BASE_URL", DEFAULT_AUTH_BASE_URL),
            api_base_url: get("KAKAO_API_BASE_URL", DEFAULT_API_BASE_URL),
        };

        let cors_allowed_origins =
            parse_origins(&get("CORS_ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS))?;

        let production = lookup("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        Ok(Self {
            store,
            host: get("HOST", DEFAULT_HOST),
            port: parse_number("PORT", lookup("PORT"), DEFAULT_PORT)?,
            jwt,
            kakao,
            cors_allowed_origins,
            production,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                key: "HOST",
                value: self.host.clone(),
            })
    }
}

/// Credentialed CORS needs an explicit origin list; every entry must be a
/// valid header value.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "CORS_ALLOWED_ORIGINS",
        value: raw.to_string(),
    };

    let origins: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if origins.is_empty() || origins.iter().any(|o| o.parse::<HeaderValue>().is_err()) {
        return Err(invalid());
    }
    Ok(origins)
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
