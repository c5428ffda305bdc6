//! Process configuration read from the environment.
//!
//! | variable                | default                  |
//! |-------------------------|--------------------------|
//! | `HOST`                  | `0.0.0.0`                |
//! | `PORT`                  | `3000`                   |
//! | `CORS_ORIGINS`          | `http://localhost:5173`  |
//! | `REQUEST_TIMEOUT_SECS`  | `30`                     |
//! | `SHUTDOWN_TIMEOUT_SECS` | `30`                     |
//! | `APP_URL`               | `http://localhost:3000`  |
//! | `ASSET_ROOT`            | `storage/app`            |
//! | `PUBLIC_ID_SALT`        | empty                    |
//! | `JWT_SECRET`            | required                 |
//! | `JWT_ACCESS_EXPIRY_MINS`| `15`                     |

use std::fmt::Display;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`; blanks are dropped.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long to wait for the pool to drain after the listener stops.
    pub shutdown_timeout_secs: u64,
    /// Base of every asset URL handed to clients.
    pub app_url: String,
    /// Directory where form avatars and backgrounds are stored.
    pub asset_root: String,
    /// Salt of the public form identifier codec. Changing it changes every
    /// form's public identifier, so it is fixed per deployment.
    pub public_id_salt: String,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Build the configuration from the environment, panicking on values
    /// that are set but unparseable.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 3000),
            cors_origins: env_or("CORS_ORIGINS", "http://localhost:5173")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_parse("SHUTDOWN_TIMEOUT_SECS", 30),
            app_url: env_or("APP_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            asset_root: env_or("ASSET_ROOT", "storage/app"),
            public_id_salt: env_or("PUBLIC_ID_SALT", ""),
            jwt: JwtConfig::from_env(),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}
