//! Runtime configuration read from the process environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `STAGE` | `dev` | `prod` requires TLS to Postgres |
//! | `PORT` | `3000` | HTTP listen port |
//! | `USE_POSTGRES` | `false` | `true` selects the Postgres store |
//! | `POSTGRES_HOST` | `localhost` | |
//! | `POSTGRES_PORT` | `5432` | |
//! | `POSTGRES_USER` | `postgres` | |
//! | `POSTGRES_PASSWORD` | empty | |
//! | `POSTGRES_DATABASE` | `medsupply` | |

use std::fmt;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Deployment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Dev,
    Prod,
}

impl Stage {
    pub fn is_prod(self) -> bool {
        matches!(self, Stage::Prod)
    }
}

impl FromStr for Stage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Stage::Dev),
            "prod" | "production" => Ok(Stage::Prod),
            other => Err(ConfigError::invalid(
                "STAGE",
                format!("expected dev or prod, got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Dev => "dev",
            Stage::Prod => "prod",
        })
    }
}

/// Postgres connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database: "medsupply".to_string(),
            max_connections: 10,
        }
    }
}

impl DatabaseConfig {
    /// Connection options for `stage`: TLS is required in prod and merely
    /// preferred elsewhere.
    pub fn connect_options(&self, stage: Stage) -> PgConnectOptions {
        let ssl_mode = if stage.is_prod() {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(ssl_mode)
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub stage: Stage,
    pub port: u16,
    pub use_postgres: bool,
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stage: Stage::Dev,
            port: 3000,
            use_postgres: false,
            database: DatabaseConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = AppConfig::default();

        let stage = get("STAGE")
            .map(|v| v.parse::<Stage>())
            .transpose()?
            .unwrap_or(defaults.stage);
        let port = parse_or("PORT", get("PORT"), defaults.port)?;
        let use_postgres = get("USE_POSTGRES")
            .map(|v| parse_flag("USE_POSTGRES", &v))
            .transpose()?
            .unwrap_or(defaults.use_postgres);

        let db = defaults.database;
        let database = DatabaseConfig {
            host: get("POSTGRES_HOST").unwrap_or(db.host),
            port: parse_or("POSTGRES_PORT", get("POSTGRES_PORT"), db.port)?,
            user: get("POSTGRES_USER").unwrap_or(db.user),
            password: lookup("POSTGRES_PASSWORD").unwrap_or(db.password),
            database: get("POSTGRES_DATABASE").unwrap_or(db.database),
            max_connections: db.max_connections,
        };

        Ok(Self {
            stage,
            port,
            use_postgres,
            database,
        })
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string())),
        None => Ok(default),
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(
            key,
            format!("expected a boolean, got {other:?}"),
        )),
    }
}
