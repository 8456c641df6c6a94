//! Process configuration, resolved once at startup.
//!
//! The storage engine selection is deliberately fail-fast: an unrecognized
//! `TODO_STORAGE` value aborts startup instead of surfacing as a per-request
//! error later.

use anyhow::{bail, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Which storage backend every model binds to for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEngine {
    /// Relational variant: SQLite with enforced unique and foreign-key
    /// constraints.
    Sqlite,
    /// Document variant: one JSON document per entity on the filesystem,
    /// references enforced at the application level.
    Document,
}

impl FromStr for StorageEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageEngine::Sqlite),
            "document" => Ok(StorageEngine::Document),
            other => bail!("unknown storage engine: {}", other),
        }
    }
}

/// Owned configuration value passed down from `main`; never a global.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageEngine,
    /// SQLite connection URL (sqlite backend only)
    pub database_url: String,
    /// Base directory for document storage (document backend only)
    pub data_dir: PathBuf,
    /// Secret used to sign and verify bearer tokens
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
}

const DEFAULT_DATABASE_URL: &str = "sqlite:todos.db";
const DEFAULT_DATA_DIR: &str = "todo_data";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

impl AppConfig {
    /// Read configuration from the environment. Called once in `main`.
    pub fn from_env() -> Result<Self> {
        let storage = std::env::var("TODO_STORAGE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .parse::<StorageEngine>()?;

        let database_url =
            std::env::var("TODO_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let data_dir = PathBuf::from(
            std::env::var("TODO_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
        );

        let jwt_secret = match std::env::var("TODO_JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => bail!("TODO_JWT_SECRET must be set to a non-empty value"),
        };

        let bind_addr = std::env::var("TODO_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()?;

        Ok(Self {
            storage,
            database_url,
            data_dir,
            jwt_secret,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_engines() {
        assert_eq!("sqlite".parse::<StorageEngine>().unwrap(), StorageEngine::Sqlite);
        assert_eq!("document".parse::<StorageEngine>().unwrap(), StorageEngine::Document);
        // Case and surrounding whitespace are tolerated
        assert_eq!(" SQLite ".parse::<StorageEngine>().unwrap(), StorageEngine::Sqlite);
    }

    #[test]
    fn rejects_unknown_engine() {
        assert!("mongodb".parse::<StorageEngine>().is_err());
        assert!("".parse::<StorageEngine>().is_err());
    }
}
