//! Storage layer: two interchangeable backends behind one trait contract.
//!
//! `connect` performs the one-time backend selection. After it returns, the
//! engine choice is baked into the trait objects inside [`Stores`] and is
//! never re-inspected.

pub mod document;
pub mod sqlite;
pub mod traits;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

pub use traits::{TodoStorage, UserStorage};

use crate::config::{AppConfig, StorageEngine};

/// The selected backend's repositories, ready for injection into services.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStorage>,
    pub todos: Arc<dyn TodoStorage>,
}

/// Resolve the configured storage engine and open it. Called exactly once
/// at startup; failures here abort the process.
pub async fn connect(config: &AppConfig) -> Result<Stores> {
    match config.storage {
        StorageEngine::Sqlite => {
            info!("storage engine: sqlite ({})", config.database_url);
            let db = sqlite::DbConnection::new(&config.database_url).await?;
            Ok(Stores {
                users: Arc::new(sqlite::UserRepository::new(db.clone())),
                todos: Arc::new(sqlite::TodoRepository::new(db)),
            })
        }
        StorageEngine::Document => {
            info!("storage engine: document ({})", config.data_dir.display());
            let conn = document::DocumentConnection::new(&config.data_dir)?;
            Ok(Stores {
                users: Arc::new(document::UserRepository::new(conn.clone())),
                todos: Arc::new(document::TodoRepository::new(conn)),
            })
        }
    }
}
