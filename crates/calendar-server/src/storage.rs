//! Backend selection.
//!
//! The backend is built once at startup from `storage.type` and shared
//! by both servers as `Arc<dyn Repository>`.

use std::sync::Arc;

use calendar_core::config::{StorageConfig, StorageKind};
use calendar_core::{MemoryStore, Repository};
use calendar_db::{PgEventStore, PostgresConfig, PostgresPool};
use tracing::info;

use crate::error::AppError;

/// The configured storage backend.
pub enum Backend {
    /// Process-local storage; contents are lost on exit.
    Memory(Arc<MemoryStore>),
    /// `PostgreSQL` storage.
    Postgres {
        /// Pool owned for the process lifetime; closed on shutdown.
        pool: PostgresPool,
        /// Repository sharing the pool.
        store: Arc<PgEventStore>,
    },
}

impl Backend {
    /// Build the backend named by `config.kind`.
    ///
    /// For `sql` this connects, runs pending migrations, then builds the
    /// store.
    pub async fn connect(config: &StorageConfig) -> Result<Self, AppError> {
        match config.kind {
            StorageKind::Memory => {
                info!(backend = "memory", "Storage backend ready");
                Ok(Self::Memory(Arc::new(MemoryStore::new())))
            }
            StorageKind::Sql => {
                let pool =
                    PostgresPool::connect(&PostgresConfig::from_settings(&config.postgres)).await?;
                pool.run_migrations().await?;
                let store = Arc::new(PgEventStore::from_pool(&pool));
                info!(backend = "sql", "Storage backend ready");
                Ok(Self::Postgres { pool, store })
            }
        }
    }

    /// The repository both servers share.
    pub fn repository(&self) -> Arc<dyn Repository> {
        match self {
            Self::Memory(store) => Arc::clone(store) as Arc<dyn Repository>,
            Self::Postgres { store, .. } => Arc::clone(store) as Arc<dyn Repository>,
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Self::Postgres { pool, .. } = self {
            pool.close().await;
        }
    }
}
