pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryAccountStore, MemoryWhiskeyStore};
pub use postgres::{PgAccountStore, PgWhiskeyStore};
pub use repository::{AccountStore, AdminScope, StoreError, WhiskeyFilters, WhiskeyStore};

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Whiskey records and the account directory, always from the same backend
#[derive(Clone)]
pub struct Stores {
    pub whiskeys: Arc<dyn WhiskeyStore>,
    pub accounts: Arc<dyn AccountStore>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            whiskeys: Arc::new(MemoryWhiskeyStore::new()),
            accounts: Arc::new(MemoryAccountStore::new()),
        }
    }
}

/// Postgres when a URL is configured, otherwise process-local memory stores
pub async fn open_stores(config: &DatabaseConfig) -> Result<Stores, DatabaseError> {
    if config.url.is_none() {
        warn!("DATABASE_URL not set; using in-memory store, data will not persist");
        return Ok(Stores::memory());
    }

    let pool = DatabaseManager::connect(config).await?;
    info!("Using Postgres whiskey store");
    Ok(Stores {
        whiskeys: Arc::new(PgWhiskeyStore::new(pool.clone())),
        accounts: Arc::new(PgAccountStore::new(pool)),
    })
}
