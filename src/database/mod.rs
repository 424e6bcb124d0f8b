pub mod db;
pub mod memory;
pub mod redis;
pub mod store;

use std::sync::Arc;

pub use store::{OtpStore, StoreError};

use crate::utils::config::StoreBackend;

/// Connect the configured store backend, ready to serve requests
pub async fn connect_store(backend: StoreBackend) -> Result<Arc<dyn OtpStore>, StoreError> {
    let store: Arc<dyn OtpStore> = match backend {
        StoreBackend::MongoDb => {
            let database = db::Database::init().await?;
            Arc::new(db::MongoOtpStore::new(database).await?)
        }
        StoreBackend::Redis => {
            let client = redis::RedisClient::init().await?;
            Arc::new(redis::RedisOtpStore::new(&client))
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory OTP store, records are lost on restart");
            let store = memory::MemoryOtpStore::new();
            store.spawn_sweeper();
            Arc::new(store)
        }
    };

    Ok(store)
}
