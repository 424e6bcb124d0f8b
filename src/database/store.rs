use async_trait::async_trait;
use thiserror::Error;

use crate::otp::model::OtpRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Persistence for issued OTPs.
///
/// Every implementation owns expiry: records must stop matching once
/// `OTP_EXPIRATION_SECONDS` have passed since `created_at`, and must disappear
/// without the application deleting them. Backends with native TTL configure it
/// at construction, the others run a sweep.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Insert a new record stamped with the current time
    async fn create(&self, email: &str, otp: &str) -> Result<(), StoreError>;

    /// First live record matching both fields exactly
    async fn find_match(&self, email: &str, otp: &str) -> Result<Option<OtpRecord>, StoreError>;

    /// Release connections and background tasks
    async fn close(&self) {}
}
