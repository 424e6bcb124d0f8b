use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::database::store::{OtpStore, StoreError};
use crate::otp::model::OtpRecord;
use crate::utils::helpers::OTP_EXPIRATION_SECONDS;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Process-local OTP store.
///
/// Has no native expiry, so a background task drops expired records every
/// minute. Lookups skip expired records even if the sweep has not run yet.
pub struct MemoryOtpStore {
    records: Arc<RwLock<Vec<OtpRecord>>>,
    ttl_seconds: u64,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryOtpStore {
    pub fn new() -> Self {
        Self::with_ttl(OTP_EXPIRATION_SECONDS)
    }

    pub fn with_ttl(ttl_seconds: u64) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            ttl_seconds,
            sweeper: Mutex::new(None),
        }
    }

    /// Start the periodic sweep. Must be called from within a Tokio runtime.
    pub fn spawn_sweeper(&self) {
        let records = Arc::clone(&self.records);
        let ttl_seconds = self.ttl_seconds;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let removed = sweep(&records, ttl_seconds).await;
                if removed > 0 {
                    log::debug!("Swept {} expired OTP records", removed);
                }
            }
        });

        if let Ok(mut sweeper) = self.sweeper.lock() {
            if let Some(previous) = sweeper.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Drop expired records now, returning how many were removed
    #[cfg(test)]
    pub async fn sweep(&self) -> usize {
        sweep(&self.records, self.ttl_seconds).await
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for MemoryOtpStore {
    fn default() -> Self {
        Self::new()
    }
}

async fn sweep(records: &RwLock<Vec<OtpRecord>>, ttl_seconds: u64) -> usize {
    let now = Utc::now();
    let mut records = records.write().await;
    let before = records.len();
    records.retain(|record| !record.is_expired(ttl_seconds, now));
    before - records.len()
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn create(&self, email: &str, otp: &str) -> Result<(), StoreError> {
        self.records.write().await.push(OtpRecord::new(email, otp));
        Ok(())
    }

    async fn find_match(&self, email: &str, otp: &str) -> Result<Option<OtpRecord>, StoreError> {
        let now = Utc::now();
        let records = self.records.read().await;

        Ok(records
            .iter()
            .find(|record| {
                record.email == email
                    && record.one_time_password == otp
                    && !record.is_expired(self.ttl_seconds, now)
            })
            .cloned())
    }

    async fn close(&self) {
        if let Ok(mut sweeper) = self.sweeper.lock() {
            if let Some(handle) = sweeper.take() {
                handle.abort();
            }
        }
    }
}
