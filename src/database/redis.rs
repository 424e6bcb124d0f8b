use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::env;

use crate::database::store::{OtpStore, StoreError};
use crate::otp::model::OtpRecord;
use crate::utils::helpers::OTP_EXPIRATION_SECONDS;

/// Redis connection wrapper
pub struct RedisClient {
    connection: MultiplexedConnection,
}

impl RedisClient {
    /// Initialize Redis connection from environment variable
    pub async fn init() -> Result<Self, StoreError> {
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let client = Client::open(redis_url)?;
        let connection = client.get_multiplexed_async_connection().await?;

        log::info!("Connected successfully to Redis");

        Ok(Self { connection })
    }

    /// Get the Redis connection
    pub fn get_connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

/// Key holding one issued code; the value is the creation timestamp.
/// The email is length-prefixed so no (email, code) pair can collide with another.
pub fn otp_key(email: &str, otp: &str) -> String {
    format!("otp:{}:{}:{}", email.len(), email, otp)
}

/// OTP store on Redis, one key per (email, code) pair written with `SET EX`
#[derive(Clone)]
pub struct RedisOtpStore {
    connection: MultiplexedConnection,
}

impl RedisOtpStore {
    pub fn new(client: &RedisClient) -> Self {
        Self {
            connection: client.get_connection(),
        }
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn create(&self, email: &str, otp: &str) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let record = OtpRecord::new(email, otp);

        conn.set_ex::<_, _, ()>(
            otp_key(email, otp),
            record.created_at.to_rfc3339(),
            OTP_EXPIRATION_SECONDS,
        )
        .await?;

        Ok(())
    }

    async fn find_match(&self, email: &str, otp: &str) -> Result<Option<OtpRecord>, StoreError> {
        let mut conn = self.connection.clone();

        let created_at: Option<String> = conn.get(otp_key(email, otp)).await?;

        let Some(raw) = created_at else {
            return Ok(None);
        };

        let created_at = DateTime::parse_from_rfc3339(&raw)
            .map_err(|e| StoreError::Backend(format!("Unreadable OTP timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(Some(OtpRecord {
            email: email.to_string(),
            one_time_password: otp.to_string(),
            created_at,
        }))
    }
}
