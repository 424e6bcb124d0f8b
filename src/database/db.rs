use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{self, Document, doc};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::database::store::{OtpStore, StoreError};
use crate::otp::model::OtpRecord;
use crate::utils::helpers::OTP_EXPIRATION_SECONDS;

const COLLECTION_NAME: &str = "emails";

/// Stored shape; `createdAt` must be a BSON date for the TTL index to apply
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OtpDocument {
    email: String,
    one_time_password: String,
    created_at: bson::DateTime,
}

/// Equality on both fields, restricted to records younger than the expiry.
/// The TTL monitor only runs once a minute, so stale records may still exist.
fn live_match_filter(email: &str, otp: &str, now: bson::DateTime) -> Document {
    let cutoff = bson::DateTime::from_millis(
        now.timestamp_millis() - (OTP_EXPIRATION_SECONDS as i64) * 1000,
    );

    doc! {
        "email": email,
        "oneTimePassword": otp,
        "createdAt": { "$gt": cutoff },
    }
}

impl From<OtpDocument> for OtpRecord {
    fn from(document: OtpDocument) -> Self {
        let created_at =
            chrono::DateTime::<Utc>::from_timestamp_millis(document.created_at.timestamp_millis())
                .unwrap_or_else(Utc::now);

        OtpRecord {
            email: document.email,
            one_time_password: document.one_time_password,
            created_at,
        }
    }
}

pub struct Database {
    pub client: Client,
    pub database_name: String,
}

impl Database {
    pub async fn init() -> Result<Self, StoreError> {
        let mongodb_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let database_name =
            std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "otp_service".to_string());

        let mut client_options = ClientOptions::parse(&mongodb_uri).await?;
        client_options.app_name = Some("otp_mailer".to_string());

        let client = Client::with_options(client_options)?;

        // Ping the server to see if you can connect to the cluster
        client
            .database("admin")
            .run_command(doc! {"ping": 1})
            .await?;

        log::info!("Connected successfully to MongoDB");

        Ok(Self {
            client,
            database_name,
        })
    }
}

/// OTP store on a MongoDB collection with a TTL index on `createdAt`
pub struct MongoOtpStore {
    client: Client,
    collection: Collection<OtpDocument>,
}

impl MongoOtpStore {
    pub async fn new(database: Database) -> Result<Self, StoreError> {
        let collection = database
            .client
            .database(&database.database_name)
            .collection::<OtpDocument>(COLLECTION_NAME);

        let ttl_index = IndexModel::builder()
            .keys(doc! { "createdAt": 1 })
            .options(
                IndexOptions::builder()
                    .expire_after(Duration::from_secs(OTP_EXPIRATION_SECONDS))
                    .build(),
            )
            .build();

        collection.create_index(ttl_index).await?;

        Ok(Self {
            client: database.client,
            collection,
        })
    }
}

#[async_trait]
impl OtpStore for MongoOtpStore {
    async fn create(&self, email: &str, otp: &str) -> Result<(), StoreError> {
        let document = OtpDocument {
            email: email.to_string(),
            one_time_password: otp.to_string(),
            created_at: bson::DateTime::now(),
        };

        self.collection.insert_one(document).await?;

        Ok(())
    }

    async fn find_match(&self, email: &str, otp: &str) -> Result<Option<OtpRecord>, StoreError> {
        let document = self
            .collection
            .find_one(live_match_filter(email, otp, bson::DateTime::now()))
            .await?;

        Ok(document.map(OtpRecord::from))
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        log::info!("MongoDB client shut down");
    }
}
