use std::sync::Arc;

use crate::database::OtpStore;
use crate::utils::email::Mailer;
use crate::utils::error::CustomError;
use crate::utils::helpers::generate_otp_code;

pub const MSG_EMAIL_REQUIRED: &str = "Email address is required";
pub const MSG_SEND_FAILED: &str = "Failed to send OTP";
pub const MSG_SAVE_FAILED: &str = "Failed to save OTP to database";
pub const MSG_FIELDS_REQUIRED: &str = "Email and OTP are required";
pub const MSG_INVALID_OTP: &str = "Invalid email or OTP";
pub const MSG_STORE_FAILED: &str = "Internal Server Error";

/// Issues and checks OTPs. Holds the process-wide mail transport and store.
#[derive(Clone)]
pub struct OtpService {
    mailer: Arc<dyn Mailer>,
    store: Arc<dyn OtpStore>,
}

impl OtpService {
    pub fn new(mailer: Arc<dyn Mailer>, store: Arc<dyn OtpStore>) -> Self {
        OtpService { mailer, store }
    }

    /// Generate a code, mail it, then persist it. Returns the issued code.
    ///
    /// Nothing is stored when delivery fails. If storing fails after the mail
    /// went out, the recipient holds a code that can never verify; that case
    /// is reported as an error and logged, not rolled back.
    pub async fn generate(&self, email: &str) -> Result<String, CustomError> {
        // Mailed and stored under the same address
        let email = email.trim();
        if email.is_empty() {
            return Err(CustomError::ValidationError(MSG_EMAIL_REQUIRED.to_string()));
        }

        let otp_code = generate_otp_code();

        self.mailer.send_otp(email, &otp_code).await.map_err(|e| {
            log::error!("Failed to send OTP to {}: {}", email, e);
            CustomError::DeliveryError(MSG_SEND_FAILED.to_string())
        })?;

        log::info!("OTP sent successfully to {}", email);

        self.store.create(email, &otp_code).await.map_err(|e| {
            log::error!("OTP mailed to {} but could not be stored: {}", email, e);
            CustomError::PersistenceError(MSG_SAVE_FAILED.to_string())
        })?;

        Ok(otp_code)
    }

    /// Check a submitted code. The record is left in place on success.
    pub async fn verify(&self, email: &str, otp_code: &str) -> Result<(), CustomError> {
        let email = email.trim();
        if email.is_empty() || otp_code.is_empty() {
            return Err(CustomError::ValidationError(MSG_FIELDS_REQUIRED.to_string()));
        }

        let record = self.store.find_match(email, otp_code).await.map_err(|e| {
            log::error!("OTP lookup failed: {}", e);
            CustomError::PersistenceError(MSG_STORE_FAILED.to_string())
        })?;

        match record {
            Some(_) => Ok(()),
            None => Err(CustomError::BadRequestError(MSG_INVALID_OTP.to_string())),
        }
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}
