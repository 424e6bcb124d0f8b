//! In-process doubles for the mail and store adapters.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::database::{OtpStore, StoreError};
use crate::otp::model::OtpRecord;
use crate::utils::email::{MailError, Mailer};

/// Captures every message instead of talking to a relay
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_otp(&self, to_email: &str, otp_code: &str) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("relay unreachable".to_string()));
        }

        self.sent
            .lock()
            .unwrap()
            .push((to_email.to_string(), otp_code.to_string()));
        Ok(())
    }
}

/// Store whose every call fails
pub struct FailingStore;

#[async_trait]
impl OtpStore for FailingStore {
    async fn create(&self, _email: &str, _otp: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn find_match(&self, _email: &str, _otp: &str) -> Result<Option<OtpRecord>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
}
