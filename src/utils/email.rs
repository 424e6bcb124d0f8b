use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;
use std::str::FromStr;
use thiserror::Error;

pub const OTP_SUBJECT: &str = "One Time Password (OTP)";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("Failed to create SMTP transport: {0}")]
    Transport(String),

    #[error("Failed to send email: {0}")]
    Send(#[from] lettre::transport::smtp::Error),
}

/// Delivers OTP codes to an inbox
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, to_email: &str, otp_code: &str) -> Result<(), MailError>;
}

/// How the connection to the relay is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Implicit TLS (SMTPS), usually port 465
    Tls,
    /// Plain connection upgraded with STARTTLS, usually port 587
    StartTls,
    /// No encryption at all, only for local relays
    None,
}

impl FromStr for SmtpSecurity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" | "ssl" | "smtps" => Ok(SmtpSecurity::Tls),
            "starttls" => Ok(SmtpSecurity::StartTls),
            "none" | "plain" => Ok(SmtpSecurity::None),
            other => Err(format!("Unknown SMTP_SECURITY mode: {}", other)),
        }
    }
}

/// SMTP relay configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub security: SmtpSecurity,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: Option<String>,
}

impl EmailConfig {
    /// Load email configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let smtp_username = env::var("SMTP_USERNAME").map_err(|_| "SMTP_USERNAME is required")?;

        Ok(Self {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "465".to_string())
                .parse()
                .map_err(|_| "SMTP_PORT must be a valid number")?,
            security: env::var("SMTP_SECURITY")
                .unwrap_or_else(|_| "tls".to_string())
                .parse()?,
            smtp_password: env::var("SMTP_PASSWORD").map_err(|_| "SMTP_PASSWORD is required")?,
            from_email: env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| smtp_username.clone()),
            from_name: env::var("SMTP_FROM_NAME").ok(),
            smtp_username,
        })
    }

    fn sender(&self) -> Result<Mailbox, MailError> {
        Ok(Mailbox::new(self.from_name.clone(), self.from_email.parse()?))
    }
}

/// Build the plaintext OTP message
pub fn build_otp_message(from: Mailbox, to_email: &str, otp_code: &str) -> Result<Message, MailError> {
    let email = Message::builder()
        .from(from)
        .to(to_email.parse()?)
        .subject(OTP_SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(format!("Your OTP is: {}", otp_code))?;

    Ok(email)
}

/// Email service backed by a pooled SMTP transport, built once and shared
pub struct EmailService {
    sender: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self, MailError> {
        let sender = config.sender()?;
        let transport = Self::build_transport(&config)?;

        Ok(Self { sender, transport })
    }

    fn build_transport(
        config: &EmailConfig,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let builder = match config.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| MailError::Transport(e.to_string()))?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                    .map_err(|e| MailError::Transport(e.to_string()))?
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            }
        };

        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        Ok(builder.credentials(creds).port(config.smtp_port).build())
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send_otp(&self, to_email: &str, otp_code: &str) -> Result<(), MailError> {
        let email = build_otp_message(self.sender.clone(), to_email, otp_code)?;

        self.transport.send(email).await?;

        Ok(())
    }
}
