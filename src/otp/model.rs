use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A one-time password issued to an email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRecord {
    pub email: String,
    pub one_time_password: String,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn new(email: &str, one_time_password: &str) -> Self {
        Self {
            email: email.to_string(),
            one_time_password: one_time_password.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Whether `ttl_seconds` have elapsed since creation
    pub fn is_expired(&self, ttl_seconds: u64, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.created_at).num_seconds() >= ttl_seconds as i64
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Accept `"4821"` and `4821` alike; codes are compared as strings
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;

    Ok(value.map(|value| match value {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Number(number) => number.to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct GenerateOtpRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub otp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateOtpResponse {
    pub message: String,
    pub success: bool,
}
