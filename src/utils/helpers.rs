use rand::Rng;

/// Seconds an OTP record lives before the store drops it
pub const OTP_EXPIRATION_SECONDS: u64 = 300;

/// Generate a 4-digit OTP code in the range 1000..=9999
pub fn generate_otp_code() -> String {
    let mut rng = rand::rng();
    let code: u32 = rng.random_range(1000..=9999);
    code.to_string()
}
