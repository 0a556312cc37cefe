//! Request signing for the Freedcamp API.
//!
//! Every authenticated call carries `api_key`, `timestamp` and `hash` query
//! parameters, where `hash` is the lowercase hex HMAC-SHA1 of
//! `api_key + timestamp` keyed by the API secret. The timestamp is Unix
//! seconds, so a signature is only valid around the moment it was made and is
//! recomputed for every request.

use std::fmt;

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{ApiError, Result};

type HmacSha1 = Hmac<Sha1>;

/// API key and secret. `Debug` never prints either value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// A timestamp/hash pair authenticating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub timestamp: String,
    pub hash: String,
}

/// Sign `api_key + timestamp` with the API secret.
pub fn sign(credentials: &Credentials, timestamp: i64) -> Result<Signature> {
    let timestamp = timestamp.to_string();
    let message = format!("{}{timestamp}", credentials.api_key);
    let hash = hmac_sha1_hex(&credentials.api_secret, &message)?;
    Ok(Signature { timestamp, hash })
}

fn hmac_sha1_hex(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::Config(format!("invalid signing key: {e}")))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Source of wall-clock time, in whole Unix seconds.
pub trait Clock {
    fn unix_timestamp(&self) -> i64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
