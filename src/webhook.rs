//! Webhook signature verification.
//!
//! Every webhook delivery carries a header of the form
//! `<version>,<unix-timestamp>,<hex-digest>` where the digest is
//! `HMAC-SHA256(secret, "<timestamp>,<secret>,<body>")`. Deliveries older than
//! [CLOCK_DRIFT_SECONDS] are rejected to limit replay. Timestamps in the
//! future are accepted.
//!
//! ```ignore
//! use berbix::webhook::verify_signature;
//!
//! verify_signature(&webhook_secret, &request_body, header_value)?;
//! // Only now parse and act on the body.
//! ```

use std::num::ParseIntError;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

/// How old a delivery may be, in seconds.
pub const CLOCK_DRIFT_SECONDS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("incorrect number of parts in signature header (expected 3, found {0})")]
    MalformedHeader(usize),

    #[error("invalid timestamp in signature header: {0}")]
    InvalidTimestamp(#[from] ParseIntError),

    #[error("webhook timestamp {timestamp} is outside of the allowed drift (now: {now})")]
    Expired { timestamp: i64, now: i64 },

    #[error("signature does not match")]
    Mismatch,
}

/// Components of a signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader<'a> {
    pub version: &'a str,
    pub timestamp: i64,
    pub signature: &'a str,
}

impl<'a> SignatureHeader<'a> {
    pub fn parse(header: &'a str) -> Result<Self, SignatureError> {
        let parts: Vec<&str> = header.split(',').collect();
        let [version, timestamp, signature] = parts[..] else {
            return Err(SignatureError::MalformedHeader(parts.len()));
        };
        Ok(Self {
            version,
            timestamp: timestamp.parse()?,
            signature,
        })
    }
}

/// Verify that `body` was sent by the backend.
///
/// `secret` is the webhook secret configured in the dashboard, not the API
/// secret. `body` must be the raw request body, byte for byte.
pub fn verify_signature(secret: &str, body: &[u8], header: &str) -> Result<(), SignatureError> {
    verify_signature_at(secret, body, header, Utc::now().timestamp())
}

/// Same as [verify_signature], with `now` as Unix seconds.
pub fn verify_signature_at(
    secret: &str,
    body: &[u8],
    header: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let parsed = match SignatureHeader::parse(header) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("rejecting webhook: {e}");
            return Err(e);
        }
    };

    if parsed.timestamp < now - CLOCK_DRIFT_SECONDS {
        warn!(timestamp = parsed.timestamp, now, "rejecting webhook outside of drift range");
        return Err(SignatureError::Expired {
            timestamp: parsed.timestamp,
            now,
        });
    }

    let expected = compute_signature(secret, parsed.timestamp, body);
    if !constant_time_eq(expected.as_bytes(), parsed.signature.as_bytes()) {
        warn!("rejecting webhook with mismatched signature");
        return Err(SignatureError::Mismatch);
    }

    Ok(())
}

/// Lowercase hex `HMAC-SHA256(secret, "<timestamp>,<secret>,<body>")`.
pub fn compute_signature(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b",");
    mac.update(secret.as_bytes());
    mac.update(b",");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}
