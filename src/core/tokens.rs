use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Credentials for a single transaction.
///
/// `Tokens` is a value: refreshing produces a new instance and leaves the old
/// one untouched. Persist whichever instance you intend to reuse.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub transaction_id: i64,
    /// Short-lived bearer credential. Empty when unset.
    pub access_token: String,
    /// Long-lived credential used only to mint new access tokens.
    pub refresh_token: String,
    /// Intended for the front-end SDKs; never sent by this library.
    pub client_token: String,
    pub expiry: Option<DateTime<Utc>>,
}

impl Tokens {
    /// Re-attach to an existing transaction from its refresh token alone.
    ///
    /// The result is always stale, so the first authenticated call will
    /// exchange it for a full set of tokens.
    pub fn from_refresh(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            ..Default::default()
        }
    }

    /// Whether the access token must be refreshed before use.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(Utc::now())
    }

    /// Same as [Tokens::needs_refresh], evaluated at `now`.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            _ if self.access_token.is_empty() => true,
            None => true,
            Some(expiry) => expiry <= now,
        }
    }

    pub(crate) fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let TokenResponse {
            transaction_id,
            refresh_token,
            access_token,
            client_token,
            expires_in,
        } = response;
        Self {
            transaction_id,
            access_token,
            refresh_token,
            client_token,
            // Out-of-range lifetimes leave the expiry unset, which reads as stale.
            expiry: Duration::try_seconds(expires_in)
                .and_then(|ttl| now.checked_add_signed(ttl)),
        }
    }
}

impl fmt::Debug for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(token: &str) -> &'static str {
            if token.is_empty() {
                ""
            } else {
                "<redacted>"
            }
        }

        f.debug_struct("Tokens")
            .field("transaction_id", &self.transaction_id)
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("client_token", &redact(&self.client_token))
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Body returned by both transaction creation and the token exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub transaction_id: i64,
    pub refresh_token: String,
    pub access_token: String,
    pub client_token: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
}

/// Payload for `POST v0/tokens`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
    pub grant_type: &'static str,
}

impl<'a> RefreshRequest<'a> {
    pub fn new(tokens: &'a Tokens) -> Self {
        Self {
            refresh_token: &tokens.refresh_token,
            grant_type: "refresh_token",
        }
    }
}
