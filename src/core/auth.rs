//! Authorization header values.
//!
//! Account-level calls (transaction creation, token exchange) authenticate with
//! HTTP Basic using the API secret as the username and an empty password.
//! Transaction-scoped calls authenticate with the transaction's access token.

use base64::prelude::*;

/// `Basic <base64("<secret>:")>`
pub fn basic_auth_header(secret: &str) -> String {
    let encoded = BASE64_STANDARD.encode(format!("{secret}:"));
    format!("Basic {encoded}")
}

/// `Bearer <access_token>`
pub fn bearer_auth_header(access_token: &str) -> String {
    format!("Bearer {access_token}")
}
