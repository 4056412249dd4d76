//! Building blocks shared by the [Client](crate::client::Client): credentials,
//! request and response types, and response classification.

pub mod auth;
pub mod error;
pub mod image;
pub mod response;
pub mod tokens;
pub mod transaction;
pub mod util;
