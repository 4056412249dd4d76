//! This library provides a Rust client for the [Berbix] identity verification API.
//!
//! [Berbix]: <https://docs.berbix.com>
//!
//! # Usage
//!
//! ```ignore
//! use berbix::{Client, CreateTransactionOptions, Tokens};
//!
//! let client = Client::new(api_secret)?;
//!
//! // Create a transaction and hand `client_token` to the front-end SDK.
//! let tokens = client
//!     .create_transaction(&CreateTransactionOptions::new("customer-123", "tpk_..."))
//!     .await?;
//!
//! // Later, re-attach to the transaction from its stored refresh token.
//! let tokens = Tokens::from_refresh(stored_refresh_token);
//! let metadata = client.fetch_transaction(&tokens).await?;
//! ```
//!
//! # Tokens
//!
//! Each transaction is identified by a set of [Tokens]. The access token is
//! short-lived and is refreshed on demand before any transaction-scoped call.
//! [Tokens] are plain values: a refresh returns new tokens and never mutates
//! the ones passed in. Use [Client::ensure_fresh] to obtain the refreshed
//! tokens yourself, or share a [TokenStore] between tasks so that only one
//! refresh is ever in flight.
//!
//! [TokenStore]: crate::client::session::TokenStore
//!
//! # Evidence uploads
//!
//! Transactions created with [Client::create_api_only_transaction] receive
//! their images through [Client::upload_images]. The result distinguishes
//! accepted uploads, accepted-but-unprocessable uploads, and the error
//! variants described in [core::response](crate::core::response).
//!
//! # Webhooks
//!
//! Verify every webhook delivery with [webhook::verify_signature] before
//! acting on its body.
//!
//! # Transport
//!
//! Requests go through an [AsyncHttpClient]. [ReqwestClient] is used unless
//! another implementation is supplied with [ClientBuilder::with_http_client].
//! No request is ever retried by this library.
//!
//! [AsyncHttpClient]: crate::core::util::AsyncHttpClient
//! [ReqwestClient]: crate::core::util::ReqwestClient

pub mod client;
pub mod config;
pub mod core;
pub mod utils;
pub mod webhook;

pub use client::{session::TokenStore, Client, ClientBuilder};
pub use config::{BaseUrl, Config};
pub use crate::core::{
    error::{Error, Result},
    image::{
        ImageFormat, ImageSubject, ImageUploadResponse, ImageUploadResult, Issue, NextStep,
        RawImage, UploadImagesOptions,
    },
    tokens::Tokens,
    transaction::{
        ApiOnlyOptions, CreateApiOnlyTransactionOptions, CreateApiOnlyTransactionResponse,
        CreateHostedTransactionOptions, CreateHostedTransactionResponse,
        CreateTransactionOptions, HostedOptions, OverrideTransactionOptions,
        TransactionMetadata, UpdateTransactionOptions,
    },
};
pub use webhook::SignatureError;
