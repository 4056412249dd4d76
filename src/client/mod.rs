use std::{fmt::Debug, sync::Arc};

use anyhow::{bail, Context as _};
use chrono::Utc;
use http::{header::AUTHORIZATION, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    config::{BaseUrl, Config},
    core::{
        auth::{basic_auth_header, bearer_auth_header},
        error::{Error, Result},
        image::{
            ImageFormat, ImageSubject, ImageUploadRequest, ImageUploadResult, RawImage,
            UploadImagesOptions,
        },
        response::{classify_upload, expect_empty, expect_json},
        tokens::{RefreshRequest, TokenResponse, Tokens},
        transaction::{
            CreateApiOnlyTransactionOptions, CreateApiOnlyTransactionResponse,
            CreateHostedTransactionOptions, CreateHostedTransactionResponse,
            CreateTransactionOptions, HostedTransactionResponse, OverrideTransactionOptions,
            TransactionMetadata, UpdateTransactionOptions,
        },
        util::{base_request, AsyncHttpClient, ReqwestClient},
    },
    webhook,
};

pub mod session;

const TRANSACTIONS: &str = "v0/transactions";
const TOKENS: &str = "v0/tokens";
const TRANSACTIONS_OVERRIDE: &str = "v0/transactions/override";
const IMAGES_UPLOAD: &str = "v0/images/upload";

/// A client for the verification API.
///
/// Account-level operations (creating transactions, exchanging refresh tokens)
/// authenticate with the API secret. Transaction-scoped operations take the
/// transaction's [Tokens] and authenticate with its access token, refreshing
/// it first when it is stale. A refresh done on behalf of a call is not
/// written back anywhere; use [Client::ensure_fresh] or
/// [TokenStore](session::TokenStore) to keep the refreshed tokens.
///
/// `Client` is cheap to clone and can be shared between tasks.
#[derive(Clone)]
pub struct Client {
    secret: Arc<str>,
    host: BaseUrl,
    http_client: Arc<dyn AsyncHttpClient + Send + Sync>,
}

impl Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("secret", &"<redacted>")
            .field("host", &self.host.as_str())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a new client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// A client for the production API using the default transport.
    pub fn new(secret: impl Into<String>) -> anyhow::Result<Self> {
        Self::builder().with_secret(secret).build()
    }

    pub fn host(&self) -> &BaseUrl {
        &self.host
    }

    /// Create a transaction for use with the front-end SDKs.
    pub async fn create_transaction(&self, options: &CreateTransactionOptions) -> Result<Tokens> {
        self.fetch_tokens(TRANSACTIONS, options).await
    }

    /// Create a transaction completed on the hosted flow at the returned URL.
    pub async fn create_hosted_transaction(
        &self,
        options: &CreateHostedTransactionOptions,
    ) -> Result<CreateHostedTransactionResponse> {
        let HostedTransactionResponse { tokens, hosted_url } =
            self.post_basic_auth(TRANSACTIONS, options).await?;
        Ok(CreateHostedTransactionResponse {
            tokens: Tokens::from_response(tokens, Utc::now()),
            hosted_url,
        })
    }

    /// Create a transaction whose evidence is uploaded through
    /// [Client::upload_images].
    pub async fn create_api_only_transaction(
        &self,
        options: &CreateApiOnlyTransactionOptions,
    ) -> Result<CreateApiOnlyTransactionResponse> {
        let tokens = self.fetch_tokens(TRANSACTIONS, options).await?;
        Ok(CreateApiOnlyTransactionResponse { tokens })
    }

    /// Exchange the refresh token for a new set of tokens.
    ///
    /// `tokens` is left untouched.
    pub async fn refresh_tokens(&self, tokens: &Tokens) -> Result<Tokens> {
        self.fetch_tokens(TOKENS, &RefreshRequest::new(tokens)).await
    }

    /// Return `tokens` if it can be used as is, otherwise the refreshed tokens.
    pub async fn ensure_fresh(&self, tokens: &Tokens) -> Result<Tokens> {
        if tokens.needs_refresh() {
            self.refresh_tokens(tokens).await
        } else {
            Ok(tokens.clone())
        }
    }

    pub async fn fetch_transaction(&self, tokens: &Tokens) -> Result<TransactionMetadata> {
        let response = self
            .token_auth_request(Method::GET, tokens, TRANSACTIONS, None)
            .await?;
        expect_json(response)
    }

    pub async fn update_transaction(
        &self,
        tokens: &Tokens,
        options: &UpdateTransactionOptions,
    ) -> Result<TransactionMetadata> {
        let response = self
            .token_auth_request(Method::PATCH, tokens, TRANSACTIONS, Some(encode(options)?))
            .await?;
        expect_json(response)
    }

    pub async fn delete_transaction(&self, tokens: &Tokens) -> Result<()> {
        let response = self
            .token_auth_request(Method::DELETE, tokens, TRANSACTIONS, None)
            .await?;
        expect_empty(response)
    }

    /// Force the outcome of a test-mode transaction.
    pub async fn override_transaction(
        &self,
        tokens: &Tokens,
        options: &OverrideTransactionOptions,
    ) -> Result<()> {
        let response = self
            .token_auth_request(
                Method::PATCH,
                tokens,
                TRANSACTIONS_OVERRIDE,
                Some(encode(options)?),
            )
            .await?;
        expect_empty(response)
    }

    /// Upload evidence for an API-only transaction.
    ///
    /// ## Returns
    /// The upload result when the backend took the images, including images it
    /// flagged as unprocessable (`acceptable == false`). Uploads that are
    /// invalid for the transaction's current step, target a transaction that
    /// no longer exists, or are too large are returned as the matching
    /// [Error] variant.
    pub async fn upload_images(
        &self,
        tokens: &Tokens,
        options: &UploadImagesOptions,
    ) -> Result<ImageUploadResult> {
        let body = encode(&ImageUploadRequest::from(options))?;
        debug!(
            images = options.images.len(),
            encoded_bytes = body.len(),
            "uploading images"
        );
        let response = self
            .token_auth_request(Method::POST, tokens, IMAGES_UPLOAD, Some(body))
            .await?;
        classify_upload(response.status(), response.body())
    }

    /// Upload a single image. See [Client::upload_images].
    pub async fn upload_image(
        &self,
        tokens: &Tokens,
        image: Vec<u8>,
        subject: ImageSubject,
        format: ImageFormat,
    ) -> Result<ImageUploadResult> {
        let options = UploadImagesOptions::new(RawImage {
            image,
            subject,
            format,
        });
        self.upload_images(tokens, &options).await
    }

    /// Verify a webhook delivery. See [webhook::verify_signature].
    pub fn validate_signature(&self, secret: &str, body: &[u8], header: &str) -> Result<()> {
        webhook::verify_signature(secret, body, header).map_err(Error::from)
    }

    async fn fetch_tokens<P: Serialize + ?Sized>(&self, path: &str, payload: &P) -> Result<Tokens> {
        let response: TokenResponse = self.post_basic_auth(path, payload).await?;
        Ok(Tokens::from_response(response, Utc::now()))
    }

    async fn post_basic_auth<P, R>(&self, path: &str, payload: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .send(
                Method::POST,
                path,
                basic_auth_header(&self.secret),
                Some(encode(payload)?),
            )
            .await?;
        expect_json(response)
    }

    /// Perform a request authenticated as the transaction, refreshing the access
    /// token first if needed. The response is returned unclassified.
    async fn token_auth_request(
        &self,
        method: Method,
        tokens: &Tokens,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response<Vec<u8>>> {
        let refreshed;
        let tokens = if tokens.needs_refresh() {
            debug!(
                transaction_id = tokens.transaction_id,
                "access token is stale, refreshing"
            );
            refreshed = self.refresh_tokens(tokens).await?;
            &refreshed
        } else {
            tokens
        };

        self.send(method, path, bearer_auth_header(&tokens.access_token), body)
            .await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        authorization: String,
        body: Option<Vec<u8>>,
    ) -> Result<Response<Vec<u8>>> {
        let url = self.host.endpoint(path)?;
        let request = base_request()
            .method(method.clone())
            .uri(url.as_str())
            .header(AUTHORIZATION, authorization)
            .body(body.unwrap_or_default())?;

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(Error::Transport)?;

        debug!(%method, path, status = %response.status(), "received response");
        Ok(response)
    }
}

fn encode<P: Serialize + ?Sized>(payload: &P) -> Result<Vec<u8>> {
    serde_json::to_vec(payload).map_err(Error::Encode)
}

/// Builder struct for [Client].
#[derive(Clone, Default)]
pub struct ClientBuilder {
    secret: Option<String>,
    host: Option<BaseUrl>,
    http_client: Option<Arc<dyn AsyncHttpClient + Send + Sync>>,
}

impl ClientBuilder {
    /// Build the client.
    pub fn build(self) -> anyhow::Result<Client> {
        let Self {
            secret,
            host,
            http_client,
        } = self;

        let Some(secret) = secret else {
            bail!("secret is required, see `with_secret`")
        };

        if secret.is_empty() {
            bail!("secret must not be empty")
        }

        let http_client = match http_client {
            Some(http_client) => http_client,
            None => Arc::new(ReqwestClient::new().context("unable to build default http client")?),
        };

        Ok(Client {
            secret: secret.into(),
            host: host.unwrap_or_default(),
            http_client,
        })
    }

    /// Set the API secret used for account-level calls.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Point the client at another API host, e.g. a sandbox.
    pub fn with_host(mut self, host: BaseUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Set the [AsyncHttpClient] used to reach the API. Defaults to
    /// [ReqwestClient].
    pub fn with_http_client(mut self, http_client: Arc<dyn AsyncHttpClient + Send + Sync>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Take the secret and host from a [Config].
    pub fn with_config(mut self, config: Config) -> Self {
        let Config { secret, host } = config;
        self.secret = Some(secret);
        self.host = host.or(self.host);
        self
    }
}
