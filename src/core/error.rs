use http::StatusCode;

use super::image::NextStep;
use crate::webhook::SignatureError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport failed before a response was received.
    #[error("http request failed: {0:#}")]
    Transport(#[source] anyhow::Error),

    #[error("unable to construct request: {0}")]
    Request(#[from] http::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unable to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("unable to decode response body (status: {status}): {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    /// The backend answered outside of 2XX.
    #[error("non-2XX response from backend (status: {status}): {message}")]
    Status { status: StatusCode, message: String },

    /// A response body was required but the backend sent 204.
    #[error("received a 204 response but a response body was expected")]
    NoContent,

    /// The upload is not valid for the transaction's current step.
    #[error(
        "invalid API interaction for the current state of the transaction \
         (next expected step: {next_step:?}): {message}"
    )]
    InvalidState {
        next_step: Option<NextStep>,
        message: String,
    },

    /// The transaction expired or was deleted.
    #[error("transaction does not exist: {message}")]
    TransactionDoesNotExist { message: String },

    /// The request or one of its images exceeded the size limits.
    #[error("payload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl Error {
    /// The HTTP status the error was derived from, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Decode { status, .. } | Error::Status { status, .. } => Some(*status),
            Error::NoContent => Some(StatusCode::NO_CONTENT),
            Error::InvalidState { .. } => Some(StatusCode::CONFLICT),
            Error::TransactionDoesNotExist { .. } => Some(StatusCode::GONE),
            Error::PayloadTooLarge { .. } => Some(StatusCode::PAYLOAD_TOO_LARGE),
            Error::Transport(_)
            | Error::Request(_)
            | Error::Url(_)
            | Error::Encode(_)
            | Error::Signature(_) => None,
        }
    }
}
