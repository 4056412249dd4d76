//! Interpreting backend responses.
//!
//! CRUD-style endpoints only distinguish success from failure. The image upload
//! endpoint encodes business outcomes in its status codes:
//!
//! | status | outcome                                                 |
//! |--------|---------------------------------------------------------|
//! | 200    | accepted                                                |
//! | 422    | accepted, but flagged as unprocessable                  |
//! | 409    | [Error::InvalidState], the transaction expects another step |
//! | 410    | [Error::TransactionDoesNotExist]                        |
//! | 413    | [Error::PayloadTooLarge]                                |
//! | other  | [Error::Status]                                         |

use http::{Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use super::{
    error::{Error, Result},
    image::{ImageUploadResponse, ImageUploadResult, NextStep},
};

pub const DEFAULT_DOES_NOT_EXIST_MESSAGE: &str = "transaction does not exist";
pub const DEFAULT_PAYLOAD_TOO_LARGE_MESSAGE: &str = "payload too large";
pub const DEFAULT_INVALID_STATE_MESSAGE: &str =
    "invalid upload for the current state of the transaction";

/// Error body shared by most non-2XX responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenericErrorResponse {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub readable: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body of a 409 from the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvalidUploadForStateResponse {
    pub next_step: NextStep,
    #[serde(default)]
    pub message: String,
}

/// Decode a 2XX response body into `T`.
pub fn expect_json<T: DeserializeOwned>(response: Response<Vec<u8>>) -> Result<T> {
    let status = response.status();
    ensure_success(status, response.body())?;
    if status == StatusCode::NO_CONTENT {
        return Err(Error::NoContent);
    }
    serde_json::from_slice(response.body()).map_err(|source| Error::Decode { status, source })
}

/// Accept any 2XX response and discard its body.
pub fn expect_empty(response: Response<Vec<u8>>) -> Result<()> {
    ensure_success(response.status(), response.body())
}

/// Classify a response from the image upload endpoint.
pub fn classify_upload(status: StatusCode, body: &[u8]) -> Result<ImageUploadResult> {
    let acceptable = match status {
        StatusCode::NO_CONTENT => return Err(Error::NoContent),
        StatusCode::UNPROCESSABLE_ENTITY => false,
        s if s.is_success() => true,
        StatusCode::CONFLICT => {
            debug!("upload rejected for transaction state");
            return Err(match serde_json::from_slice::<InvalidUploadForStateResponse>(body) {
                Ok(InvalidUploadForStateResponse { next_step, message }) => Error::InvalidState {
                    next_step: Some(next_step),
                    message,
                },
                Err(_) => Error::InvalidState {
                    next_step: None,
                    message: DEFAULT_INVALID_STATE_MESSAGE.to_owned(),
                },
            });
        }
        StatusCode::GONE => {
            return Err(Error::TransactionDoesNotExist {
                message: error_message(body)
                    .unwrap_or_else(|| DEFAULT_DOES_NOT_EXIST_MESSAGE.into()),
            })
        }
        StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(Error::PayloadTooLarge {
                message: error_message(body)
                    .unwrap_or_else(|| DEFAULT_PAYLOAD_TOO_LARGE_MESSAGE.into()),
            })
        }
        _ => return Err(status_error(status, body)),
    };

    debug!(%status, acceptable, "upload accepted");
    let response: ImageUploadResponse =
        serde_json::from_slice(body).map_err(|source| Error::Decode { status, source })?;
    Ok(ImageUploadResult {
        response,
        acceptable,
    })
}

fn ensure_success(status: StatusCode, body: &[u8]) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(status_error(status, body))
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> Error {
    Error::Status {
        status,
        message: error_message(body)
            .unwrap_or_else(|| format!("unexpected status {}", status.as_u16())),
    }
}

/// Best-effort extraction of a human readable message from an error body.
fn error_message(body: &[u8]) -> Option<String> {
    let GenericErrorResponse {
        readable, message, ..
    } = serde_json::from_slice(body).ok()?;
    message.or(readable).filter(|m| !m.is_empty())
}
