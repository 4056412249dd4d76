use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::NonEmptyVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSubject {
    #[serde(rename = "document_front")]
    DocumentFront,
    #[serde(rename = "document_back")]
    DocumentBack,
    #[serde(rename = "document_barcode")]
    DocumentBarcode,
    #[serde(rename = "selfie_front")]
    SelfieFront,
    #[serde(rename = "selfie_left")]
    SelfieLeft,
    #[serde(rename = "selfie_right")]
    SelfieRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

/// What the backend expects to receive next for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    UploadDocumentFront,
    UploadDocumentBack,
    UploadSelfieBasic,
    UploadSelfieLiveness,
    /// No more uploads are expected.
    Done,
    #[serde(other)]
    Unknown,
}

/// Problems detected in an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Issue {
    BadUpload,
    TextUnreadable,
    NoFaceOnIdDetected,
    IncompleteBarcodeDetected,
    UnsupportedIdType,
    BadSelfie,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDetails {
    /// Why the photo of the ID could not be accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsupported_id_type: Option<UnsupportedIdTypeDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedIdTypeDetails {
    /// The visa page of a passport was uploaded rather than the ID page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visa_page_of_passport: Option<bool>,
}

/// Image bytes as supplied by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct RawImage {
    pub image: Vec<u8>,
    pub subject: ImageSubject,
    pub format: ImageFormat,
}

impl std::fmt::Debug for RawImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawImage")
            .field("image", &format_args!("<{} bytes>", self.image.len()))
            .field("subject", &self.subject)
            .field("format", &self.format)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadImagesOptions {
    pub images: NonEmptyVec<RawImage>,
}

impl UploadImagesOptions {
    pub fn new(image: RawImage) -> Self {
        Self {
            images: NonEmptyVec::new(image),
        }
    }

    pub fn with_image(mut self, image: RawImage) -> Self {
        self.images.push(image);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ImageData {
    pub image_subject: ImageSubject,
    pub format: ImageFormat,
    /// Base64 (standard alphabet) encoded image bytes.
    pub data: String,
}

/// Body of `POST v0/images/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ImageUploadRequest {
    pub images: Vec<ImageData>,
}

impl From<&UploadImagesOptions> for ImageUploadRequest {
    fn from(options: &UploadImagesOptions) -> Self {
        let images = options
            .images
            .iter()
            .map(|raw| ImageData {
                image_subject: raw.subject,
                format: raw.format,
                data: BASE64_STANDARD.encode(&raw.image),
            })
            .collect();
        Self { images }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    #[serde(default)]
    pub issues: Vec<Issue>,
    /// Not every issue has details.
    #[serde(default)]
    pub issue_details: IssueDetails,
    pub next_step: NextStep,
}

/// Outcome of an upload that the backend accepted for processing.
///
/// Inspect `response.next_step` to decide what to upload next, and
/// `response.issues` for legibility problems found immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUploadResult {
    pub response: ImageUploadResponse,
    /// `false` when the backend flagged the image as unprocessable, e.g. the
    /// wrong document type was uploaded.
    pub acceptable: bool,
}
