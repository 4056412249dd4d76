use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tokens::{TokenResponse, Tokens};

/// Parameters for `POST v0/transactions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransactionOptions {
    /// The user's unique identifier in your systems.
    pub customer_uid: String,
    /// Selects the verification template configured in the dashboard.
    pub template_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consents_to_automated_facial_recognition: Option<bool>,
}

impl CreateTransactionOptions {
    pub fn new(customer_uid: impl Into<String>, template_key: impl Into<String>) -> Self {
        Self {
            customer_uid: customer_uid.into(),
            template_key: template_key.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateHostedTransactionOptions {
    #[serde(flatten)]
    pub transaction: CreateTransactionOptions,
    pub hosted_options: HostedOptions,
}

/// Document hints for transactions driven entirely through the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiOnlyOptions {
    /// Document type code, e.g. `P` for passport or `DL` for driver's license.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    /// ISO 3166-1 alpha-2 country of issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateApiOnlyTransactionOptions {
    #[serde(flatten)]
    pub transaction: CreateTransactionOptions,
    pub api_only_options: ApiOnlyOptions,
}

/// A hosted-flow creation response is a token response plus the URL to send
/// the end user to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct HostedTransactionResponse {
    #[serde(flatten)]
    pub tokens: TokenResponse,
    pub hosted_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateHostedTransactionResponse {
    pub tokens: Tokens,
    pub hosted_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApiOnlyTransactionResponse {
    pub tokens: Tokens,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTransactionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Force the outcome of a transaction. Only honored in test mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideTransactionOptions {
    pub response_payload: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub override_fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateInfo {
    pub customer_uid: String,
    pub transaction_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionImages {
    /// Present for front, selfie and liveness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_image: Option<String>,
    /// Present for front and back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cropped_image: Option<String>,
    /// Present for front, selfie and liveness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionImageSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<TransactionImages>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<TransactionImages>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selfie: Option<TransactionImages>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness: Option<TransactionImages>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSource {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub confidence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionField {
    /// The highest confidence value across all sources.
    pub value: String,
    pub confidence: String,
    #[serde(default)]
    pub sources: Vec<TransactionSource>,
}

/// Extracted data fields. Each is absent when the flow did not collect it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionFieldSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_expiry_date: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_issue_date: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_type: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_issuer: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_street: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_city: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_subdivision: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_postal_code: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_country: Option<TransactionField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_unit: Option<TransactionField>,
}

/// Returned by fetch and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMetadata {
    pub entity: String,
    pub id: i64,
    #[serde(default)]
    pub flags: Vec<String>,
    /// The action configured in the dashboard for the verification state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<TransactionFieldSet>,
    /// Short-lived URLs of images collected from the end user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<TransactionImageSet>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub customer_uid: String,
    /// Other transactions presenting the same photo ID.
    #[serde(default)]
    pub duplicates: Vec<DuplicateInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    /// Test mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_info: Option<String>,
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn hosted_options_flatten_transaction() {
        let options = CreateHostedTransactionOptions {
            transaction: CreateTransactionOptions::new("uid", "tpk_123"),
            hosted_options: HostedOptions {
                completion_email: Some("ops@example.com".into()),
                redirect_url: None,
            },
        };
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "customer_uid": "uid",
                "template_key": "tpk_123",
                "hosted_options": { "completion_email": "ops@example.com" }
            })
        );
    }

    #[test]
    fn api_only_options_wire_format() {
        let options = CreateApiOnlyTransactionOptions {
            transaction: CreateTransactionOptions {
                consents_to_automated_facial_recognition: Some(true),
                ..CreateTransactionOptions::new("uid", "tpk_123")
            },
            api_only_options: ApiOnlyOptions {
                id_type: Some("P".into()),
                id_country: Some("CA".into()),
            },
        };
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "customer_uid": "uid",
                "template_key": "tpk_123",
                "consents_to_automated_facial_recognition": true,
                "api_only_options": { "id_type": "P", "id_country": "CA" }
            })
        );
    }

    #[test]
    fn hosted_response_composes_token_response() {
        let response: HostedTransactionResponse = serde_json::from_value(json!({
            "transaction_id": 7,
            "refresh_token": "r",
            "access_token": "a",
            "client_token": "c",
            "expires_in": 60,
            "hosted_url": "https://verify.example.com/abc"
        }))
        .unwrap();
        assert_eq!(response.tokens.transaction_id, 7);
        assert_eq!(response.hosted_url, "https://verify.example.com/abc");
    }

    #[test]
    fn metadata_tolerates_sparse_body() {
        let metadata: TransactionMetadata = serde_json::from_value(json!({
            "entity": "transaction_metadata",
            "id": 123,
            "created_at": "2023-01-02T03:04:05Z",
            "fields": {
                "given_name": {
                    "value": "Ada",
                    "confidence": "high",
                    "sources": [{ "value": "Ada", "type": "document_ocr", "confidence": "high" }]
                }
            }
        }))
        .unwrap();
        assert_eq!(metadata.id, 123);
        assert!(metadata.flags.is_empty());
        let given_name = metadata.fields.unwrap().given_name.unwrap();
        assert_eq!(given_name.sources[0].kind, "document_ocr");
    }
}
