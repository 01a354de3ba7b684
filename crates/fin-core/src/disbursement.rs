//! # Disbursements
//!
//! A [`Disbursement`] records an approved request being paid out. The proof
//! of payment depends on the channel: electronic payments carry a bank
//! transaction reference, cash payments carry the receiver's name and a
//! captured [`SignatureImage`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::identity::{DisbursementId, RequestId};
use crate::money::Amount;
use crate::request::PaymentMethod;

/// Upper bound on the encoded signature, data URL prefix included.
pub const MAX_SIGNATURE_BYTES: usize = 512 * 1024;

const SIGNATURE_PREFIXES: [&str; 2] = ["data:image/png;base64,", "data:image/jpeg;base64,"];

/// A hand-drawn signature captured as an image data URL
/// (`data:image/png;base64,...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SignatureImage(String);

impl SignatureImage {
    /// Validate and wrap a data URL.
    ///
    /// The payload must be canonical padded base64: length a multiple of 4,
    /// alphabet `A-Z a-z 0-9 + /`, and at most two trailing `=`.
    pub fn parse(data_url: impl Into<String>) -> Result<Self, ValidationError> {
        let data_url = data_url.into();
        if data_url.len() > MAX_SIGNATURE_BYTES {
            return Err(ValidationError::InvalidSignature(format!(
                "exceeds {MAX_SIGNATURE_BYTES} bytes"
            )));
        }
        let payload = SIGNATURE_PREFIXES
            .iter()
            .find_map(|p| data_url.strip_prefix(p))
            .ok_or_else(|| {
                ValidationError::InvalidSignature(
                    "expected a data:image/png or data:image/jpeg base64 URL".into(),
                )
            })?;
        check_base64(payload)?;
        Ok(Self(data_url))
    }

    /// The full data URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type of the image (`image/png` or `image/jpeg`).
    pub fn mime_type(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime)
            .unwrap_or("application/octet-stream")
    }
}

impl<'de> Deserialize<'de> for SignatureImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}

fn check_base64(payload: &str) -> Result<(), ValidationError> {
    let bad = |why: &str| ValidationError::InvalidSignature(why.to_string());
    if payload.is_empty() {
        return Err(bad("empty image payload"));
    }
    if payload.len() % 4 != 0 {
        return Err(bad("base64 payload length is not a multiple of 4"));
    }
    let body = payload.trim_end_matches('=');
    if payload.len() - body.len() > 2 {
        return Err(bad("too much base64 padding"));
    }
    if !body
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
    {
        return Err(bad("payload is not base64"));
    }
    Ok(())
}

/// Channel-specific proof that a payment happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisbursementProof {
    /// Bank transfer or POS payment.
    Electronic {
        /// Bank the funds were sent to.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bank_name: Option<String>,
        /// Destination account number.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account_number: Option<String>,
        /// Reference issued by the bank or terminal.
        transaction_ref: String,
    },
    /// Cash handed over in person.
    Cash {
        /// Person who physically received the cash.
        receiver_name: String,
        /// Receiver's captured signature.
        signature: SignatureImage,
    },
}

impl DisbursementProof {
    /// True for cash proof.
    pub fn is_cash(&self) -> bool {
        matches!(self, Self::Cash { .. })
    }
}

/// A completed payout against an approved request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Disbursement {
    /// Disbursement identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: DisbursementId,
    /// Request that was paid.
    #[schema(value_type = String, format = Uuid)]
    pub request_id: RequestId,
    /// Channel used.
    pub method: PaymentMethod,
    /// Amount paid, always equal to the request amount.
    #[schema(value_type = String, example = "15000.00")]
    pub amount: Amount,
    /// Operator who made the payment.
    pub processed_by: String,
    /// When the payment was recorded.
    pub processed_at: DateTime<Utc>,
    /// Proof of payment.
    pub proof: DisbursementProof,
    /// Optional link to a receipt or screenshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn accepts_png_and_jpeg_data_urls() {
        let sig = SignatureImage::parse(PNG).unwrap();
        assert_eq!(sig.mime_type(), "image/png");
        let jpeg = SignatureImage::parse("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(jpeg.mime_type(), "image/jpeg");
    }

    #[test]
    fn rejects_other_payloads() {
        for bad in [
            "",
            "data:image/png;base64,",
            "data:image/gif;base64,R0lGODlh",
            "data:image/png;base64,abc",
            "data:image/png;base64,ab!d",
            "data:image/png;base64,a===",
            "https://example.com/sig.png",
        ] {
            assert!(SignatureImage::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_oversized_signature() {
        let big = format!(
            "data:image/png;base64,{}",
            "A".repeat(MAX_SIGNATURE_BYTES)
        );
        assert!(SignatureImage::parse(big).is_err());
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<SignatureImage>("\"data:text/plain;base64,QQ==\"").is_err());
        let ok: SignatureImage = serde_json::from_str(&format!("\"{PNG}\"")).unwrap();
        assert_eq!(ok.as_str(), PNG);
    }

    #[test]
    fn proof_is_tagged_by_kind() {
        let proof = DisbursementProof::Electronic {
            bank_name: Some("Zenith".into()),
            account_number: None,
            transaction_ref: "TRX-1".into(),
        };
        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json["kind"], "electronic");
        assert_eq!(json["transaction_ref"], "TRX-1");
        assert!(json.get("account_number").is_none());
        assert!(!proof.is_cash());

        let cash: DisbursementProof = serde_json::from_value(serde_json::json!({
            "kind": "cash",
            "receiver_name": "Ada",
            "signature": PNG,
        }))
        .unwrap();
        assert!(cash.is_cash());
    }
}
