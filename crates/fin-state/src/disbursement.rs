//! # Disbursement Rules
//!
//! Turns an operator's payout form ([`DisbursementDraft`]) into validated
//! [`DisbursementProof`] for an approved request. Method and amount always
//! come from the request; the draft may only confirm them.
//!
//! - `CASH`: a signature is mandatory. The receiver defaults to the
//!   requester when left blank.
//! - `BANK_TRANSFER` / `POS`: a transaction reference is mandatory. Bank
//!   name and account number default to the details on the request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fin_core::{
    Amount, Disbursement, DisbursementId, DisbursementProof, PaymentMethod, PaymentRequest,
    RequestStatus, SignatureImage, ValidationError,
};

/// Errors raised while validating a payout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisbursementError {
    /// Only approved requests can be paid.
    #[error("request is {status}, only APPROVED requests can be disbursed")]
    NotApproved {
        /// The request's current status.
        status: RequestStatus,
    },

    /// The confirmed amount differs from the request amount.
    #[error("amount {given} does not match the approved amount {expected}")]
    AmountMismatch {
        /// Approved request amount.
        expected: Amount,
        /// Amount supplied with the payout.
        given: Amount,
    },

    /// The confirmed method differs from the request method.
    #[error("method {given} does not match the requested method {expected}")]
    MethodMismatch {
        /// Method on the request.
        expected: PaymentMethod,
        /// Method supplied with the payout.
        given: PaymentMethod,
    },

    /// Cash payout without a signature.
    #[error("a receiver signature is required for cash payments")]
    MissingSignature,

    /// Cash payout with no receiver and no requester name to fall back on.
    #[error("a receiver name is required for cash payments")]
    MissingReceiver,

    /// Electronic payout without a reference.
    #[error("a transaction reference is required for {method} payments")]
    MissingTransactionRef {
        /// The electronic method.
        method: PaymentMethod,
    },

    /// The signature is not a usable image.
    #[error(transparent)]
    InvalidSignature(#[from] ValidationError),
}

/// Operator input for paying out a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementDraft {
    /// Optional confirmation of the request amount.
    #[serde(default)]
    pub amount: Option<Amount>,
    /// Optional confirmation of the request method.
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    /// Bank or terminal reference, for electronic methods.
    #[serde(default)]
    pub transaction_ref: Option<String>,
    /// Overrides the bank name on the request.
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Overrides the account number on the request.
    #[serde(default)]
    pub account_number: Option<String>,
    /// Person receiving cash; defaults to the requester.
    #[serde(default)]
    pub receiver_name: Option<String>,
    /// Signature data URL, for cash.
    #[serde(default)]
    pub signature: Option<String>,
    /// Link to a receipt or screenshot.
    #[serde(default)]
    pub evidence_url: Option<String>,
}

fn non_blank(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl DisbursementDraft {
    /// Check the draft against `request` and build the payment proof.
    pub fn validate(&self, request: &PaymentRequest) -> Result<DisbursementProof, DisbursementError> {
        if request.status != RequestStatus::Approved {
            return Err(DisbursementError::NotApproved {
                status: request.status,
            });
        }
        if let Some(given) = self.amount {
            if given != request.amount {
                return Err(DisbursementError::AmountMismatch {
                    expected: request.amount,
                    given,
                });
            }
        }
        if let Some(given) = self.method {
            if given != request.method {
                return Err(DisbursementError::MethodMismatch {
                    expected: request.method,
                    given,
                });
            }
        }

        match request.method {
            PaymentMethod::Cash => {
                let raw = non_blank(&self.signature).ok_or(DisbursementError::MissingSignature)?;
                let signature = SignatureImage::parse(raw)?;
                let receiver_name = non_blank(&self.receiver_name)
                    .or_else(|| {
                        let name = request.requester_name.trim();
                        (!name.is_empty()).then(|| name.to_string())
                    })
                    .ok_or(DisbursementError::MissingReceiver)?;
                Ok(DisbursementProof::Cash {
                    receiver_name,
                    signature,
                })
            }
            method @ (PaymentMethod::BankTransfer | PaymentMethod::Pos) => {
                let transaction_ref = non_blank(&self.transaction_ref)
                    .ok_or(DisbursementError::MissingTransactionRef { method })?;
                Ok(DisbursementProof::Electronic {
                    bank_name: non_blank(&self.bank_name)
                        .or_else(|| non_blank(&request.bank_details.bank_name)),
                    account_number: non_blank(&self.account_number)
                        .or_else(|| non_blank(&request.bank_details.account_number)),
                    transaction_ref,
                })
            }
        }
    }

    /// Validate and build the disbursement record for `request`.
    pub fn finalize(
        &self,
        request: &PaymentRequest,
        processed_by: &str,
        processed_at: DateTime<Utc>,
    ) -> Result<Disbursement, DisbursementError> {
        let proof = self.validate(request)?;
        Ok(Disbursement {
            id: DisbursementId::new(),
            request_id: request.id,
            method: request.method,
            amount: request.amount,
            processed_by: processed_by.to_string(),
            processed_at,
            proof,
            evidence_url: non_blank(&self.evidence_url),
        })
    }
}
