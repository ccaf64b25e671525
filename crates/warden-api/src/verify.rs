//! Handler for `POST /terminal/verify`.
//!
//! Multipart form: a `token` text field (the scanned credential) and a
//! `sample` file field (the live capture). Every decided attempt is an
//! HTTP 200 carrying the outcome — denials are data, not transport errors.
//! Only a malformed request (missing fields, bad multipart) is a 400.

use axum::{Json, extract::{Multipart, State}};
use serde::Serialize;
use uuid::Uuid;
use warden_core::{
  extract::DescriptorExtractor,
  identity::BiometricSample,
  outcome::{Decision, ReasonCode, VerificationOutcome},
  store::{AuditSink, IdentityDirectory},
};

use crate::{ApiState, error::ApiError};

// ─── Response ────────────────────────────────────────────────────────────────

/// Wire form of a verification outcome.
///
/// `reason` is omitted on a grant; `subject_id` is present only on a grant,
/// so a denial response never reveals whether the token mapped to a real
/// identity.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
  pub access: Decision,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<ReasonCode>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subject_id: Option<Uuid>,
}

impl From<VerificationOutcome> for VerifyResponse {
  fn from(outcome: VerificationOutcome) -> Self {
    match outcome.decision {
      Decision::Granted => Self {
        access:     Decision::Granted,
        reason:     None,
        subject_id: outcome.subject_id,
      },
      Decision::Denied => Self {
        access:     Decision::Denied,
        reason:     Some(outcome.reason),
        subject_id: None,
      },
    }
  }
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `POST /terminal/verify` — multipart fields `token` and `sample`.
pub async fn handler<S, X>(
  State(state): State<ApiState<S, X>>,
  mut multipart: Multipart,
) -> Result<Json<VerifyResponse>, ApiError>
where
  S: IdentityDirectory + AuditSink + Send + Sync + 'static,
  X: DescriptorExtractor + Send + Sync + 'static,
{
  let mut token: Option<String> = None;
  let mut sample: Option<Vec<u8>> = None;

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))?
  {
    let name = field.name().map(str::to_owned);
    match name.as_deref() {
      Some("token") => {
        token = Some(
          field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        );
      }
      Some("sample") => {
        sample = Some(
          field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?
            .to_vec(),
        );
      }
      _ => {}
    }
  }

  let token =
    token.ok_or_else(|| ApiError::BadRequest("missing field: token".into()))?;
  let sample = sample
    .ok_or_else(|| ApiError::BadRequest("missing field: sample".into()))?;

  let outcome = state
    .pipeline
    .verify(&token, BiometricSample(sample))
    .await;

  Ok(Json(VerifyResponse::from(outcome)))
}
