//! Verification outcomes and audit trail records.
//!
//! Every pipeline invocation produces exactly one [`VerificationOutcome`]
//! and exactly one [`AuditRecord`]. The audit trail stores only scalar
//! derived values — never raw biometric vectors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Decision ────────────────────────────────────────────────────────────────

/// The binary access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
  Granted,
  Denied,
}

impl Decision {
  /// The discriminant string stored in the `decision` column and sent on
  /// the wire. Must match the serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Granted => "GRANTED",
      Self::Denied => "DENIED",
    }
  }
}

// ─── ReasonCode ──────────────────────────────────────────────────────────────

/// Why a pipeline run ended the way it did.
///
/// Closed set: every branch of the pipeline maps to exactly one of these,
/// and nothing else ever reaches the caller or the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
  Success,
  TokenInvalidFormat,
  IdentityInvalidOrInactive,
  NoSignalDetected,
  MultipleSignalsDetected,
  ProcessingError,
  Mismatch,
}

impl ReasonCode {
  /// The discriminant string stored in the `reason` column and sent on the
  /// wire. Must match the serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Success => "SUCCESS",
      Self::TokenInvalidFormat => "TOKEN_INVALID_FORMAT",
      Self::IdentityInvalidOrInactive => "IDENTITY_INVALID_OR_INACTIVE",
      Self::NoSignalDetected => "NO_SIGNAL_DETECTED",
      Self::MultipleSignalsDetected => "MULTIPLE_SIGNALS_DETECTED",
      Self::ProcessingError => "PROCESSING_ERROR",
      Self::Mismatch => "MISMATCH",
    }
  }
}

// ─── VerificationOutcome ─────────────────────────────────────────────────────

/// The result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
  pub decision:   Decision,
  pub reason:     ReasonCode,
  /// Present only when an identity was resolved for the attempt — including
  /// denials of a resolved-but-ineligible identity.
  pub subject_id: Option<Uuid>,
  /// Present only when a descriptor comparison was actually computed.
  pub distance:   Option<f32>,
}

impl VerificationOutcome {
  pub fn granted(subject_id: Uuid, distance: f32) -> Self {
    Self {
      decision:   Decision::Granted,
      reason:     ReasonCode::Success,
      subject_id: Some(subject_id),
      distance:   Some(distance),
    }
  }

  pub fn denied(
    reason: ReasonCode,
    subject_id: Option<Uuid>,
    distance: Option<f32>,
  ) -> Self {
    Self { decision: Decision::Denied, reason, subject_id, distance }
  }
}

// ─── AuditRecord ─────────────────────────────────────────────────────────────

/// One immutable row of the audit trail. Written once per attempt after the
/// outcome is finalized; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
  pub record_id:   Uuid,
  /// Sink-assigned timestamp; never changes after creation.
  pub recorded_at: DateTime<Utc>,
  pub decision:    Decision,
  pub reason:      ReasonCode,
  pub subject_id:  Option<Uuid>,
  pub distance:    Option<f32>,
}

// ─── NewAuditRecord ──────────────────────────────────────────────────────────

/// Input to [`crate::store::AuditSink::append`].
/// `record_id` and `recorded_at` are assigned by the sink.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
  pub decision:   Decision,
  pub reason:     ReasonCode,
  pub subject_id: Option<Uuid>,
  pub distance:   Option<f32>,
}

impl NewAuditRecord {
  /// Derive the audit row for a finalized outcome.
  pub fn from_outcome(outcome: &VerificationOutcome) -> Self {
    Self {
      decision:   outcome.decision,
      reason:     outcome.reason,
      subject_id: outcome.subject_id,
      distance:   outcome.distance,
    }
  }
}
