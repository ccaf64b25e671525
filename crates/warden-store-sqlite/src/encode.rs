//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Descriptors are stored as
//! compact JSON arrays. UUIDs are stored as hyphenated lowercase strings.
//! Decisions and reason codes use their wire discriminants.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use warden_core::{
  identity::{Descriptor, IdentityRecord},
  outcome::{AuditRecord, Decision, ReasonCode},
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Decision / ReasonCode
// ────────────────────────────────────────────────────

pub fn decode_decision(s: &str) -> Result<Decision> {
  match s {
    "GRANTED" => Ok(Decision::Granted),
    "DENIED" => Ok(Decision::Denied),
    other => Err(Error::Decode(format!("decision {other:?}"))),
  }
}

pub fn decode_reason(s: &str) -> Result<ReasonCode> {
  match s {
    "SUCCESS" => Ok(ReasonCode::Success),
    "TOKEN_INVALID_FORMAT" => Ok(ReasonCode::TokenInvalidFormat),
    "IDENTITY_INVALID_OR_INACTIVE" => Ok(ReasonCode::IdentityInvalidOrInactive),
    "NO_SIGNAL_DETECTED" => Ok(ReasonCode::NoSignalDetected),
    "MULTIPLE_SIGNALS_DETECTED" => Ok(ReasonCode::MultipleSignalsDetected),
    "PROCESSING_ERROR" => Ok(ReasonCode::ProcessingError),
    "MISMATCH" => Ok(ReasonCode::Mismatch),
    other => Err(Error::Decode(format!("reason {other:?}"))),
  }
}

// ─── Descriptor ──────────────────────────────────────────────────────────────

pub fn encode_descriptor(d: &Descriptor) -> Result<String> {
  Ok(serde_json::to_string(d)?)
}

pub fn decode_descriptor(s: &str) -> Result<Descriptor> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `identities` row.
pub struct RawIdentity {
  pub identity_id: String,
  pub name:        String,
  pub email:       String,
  pub is_active:   bool,
  pub expires_at:  Option<String>,
  pub reference:   Option<String>,
  pub created_at:  String,
}

impl RawIdentity {
  pub fn into_record(self) -> Result<IdentityRecord> {
    Ok(IdentityRecord {
      id:         decode_uuid(&self.identity_id)?,
      name:       self.name,
      email:      self.email,
      is_active:  self.is_active,
      expires_at: self.expires_at.as_deref().map(decode_dt).transpose()?,
      reference:  self
        .reference
        .as_deref()
        .map(decode_descriptor)
        .transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `access_log` row.
pub struct RawAuditRecord {
  pub record_id:   String,
  pub recorded_at: String,
  pub decision:    String,
  pub reason:      String,
  pub subject_id:  Option<String>,
  pub distance:    Option<f64>,
}

impl RawAuditRecord {
  pub fn into_record(self) -> Result<AuditRecord> {
    Ok(AuditRecord {
      record_id:   decode_uuid(&self.record_id)?,
      recorded_at: decode_dt(&self.recorded_at)?,
      decision:    decode_decision(&self.decision)?,
      reason:      decode_reason(&self.reason)?,
      subject_id:  self
        .subject_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      distance:    self.distance.map(|d| d as f32),
    })
  }
}
