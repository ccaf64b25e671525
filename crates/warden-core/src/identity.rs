//! Identity records and biometric value types.
//!
//! An identity is the enrolled principal a token claims to be. The pipeline
//! reads one snapshot per request and never mutates it; all writes happen
//! through the admin surface.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Descriptor ──────────────────────────────────────────────────────────────

/// A biometric feature vector produced by descriptor extraction.
///
/// Immutable once produced. Compared against a stored reference; only scalar
/// values derived from a comparison ever reach the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor(pub Vec<f32>);

impl Descriptor {
  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn as_slice(&self) -> &[f32] { &self.0 }
}

// ─── BiometricSample ─────────────────────────────────────────────────────────

/// Raw bytes of a single capture. Ephemeral — exists for the duration of one
/// pipeline invocation and is never persisted.
#[derive(Clone)]
pub struct BiometricSample(pub Vec<u8>);

impl BiometricSample {
  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn as_bytes(&self) -> &[u8] { &self.0 }
}

// Capture bytes stay out of logs; only the length is printable.
impl fmt::Debug for BiometricSample {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "BiometricSample({} bytes)", self.0.len())
  }
}

// ─── IdentityRecord ──────────────────────────────────────────────────────────

/// An enrolled principal.
///
/// The reference descriptor is skipped on serialization so identity records
/// can be returned by the admin API without exposing biometric data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
  pub id:         Uuid,
  pub name:       String,
  pub email:      String,
  /// Administratively toggleable.
  pub is_active:  bool,
  /// Absent means the identity never expires.
  pub expires_at: Option<DateTime<Utc>>,
  /// Enrolled comparison baseline; absent if the identity was never
  /// enrolled with biometrics.
  #[serde(skip_serializing, default)]
  pub reference:  Option<Descriptor>,
  pub created_at: DateTime<Utc>,
}

// ─── NewIdentity ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::IdentityDirectory::create`].
/// `id` and `created_at` are assigned by the directory.
#[derive(Debug, Clone)]
pub struct NewIdentity {
  pub name:       String,
  pub email:      String,
  pub is_active:  bool,
  pub expires_at: Option<DateTime<Utc>>,
  pub reference:  Option<Descriptor>,
}

// ─── IdentityUpdate ──────────────────────────────────────────────────────────

/// Partial update applied by [`crate::store::IdentityDirectory::update`].
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct IdentityUpdate {
  pub name:       Option<String>,
  pub email:      Option<String>,
  pub is_active:  Option<bool>,
  pub expires_at: Option<DateTime<Utc>>,
  pub reference:  Option<Descriptor>,
}
