//! Collaborator traits for identity resolution and the audit trail.
//!
//! Implemented by storage backends (e.g. `warden-store-sqlite`). The
//! pipeline and the API layer depend on these abstractions, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  identity::{IdentityRecord, IdentityUpdate, NewIdentity},
  outcome::{AuditRecord, Decision, NewAuditRecord, ReasonCode},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`AuditSink::query`].
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
  pub decision:        Option<Decision>,
  pub reason:          Option<ReasonCode>,
  /// Restrict to records attributed to one subject.
  pub subject_id:      Option<Uuid>,
  pub recorded_after:  Option<DateTime<Utc>>,
  pub recorded_before: Option<DateTime<Utc>>,
  pub limit:           Option<usize>,
  pub offset:          Option<usize>,
}

// ─── Identity directory ──────────────────────────────────────────────────────

/// Read/write access to enrolled identities.
///
/// The pipeline uses only [`resolve`](IdentityDirectory::resolve) — a
/// read-only keyed lookup of one snapshot per request. The remaining
/// methods are the admin surface.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait IdentityDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve a normalized token to an identity snapshot.
  /// Returns `None` if no identity is enrolled under this id.
  fn resolve(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<IdentityRecord>, Self::Error>> + Send + '_;

  /// Look up an identity by email. Used to enforce email uniqueness before
  /// a create or email change.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<IdentityRecord>, Self::Error>> + Send + 'a;

  /// Enroll a new identity. `id` and `created_at` are assigned here.
  fn create(
    &self,
    input: NewIdentity,
  ) -> impl Future<Output = Result<IdentityRecord, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `None` if the identity does not exist.
  fn update(
    &self,
    id: Uuid,
    update: IdentityUpdate,
  ) -> impl Future<Output = Result<Option<IdentityRecord>, Self::Error>> + Send + '_;

  /// Delete an identity. Returns `false` if it did not exist. Audit records
  /// attributed to the identity are left in place.
  fn remove(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// List all enrolled identities.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<IdentityRecord>, Self::Error>> + Send + '_;
}

// ─── Audit sink ──────────────────────────────────────────────────────────────

/// Append-only persistence for the audit trail.
///
/// Records are never updated or deleted; removing an identity leaves its
/// audit rows in place. The sink owns its own concurrency control.
pub trait AuditSink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one record. `record_id` and `recorded_at` are assigned here.
  fn append(
    &self,
    input: NewAuditRecord,
  ) -> impl Future<Output = Result<AuditRecord, Self::Error>> + Send + '_;

  /// Return records matching `query`, newest first.
  fn query<'a>(
    &'a self,
    query: &'a AuditQuery,
  ) -> impl Future<Output = Result<Vec<AuditRecord>, Self::Error>> + Send + 'a;
}
