//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use uuid::Uuid;
use warden_core::{
  identity::{Descriptor, IdentityUpdate, NewIdentity},
  outcome::{Decision, NewAuditRecord, ReasonCode},
  store::{AuditQuery, AuditSink, IdentityDirectory},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_identity(email: &str) -> NewIdentity {
  NewIdentity {
    name:       "Alice Liddell".into(),
    email:      email.into(),
    is_active:  true,
    expires_at: Some(Utc::now() + Duration::days(182)),
    reference:  Some(Descriptor(vec![0.1, 0.2, 0.3])),
  }
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_resolve_identity() {
  let s = store().await;

  let created = s.create(new_identity("alice@example.com")).await.unwrap();
  assert_eq!(created.email, "alice@example.com");
  assert!(created.is_active);

  let resolved = s.resolve(created.id).await.unwrap().unwrap();
  assert_eq!(resolved.id, created.id);
  assert_eq!(resolved.name, "Alice Liddell");
  assert_eq!(resolved.reference, Some(Descriptor(vec![0.1, 0.2, 0.3])));
  assert_eq!(
    resolved.expires_at.map(|t| t.timestamp()),
    created.expires_at.map(|t| t.timestamp()),
  );
}

#[tokio::test]
async fn resolve_missing_returns_none() {
  let s = store().await;
  assert!(s.resolve(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn identity_without_reference_or_expiry_roundtrips() {
  let s = store().await;

  let mut input = new_identity("bare@example.com");
  input.reference = None;
  input.expires_at = None;

  let created = s.create(input).await.unwrap();
  let resolved = s.resolve(created.id).await.unwrap().unwrap();
  assert!(resolved.reference.is_none());
  assert!(resolved.expires_at.is_none());
}

#[tokio::test]
async fn find_by_email() {
  let s = store().await;

  let created = s.create(new_identity("alice@example.com")).await.unwrap();
  s.create(new_identity("bob@example.com")).await.unwrap();

  let found = s.find_by_email("alice@example.com").await.unwrap().unwrap();
  assert_eq!(found.id, created.id);

  assert!(s.find_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;

  s.create(new_identity("taken@example.com")).await.unwrap();
  let err = s.create(new_identity("taken@example.com")).await;
  assert!(err.is_err());
}

#[tokio::test]
async fn update_applies_only_provided_fields() {
  let s = store().await;
  let created = s.create(new_identity("alice@example.com")).await.unwrap();

  let updated = s
    .update(created.id, IdentityUpdate {
      is_active: Some(false),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();

  assert!(!updated.is_active);
  assert_eq!(updated.name, created.name);
  assert_eq!(updated.email, created.email);
  assert_eq!(updated.reference, created.reference);

  let resolved = s.resolve(created.id).await.unwrap().unwrap();
  assert!(!resolved.is_active);
}

#[tokio::test]
async fn update_replaces_reference_descriptor() {
  let s = store().await;
  let created = s.create(new_identity("alice@example.com")).await.unwrap();

  let updated = s
    .update(created.id, IdentityUpdate {
      reference: Some(Descriptor(vec![9.0, 9.0])),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.reference, Some(Descriptor(vec![9.0, 9.0])));
}

#[tokio::test]
async fn update_unknown_identity_returns_none() {
  let s = store().await;
  let result = s
    .update(Uuid::new_v4(), IdentityUpdate::default())
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn remove_deletes_and_reports() {
  let s = store().await;
  let created = s.create(new_identity("alice@example.com")).await.unwrap();

  assert!(s.remove(created.id).await.unwrap());
  assert!(s.resolve(created.id).await.unwrap().is_none());
  assert!(!s.remove(created.id).await.unwrap());
}

#[tokio::test]
async fn list_returns_all_identities() {
  let s = store().await;
  s.create(new_identity("a@example.com")).await.unwrap();
  s.create(new_identity("b@example.com")).await.unwrap();
  s.create(new_identity("c@example.com")).await.unwrap();

  let all = s.list().await.unwrap();
  assert_eq!(all.len(), 3);
}

// ─── Audit trail ─────────────────────────────────────────────────────────────

fn granted_record(subject_id: Uuid) -> NewAuditRecord {
  NewAuditRecord {
    decision:   Decision::Granted,
    reason:     ReasonCode::Success,
    subject_id: Some(subject_id),
    distance:   Some(0.15),
  }
}

fn denied_record(reason: ReasonCode, subject_id: Option<Uuid>) -> NewAuditRecord {
  NewAuditRecord { decision: Decision::Denied, reason, subject_id, distance: None }
}

#[tokio::test]
async fn append_and_query_roundtrip() {
  let s = store().await;
  let subject = Uuid::new_v4();

  let appended = s.append(granted_record(subject)).await.unwrap();
  assert_eq!(appended.decision, Decision::Granted);

  let records = s.query(&AuditQuery::default()).await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].record_id, appended.record_id);
  assert_eq!(records[0].reason, ReasonCode::Success);
  assert_eq!(records[0].subject_id, Some(subject));
  assert_eq!(records[0].distance, Some(0.15));
}

#[tokio::test]
async fn null_subject_and_distance_roundtrip() {
  let s = store().await;

  s.append(denied_record(ReasonCode::TokenInvalidFormat, None))
    .await
    .unwrap();

  let records = s.query(&AuditQuery::default()).await.unwrap();
  assert_eq!(records.len(), 1);
  assert!(records[0].subject_id.is_none());
  assert!(records[0].distance.is_none());
}

#[tokio::test]
async fn query_filters_by_decision() {
  let s = store().await;
  let subject = Uuid::new_v4();

  s.append(granted_record(subject)).await.unwrap();
  s.append(denied_record(ReasonCode::Mismatch, Some(subject)))
    .await
    .unwrap();
  s.append(denied_record(ReasonCode::TokenInvalidFormat, None))
    .await
    .unwrap();

  let denied = s
    .query(&AuditQuery {
      decision: Some(Decision::Denied),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(denied.len(), 2);
  assert!(denied.iter().all(|r| r.decision == Decision::Denied));
}

#[tokio::test]
async fn query_filters_by_reason_and_subject() {
  let s = store().await;
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();

  s.append(granted_record(alice)).await.unwrap();
  s.append(denied_record(ReasonCode::Mismatch, Some(alice)))
    .await
    .unwrap();
  s.append(denied_record(ReasonCode::Mismatch, Some(bob)))
    .await
    .unwrap();

  let mismatches = s
    .query(&AuditQuery {
      reason: Some(ReasonCode::Mismatch),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(mismatches.len(), 2);

  let alices = s
    .query(&AuditQuery {
      subject_id: Some(alice),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(alices.len(), 2);
  assert!(alices.iter().all(|r| r.subject_id == Some(alice)));
}

#[tokio::test]
async fn query_respects_limit_and_offset() {
  let s = store().await;
  let subject = Uuid::new_v4();

  for _ in 0..5 {
    s.append(granted_record(subject)).await.unwrap();
  }

  let page = s
    .query(&AuditQuery {
      limit: Some(2),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.len(), 2);

  let rest = s
    .query(&AuditQuery {
      limit: Some(10),
      offset: Some(4),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(rest.len(), 1);
}

#[tokio::test]
async fn audit_rows_survive_identity_removal() {
  let s = store().await;
  let created = s.create(new_identity("gone@example.com")).await.unwrap();

  s.append(granted_record(created.id)).await.unwrap();
  assert!(s.remove(created.id).await.unwrap());

  let records = s
    .query(&AuditQuery {
      subject_id: Some(created.id),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(records.len(), 1);
}
