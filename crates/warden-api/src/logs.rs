//! Handler for `GET /admin/logs`.
//!
//! Read-only view over the audit trail. The trail itself is append-only;
//! this endpoint exposes filtered pages of it, newest first.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use warden_core::{
  extract::DescriptorExtractor,
  outcome::{AuditRecord, Decision, ReasonCode},
  store::{AuditQuery, AuditSink, IdentityDirectory},
};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub decision:        Option<Decision>,
  pub reason:          Option<ReasonCode>,
  pub subject_id:      Option<Uuid>,
  pub recorded_after:  Option<DateTime<Utc>>,
  pub recorded_before: Option<DateTime<Utc>>,
  pub limit:           Option<usize>,
  pub offset:          Option<usize>,
}

/// `GET /logs[?decision=DENIED&reason=MISMATCH&subject_id=...&limit=50]`
pub async fn list<S, X>(
  State(state): State<ApiState<S, X>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AuditRecord>>, ApiError>
where
  S: IdentityDirectory + AuditSink + Send + Sync + 'static,
  X: DescriptorExtractor + Send + Sync + 'static,
{
  let query = AuditQuery {
    decision:        params.decision,
    reason:          params.reason,
    subject_id:      params.subject_id,
    recorded_after:  params.recorded_after,
    recorded_before: params.recorded_before,
    limit:           params.limit,
    offset:          params.offset,
  };

  let records = state
    .store
    .query(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(records))
}
