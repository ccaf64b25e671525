//! Handlers for `/admin/identities` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/identities` | List enrolled identities (no descriptors) |
//! | `POST`   | `/identities` | Multipart: `name`, `email`, `photo`, optional `expires_at` |
//! | `GET`    | `/identities/:id` | 404 if not found |
//! | `PUT`    | `/identities/:id` | Multipart partial profile update |
//! | `PATCH`  | `/identities/:id/status` | JSON `{is_active?, expires_at?}` |
//! | `DELETE` | `/identities/:id` | Audit rows are kept |
//!
//! Enrollment runs the descriptor extractor on the uploaded photo; the
//! identity's reference descriptor is never accepted directly over the wire.

use axum::{
  Json,
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;
use warden_core::{
  extract::DescriptorExtractor,
  identity::{BiometricSample, IdentityRecord, IdentityUpdate, NewIdentity},
  store::{AuditSink, IdentityDirectory},
};

use crate::{ApiState, error::ApiError};

/// Access granted to a fresh enrollment expires after this many days unless
/// the admin provides an explicit `expires_at`.
const DEFAULT_ENROLLMENT_DAYS: i64 = 182;

// ─── Multipart form ──────────────────────────────────────────────────────────

/// Fields accepted by the enrollment and profile-update forms.
#[derive(Debug, Default)]
struct ProfileForm {
  name:       Option<String>,
  email:      Option<String>,
  photo:      Option<Vec<u8>>,
  is_active:  Option<bool>,
  expires_at: Option<DateTime<Utc>>,
}

async fn read_form(mut multipart: Multipart) -> Result<ProfileForm, ApiError> {
  let mut form = ProfileForm::default();

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))?
  {
    let name = field.name().map(str::to_owned);
    match name.as_deref() {
      Some("name") => form.name = Some(text(field).await?),
      Some("email") => form.email = Some(text(field).await?),
      Some("photo") => {
        form.photo = Some(
          field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?
            .to_vec(),
        );
      }
      Some("is_active") => {
        let raw = text(field).await?;
        form.is_active = Some(raw.parse().map_err(|_| {
          ApiError::BadRequest(format!("is_active is not a bool: {raw:?}"))
        })?);
      }
      Some("expires_at") => {
        let raw = text(field).await?;
        let parsed = DateTime::parse_from_rfc3339(&raw).map_err(|_| {
          ApiError::BadRequest(format!(
            "expires_at is not an RFC 3339 timestamp: {raw:?}"
          ))
        })?;
        form.expires_at = Some(parsed.with_timezone(&Utc));
      }
      _ => {}
    }
  }

  Ok(form)
}

async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
  field
    .text()
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /identities`
pub async fn list<S, X>(
  State(state): State<ApiState<S, X>>,
) -> Result<Json<Vec<IdentityRecord>>, ApiError>
where
  S: IdentityDirectory + AuditSink + Send + Sync + 'static,
  X: DescriptorExtractor + Send + Sync + 'static,
{
  let identities = state
    .store
    .list()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(identities))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /identities` — multipart: `name`, `email`, `photo`,
/// optional `expires_at` / `is_active`.
pub async fn create<S, X>(
  State(state): State<ApiState<S, X>>,
  multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: IdentityDirectory + AuditSink + Send + Sync + 'static,
  X: DescriptorExtractor + Send + Sync + 'static,
{
  let form = read_form(multipart).await?;

  let name = form
    .name
    .ok_or_else(|| ApiError::BadRequest("missing field: name".into()))?;
  let email = form
    .email
    .ok_or_else(|| ApiError::BadRequest("missing field: email".into()))?;
  let photo = form
    .photo
    .ok_or_else(|| ApiError::BadRequest("missing field: photo".into()))?;

  if let Some(existing) = state
    .store
    .find_by_email(&email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
  {
    return Err(ApiError::Conflict(format!(
      "email already in use by {}",
      existing.id
    )));
  }

  // The reference descriptor comes from the extractor, never from the wire.
  let reference = state
    .extractor
    .extract(&BiometricSample(photo))
    .await
    .map_err(ApiError::Extraction)?;

  let expires_at = form
    .expires_at
    .unwrap_or_else(|| Utc::now() + Duration::days(DEFAULT_ENROLLMENT_DAYS));

  let identity = state
    .store
    .create(NewIdentity {
      name,
      email,
      is_active: form.is_active.unwrap_or(true),
      expires_at: Some(expires_at),
      reference: Some(reference),
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(identity)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /identities/:id`
pub async fn get_one<S, X>(
  State(state): State<ApiState<S, X>>,
  Path(id): Path<Uuid>,
) -> Result<Json<IdentityRecord>, ApiError>
where
  S: IdentityDirectory + AuditSink + Send + Sync + 'static,
  X: DescriptorExtractor + Send + Sync + 'static,
{
  let identity = state
    .store
    .resolve(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("identity {id} not found")))?;
  Ok(Json(identity))
}

// ─── Update status ────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /identities/:id/status`.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub is_active:  Option<bool>,
  pub expires_at: Option<DateTime<Utc>>,
}

/// `PATCH /identities/:id/status` — quick administrative revoke/extend
/// without touching the rest of the profile.
pub async fn update_status<S, X>(
  State(state): State<ApiState<S, X>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<IdentityRecord>, ApiError>
where
  S: IdentityDirectory + AuditSink + Send + Sync + 'static,
  X: DescriptorExtractor + Send + Sync + 'static,
{
  let update = IdentityUpdate {
    is_active: body.is_active,
    expires_at: body.expires_at,
    ..Default::default()
  };

  let identity = state
    .store
    .update(id, update)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("identity {id} not found")))?;
  Ok(Json(identity))
}

// ─── Update profile ───────────────────────────────────────────────────────────

/// `PUT /identities/:id` — multipart partial update. A new `photo` re-runs
/// extraction and replaces the reference descriptor.
pub async fn update_profile<S, X>(
  State(state): State<ApiState<S, X>>,
  Path(id): Path<Uuid>,
  multipart: Multipart,
) -> Result<Json<IdentityRecord>, ApiError>
where
  S: IdentityDirectory + AuditSink + Send + Sync + 'static,
  X: DescriptorExtractor + Send + Sync + 'static,
{
  let form = read_form(multipart).await?;

  if let Some(email) = &form.email {
    // The new email must not be claimed by another identity.
    if let Some(existing) = state
      .store
      .find_by_email(email)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      && existing.id != id
    {
      return Err(ApiError::Conflict(format!(
        "email already in use by {}",
        existing.id
      )));
    }
  }

  let reference = match form.photo {
    Some(photo) => Some(
      state
        .extractor
        .extract(&BiometricSample(photo))
        .await
        .map_err(ApiError::Extraction)?,
    ),
    None => None,
  };

  let update = IdentityUpdate {
    name: form.name,
    email: form.email,
    is_active: form.is_active,
    expires_at: form.expires_at,
    reference,
  };

  let identity = state
    .store
    .update(id, update)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("identity {id} not found")))?;
  Ok(Json(identity))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /identities/:id` — removes the identity and its reference
/// descriptor. Audit records attributed to it remain.
pub async fn delete_one<S, X>(
  State(state): State<ApiState<S, X>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: IdentityDirectory + AuditSink + Send + Sync + 'static,
  X: DescriptorExtractor + Send + Sync + 'static,
{
  let removed = state
    .store
    .remove(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if removed {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("identity {id} not found")))
  }
}
