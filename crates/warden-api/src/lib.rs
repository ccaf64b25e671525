//! JSON/multipart REST API for Warden.
//!
//! Exposes axum [`Router`]s backed by any store implementing the
//! `warden_core` collaborator traits. Auth, TLS, and transport concerns are
//! the caller's responsibility — the server binary guards the admin router
//! and leaves the terminal router open.
//!
//! # Mounting
//!
//! ```rust,ignore
//! Router::new()
//!   .nest("/terminal", warden_api::terminal_router(state.clone()))
//!   .nest("/admin", warden_api::admin_router(state))
//! ```

pub mod admin;
pub mod error;
pub mod logs;
pub mod verify;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use warden_core::{
  clock::SystemClock,
  extract::DescriptorExtractor,
  pipeline::{DecisionPipeline, PipelineConfig},
  store::{AuditSink, IdentityDirectory},
};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
///
/// The store doubles as identity directory and audit sink; the pipeline
/// holds its own references to both.
pub struct ApiState<S, X> {
  pub store:     Arc<S>,
  pub extractor: Arc<X>,
  pub pipeline:  Arc<DecisionPipeline<S, X, S, SystemClock>>,
}

impl<S, X> ApiState<S, X>
where
  S: IdentityDirectory + AuditSink,
  X: DescriptorExtractor,
{
  pub fn new(store: Arc<S>, extractor: Arc<X>, config: PipelineConfig) -> Self {
    let pipeline = Arc::new(DecisionPipeline::new(
      Arc::clone(&store),
      Arc::clone(&extractor),
      Arc::clone(&store),
      SystemClock,
      config,
    ));
    Self { store, extractor, pipeline }
  }
}

impl<S, X> Clone for ApiState<S, X> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      extractor: Arc::clone(&self.extractor),
      pipeline:  Arc::clone(&self.pipeline),
    }
  }
}

// ─── Routers ─────────────────────────────────────────────────────────────────

/// Build the terminal-facing router: the single verify operation.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn terminal_router<S, X>(state: ApiState<S, X>) -> Router<()>
where
  S: IdentityDirectory + AuditSink + Send + Sync + 'static,
  X: DescriptorExtractor + Send + Sync + 'static,
{
  Router::new()
    .route("/verify", post(verify::handler::<S, X>))
    .with_state(state)
}

/// Build the admin-facing router: identity CRUD and the audit log listing.
pub fn admin_router<S, X>(state: ApiState<S, X>) -> Router<()>
where
  S: IdentityDirectory + AuditSink + Send + Sync + 'static,
  X: DescriptorExtractor + Send + Sync + 'static,
{
  Router::new()
    // Identities
    .route(
      "/identities",
      get(admin::list::<S, X>).post(admin::create::<S, X>),
    )
    .route(
      "/identities/{id}",
      get(admin::get_one::<S, X>)
        .put(admin::update_profile::<S, X>)
        .delete(admin::delete_one::<S, X>),
    )
    .route("/identities/{id}/status", patch(admin::update_status::<S, X>))
    // Audit trail
    .route("/logs", get(logs::list::<S, X>))
    .with_state(state)
}
