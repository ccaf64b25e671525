//! The access decision pipeline.
//!
//! Orchestrates token validation, identity resolution, eligibility,
//! descriptor extraction, and similarity scoring in strict sequence, and
//! appends exactly one audit record per invocation no matter which branch
//! terminates the attempt.
//!
//! Each invocation is stateless: a pure function of (token, sample, now,
//! identity snapshot). The pipeline holds no locks and no caches, so
//! concurrent invocations — for different or the same token — do not
//! interfere.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
  clock::{Clock, SystemClock},
  eligibility,
  extract::{DescriptorExtractor, ExtractionFailure},
  identity::BiometricSample,
  matcher,
  outcome::{NewAuditRecord, ReasonCode, VerificationOutcome},
  store::{AuditSink, IdentityDirectory},
  token,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Default acceptance threshold, tuned for 512-d embeddings under cosine
/// distance.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.3;

/// Pipeline-level tuning.
///
/// The threshold is the single knob for the false-accept / false-reject
/// trade-off; it is configuration, never a per-call-site literal.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
  /// Maximum cosine distance still considered a match. A distance exactly
  /// equal to this value is a non-match.
  pub match_threshold: f32,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self { match_threshold: DEFAULT_MATCH_THRESHOLD }
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// The decision pipeline with its collaborators injected.
///
/// Collaborators are `Arc`-shared so the pipeline can be cloned cheaply
/// into request handlers.
pub struct DecisionPipeline<D, X, A, C = SystemClock> {
  directory: Arc<D>,
  extractor: Arc<X>,
  audit:     Arc<A>,
  clock:     C,
  config:    PipelineConfig,
}

impl<D, X, A, C> Clone for DecisionPipeline<D, X, A, C>
where
  C: Clone,
{
  fn clone(&self) -> Self {
    Self {
      directory: Arc::clone(&self.directory),
      extractor: Arc::clone(&self.extractor),
      audit:     Arc::clone(&self.audit),
      clock:     self.clock.clone(),
      config:    self.config,
    }
  }
}

impl<D, X, A, C> DecisionPipeline<D, X, A, C>
where
  D: IdentityDirectory,
  X: DescriptorExtractor,
  A: AuditSink,
  C: Clock,
{
  pub fn new(
    directory: Arc<D>,
    extractor: Arc<X>,
    audit: Arc<A>,
    clock: C,
    config: PipelineConfig,
  ) -> Self {
    Self { directory, extractor, audit, clock, config }
  }

  pub fn config(&self) -> &PipelineConfig { &self.config }

  /// Run one verification attempt to completion.
  ///
  /// Never fails past this boundary: every collaborator error is classified
  /// into the outcome taxonomy and surfaced as a denial, not an error.
  /// Exactly one audit record is appended — synchronously, after the
  /// outcome is finalized — before this returns.
  pub async fn verify(
    &self,
    raw_token: &str,
    sample: BiometricSample,
  ) -> VerificationOutcome {
    let outcome = self.decide(raw_token, sample).await;
    self.record(&outcome).await;
    outcome
  }

  /// Walk the decision sequence. Every early return is a terminal outcome;
  /// there is no retry anywhere inside a single invocation.
  async fn decide(
    &self,
    raw_token: &str,
    sample: BiometricSample,
  ) -> VerificationOutcome {
    info!(token = raw_token, "verification attempt received");

    // Possession factor: the token must parse before any lookup.
    let id = match token::parse(raw_token) {
      Ok(id) => id,
      Err(_) => {
        warn!(token = raw_token, "token failed format validation");
        return VerificationOutcome::denied(
          ReasonCode::TokenInvalidFormat,
          None,
          None,
        );
      }
    };

    let record = match self.directory.resolve(id).await {
      Ok(record) => record,
      Err(e) => {
        error!(subject = %id, error = %e, "identity lookup failed");
        return VerificationOutcome::denied(
          ReasonCode::ProcessingError,
          None,
          None,
        );
      }
    };

    // Unknown, inactive, and expired all collapse into one denial code, so
    // a probe cannot distinguish a disabled account from an unknown token.
    // The clock is read once; both eligibility comparisons see the same
    // instant.
    let now = self.clock.now();
    let record = match record {
      Some(record) if eligibility::is_eligible(&record, now) => record,
      Some(record) => {
        info!(subject = %record.id, "identity inactive or expired");
        return VerificationOutcome::denied(
          ReasonCode::IdentityInvalidOrInactive,
          Some(record.id),
          None,
        );
      }
      None => {
        info!(subject = %id, "unknown identity");
        return VerificationOutcome::denied(
          ReasonCode::IdentityInvalidOrInactive,
          None,
          None,
        );
      }
    };

    // Inherence factor. Extraction runs only for eligible identities — the
    // short-circuit above avoids wasted computation and avoids leaking
    // match information for disabled accounts.
    let candidate = match self.extractor.extract(&sample).await {
      Ok(candidate) => candidate,
      Err(failure) => {
        warn!(subject = %record.id, %failure, "descriptor extraction failed");
        return VerificationOutcome::denied(
          classify_extraction(&failure),
          Some(record.id),
          None,
        );
      }
    };

    let verdict = matcher::score(
      record.reference.as_ref(),
      &candidate,
      self.config.match_threshold,
    );
    info!(
      subject = %record.id,
      distance = verdict.distance,
      threshold = self.config.match_threshold,
      "descriptor comparison complete"
    );

    if verdict.is_match {
      VerificationOutcome::granted(record.id, verdict.distance)
    } else {
      VerificationOutcome::denied(
        ReasonCode::Mismatch,
        Some(record.id),
        Some(verdict.distance),
      )
    }
  }

  /// The single audit write for this attempt.
  ///
  /// An append failure is an operational fault to report, but it never
  /// retracts the already-decided outcome.
  async fn record(&self, outcome: &VerificationOutcome) {
    let input = NewAuditRecord::from_outcome(outcome);
    if let Err(e) = self.audit.append(input).await {
      error!(
        error = %e,
        decision = outcome.decision.as_str(),
        reason = outcome.reason.as_str(),
        "audit append failed; decision stands"
      );
    }
  }
}

/// Map an extraction failure onto the outcome taxonomy.
///
/// The two signal-count codes pass through unchanged; only unclassified
/// faults become `ProcessingError`.
fn classify_extraction(failure: &ExtractionFailure) -> ReasonCode {
  match failure {
    ExtractionFailure::NoSignal => ReasonCode::NoSignalDetected,
    ExtractionFailure::MultipleSignals => ReasonCode::MultipleSignalsDetected,
    ExtractionFailure::Failed(_) => ReasonCode::ProcessingError,
  }
}
