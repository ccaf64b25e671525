//! The descriptor-extraction collaborator contract.
//!
//! The pipeline consumes extraction as an opaque operation with a closed
//! failure set; the extraction algorithm itself lives in a backend crate.

use std::future::Future;

use thiserror::Error;

use crate::identity::{BiometricSample, Descriptor};

// ─── Failure set ─────────────────────────────────────────────────────────────

/// Why extraction produced no descriptor.
///
/// Closed set so callers handle every variant exhaustively. The two
/// signal-count failures are distinct outcomes and must never be collapsed
/// into each other or into a generic fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
  /// No biometric feature present in the sample (empty capture, nothing
  /// detectable).
  #[error("no biometric signal detected")]
  NoSignal,

  /// More than one feature instance in a single sample. A verification
  /// sample must contain exactly one subject.
  #[error("multiple biometric signals detected")]
  MultipleSignals,

  /// Any other failure: malformed input, backend fault. Recoverable per
  /// request, never fatal to the process.
  #[error("extraction failed: {0}")]
  Failed(String),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Converts a raw biometric sample into a comparable descriptor.
///
/// Extraction is assumed to be computationally expensive and potentially
/// blocking. Implementations must keep it off the async executor — either a
/// network call to an extraction service, or CPU-bound work moved onto a
/// blocking pool — so one slow extraction cannot stall unrelated
/// verifications.
pub trait DescriptorExtractor: Send + Sync {
  fn extract<'a>(
    &'a self,
    sample: &'a BiometricSample,
  ) -> impl Future<Output = Result<Descriptor, ExtractionFailure>> + Send + 'a;
}
