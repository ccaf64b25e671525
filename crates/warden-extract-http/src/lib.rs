//! HTTP backend for descriptor extraction.
//!
//! The embedding model runs in a separate extraction service; this crate
//! POSTs the raw sample bytes to its endpoint and maps the JSON reply onto
//! the closed extractor failure set.
//!
//! Expected replies:
//! - `200` with `{"embedding": [..]}` — success
//! - `{"error": "no_face"}` — no detectable subject in the sample
//! - `{"error": "multiple_faces"}` — more than one subject in the sample
//!
//! Anything else — transport failure, unexpected status, malformed body —
//! is a generic extraction fault, recoverable per request.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use warden_core::{
  extract::{DescriptorExtractor, ExtractionFailure},
  identity::{BiometricSample, Descriptor},
};

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for the extraction service.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
  /// Full URL of the extraction endpoint.
  pub endpoint: String,
  /// Per-request timeout. Extraction is slow; this bounds how long one
  /// verification can hold a connection.
  pub timeout:  Duration,
}

impl ExtractorConfig {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self { endpoint: endpoint.into(), timeout: Duration::from_secs(30) }
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Descriptor extractor backed by an HTTP extraction service.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpExtractor {
  client: Client,
  config: ExtractorConfig,
}

impl HttpExtractor {
  pub fn new(config: ExtractorConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }
}

/// The extraction service's reply body. `error` and `embedding` are
/// mutually exclusive in practice; `error` wins if both appear.
#[derive(Debug, Deserialize)]
struct ExtractReply {
  #[serde(default)]
  embedding: Option<Vec<f32>>,
  #[serde(default)]
  error:     Option<String>,
}

impl DescriptorExtractor for HttpExtractor {
  async fn extract(
    &self,
    sample: &BiometricSample,
  ) -> std::result::Result<Descriptor, ExtractionFailure> {
    // An empty capture is classified locally; no round-trip needed.
    if sample.is_empty() {
      return Err(ExtractionFailure::NoSignal);
    }

    let resp = self
      .client
      .post(&self.config.endpoint)
      .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
      .body(sample.as_bytes().to_vec())
      .send()
      .await
      .map_err(|e| {
        ExtractionFailure::Failed(format!("extraction request failed: {e}"))
      })?;

    let status = resp.status().as_u16();
    let reply: ExtractReply = resp.json().await.map_err(|e| {
      ExtractionFailure::Failed(format!("malformed extraction reply: {e}"))
    })?;

    debug!(status, "extraction service replied");
    classify(status, reply)
  }
}

/// Map a service reply onto the extractor contract. A named `error` takes
/// precedence over the HTTP status so the signal-count failures survive
/// whatever status code the service pairs them with.
fn classify(
  status: u16,
  reply: ExtractReply,
) -> std::result::Result<Descriptor, ExtractionFailure> {
  match reply.error.as_deref() {
    Some("no_face") => return Err(ExtractionFailure::NoSignal),
    Some("multiple_faces") => return Err(ExtractionFailure::MultipleSignals),
    Some(other) => {
      return Err(ExtractionFailure::Failed(format!(
        "extraction service error: {other}"
      )));
    }
    None => {}
  }

  if !(200..300).contains(&status) {
    return Err(ExtractionFailure::Failed(format!(
      "extraction service returned status {status}"
    )));
  }

  match reply.embedding {
    Some(values) if !values.is_empty() => Ok(Descriptor(values)),
    _ => Err(ExtractionFailure::Failed(
      "extraction reply carried no embedding".into(),
    )),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn reply(embedding: Option<Vec<f32>>, error: Option<&str>) -> ExtractReply {
    ExtractReply { embedding, error: error.map(str::to_owned) }
  }

  #[test]
  fn embedding_reply_becomes_descriptor() {
    let result = classify(200, reply(Some(vec![0.1, 0.2]), None));
    assert_eq!(result.unwrap(), Descriptor(vec![0.1, 0.2]));
  }

  #[test]
  fn no_face_maps_to_no_signal() {
    let result = classify(422, reply(None, Some("no_face")));
    assert_eq!(result.unwrap_err(), ExtractionFailure::NoSignal);
  }

  #[test]
  fn multiple_faces_maps_to_multiple_signals() {
    let result = classify(422, reply(None, Some("multiple_faces")));
    assert_eq!(result.unwrap_err(), ExtractionFailure::MultipleSignals);
  }

  #[test]
  fn named_error_wins_over_success_status() {
    let result = classify(200, reply(Some(vec![0.1]), Some("no_face")));
    assert_eq!(result.unwrap_err(), ExtractionFailure::NoSignal);
  }

  #[test]
  fn unknown_error_is_a_generic_fault() {
    let result = classify(422, reply(None, Some("gpu_on_fire")));
    assert!(matches!(result, Err(ExtractionFailure::Failed(_))));
  }

  #[test]
  fn non_success_status_is_a_generic_fault() {
    let result = classify(500, reply(None, None));
    assert!(matches!(result, Err(ExtractionFailure::Failed(_))));
  }

  #[test]
  fn missing_embedding_is_a_generic_fault() {
    assert!(matches!(
      classify(200, reply(None, None)),
      Err(ExtractionFailure::Failed(_))
    ));
    assert!(matches!(
      classify(200, reply(Some(vec![]), None)),
      Err(ExtractionFailure::Failed(_))
    ));
  }

  #[tokio::test]
  async fn empty_sample_short_circuits_to_no_signal() {
    let extractor =
      HttpExtractor::new(ExtractorConfig::new("http://localhost:9"))
        .unwrap();
    let result = extractor.extract(&BiometricSample(Vec::new())).await;
    assert_eq!(result.unwrap_err(), ExtractionFailure::NoSignal);
  }
}
