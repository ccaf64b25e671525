//! Runtime server configuration.

use std::path::PathBuf;

use serde::Deserialize;
use warden_core::pipeline::DEFAULT_MATCH_THRESHOLD;

/// Runtime server configuration, deserialised from `config.toml` with
/// `WARDEN_`-prefixed environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Endpoint of the descriptor-extraction service.
  pub extractor_url:      String,
  /// Maximum cosine distance still considered a match.
  #[serde(default = "default_match_threshold")]
  pub match_threshold:    f32,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

fn default_match_threshold() -> f32 { DEFAULT_MATCH_THRESHOLD }
