//! Error types for `warden-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The raw token does not conform to the token grammar. No lookup was
  /// attempted and no identity was assumed.
  #[error("token is not a valid identifier: {0:?}")]
  TokenFormat(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
