//! Claimed-identity token validation.
//!
//! The token is the possession factor: the canonical textual form of a
//! 128-bit identifier, typically delivered to the subject as a scannable
//! artifact. Validation happens before any directory lookup — a malformed
//! token is rejected without assuming an identity.

use uuid::Uuid;

use crate::{Error, Result};

/// Parse and normalize a raw token string.
///
/// Accepts the textual forms the `uuid` parser understands (hyphenated,
/// simple, braced, URN); everything downstream works with the parsed value,
/// never the raw string.
pub fn parse(raw: &str) -> Result<Uuid> {
  Uuid::parse_str(raw).map_err(|_| Error::TokenFormat(raw.to_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hyphenated_token_parses() {
    let id = Uuid::new_v4();
    assert_eq!(parse(&id.to_string()).unwrap(), id);
  }

  #[test]
  fn simple_form_normalizes_to_same_id() {
    let id = Uuid::new_v4();
    let simple = id.simple().to_string();
    assert_eq!(parse(&simple).unwrap(), id);
  }

  #[test]
  fn garbage_is_rejected() {
    let err = parse("not-a-token").unwrap_err();
    assert!(matches!(err, Error::TokenFormat(_)));
  }

  #[test]
  fn empty_string_is_rejected() {
    assert!(parse("").is_err());
  }

  #[test]
  fn surrounding_whitespace_is_rejected() {
    let id = Uuid::new_v4();
    assert!(parse(&format!(" {id} ")).is_err());
  }
}
