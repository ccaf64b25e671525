//! Eligibility — whether an identity may currently attempt verification.

use chrono::{DateTime, Utc};

use crate::identity::IdentityRecord;

/// `true` when the identity is active and unexpired as of `now`.
///
/// `now` is sampled once per pipeline invocation and passed in, so a
/// borderline record cannot flip state between the two comparisons of a
/// single decision. An expiry exactly equal to `now` is still eligible;
/// only a strictly earlier expiry denies.
pub fn is_eligible(record: &IdentityRecord, now: DateTime<Utc>) -> bool {
  if !record.is_active {
    return false;
  }
  match record.expires_at {
    Some(expires_at) => expires_at >= now,
    None => true,
  }
}
