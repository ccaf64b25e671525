//! Time source for the pipeline.
//!
//! Injected explicitly so eligibility evaluation is a pure, testable
//! function of (record, now) with no hidden process-wide state.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}
