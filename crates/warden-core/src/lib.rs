//! Core types, collaborator traits, and the access decision pipeline for
//! Warden.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod eligibility;
pub mod error;
pub mod extract;
pub mod identity;
pub mod matcher;
pub mod outcome;
pub mod pipeline;
pub mod store;
pub mod token;

pub use error::{Error, Result};
