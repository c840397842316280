//! Remote feature-flag evaluation client for provider routing.
//!
//! Provides the `FlagEvaluator` trait the dispatcher resolves providers
//! through, and `FlagClient`, a reqwest wrapper over the flag service's SDK
//! evaluate endpoint. The client probes the service at startup (`connect`);
//! after that, a missing or disabled flag falls back to the caller-supplied
//! default while an unreachable service is a distinct, non-silent error.

mod client;
mod evaluator;

pub use client::{FlagClient, FlagClientConfig};
pub use evaluator::FlagEvaluator;
