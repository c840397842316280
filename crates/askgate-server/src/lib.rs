//! HTTP boundary for flag-routed question answering.
//!
//! Exposes the router, state, and config so integration tests can drive the
//! service in-process; the `askgate` binary wires these together in `main`.

pub mod config;
pub mod routes;
pub mod state;
