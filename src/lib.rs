//! Outcall, a campaign-management backend.
//!
//! Single Rust binary. Accepts a campaign brief over HTTP, generates a call
//! script via an LLM completion endpoint, persists campaign state to a flat
//! file, forwards approved campaigns to an external automation webhook,
//! accumulates call-status events, and summarizes accumulated logs.
//!
//! See `DESIGN.md` for full architecture documentation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod campaign;
pub mod config;
pub mod logging;
pub mod numbers;
pub mod prompt;
pub mod store;

pub mod notifier;
pub mod providers;

pub mod api;
pub mod service;
