//! llm-pulse - availability and latency dashboard for LLM API endpoints
//!
//! Probes every configured `(provider, model)` endpoint with a tiny chat
//! completion request, one at a time, and streams the outcomes to a browser
//! dashboard. A same-origin relay forwards arbitrary JSON POSTs for pages
//! that cannot call third-party APIs directly.

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod relay;
