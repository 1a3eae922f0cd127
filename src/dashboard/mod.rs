//! Web dashboard module for real-time monitoring
//!
//! Provides an embedded web dashboard served at `/` that displays one card
//! per configured model, grouped by provider, with status and latency.
//! Live updates arrive over WebSocket; the page falls back to polling
//! `/api/status` when the socket drops.

pub mod handler;
pub mod types;
pub mod view;
pub mod websocket;

pub use handler::{assets_handler, dashboard_handler};
pub use websocket::websocket_handler;
