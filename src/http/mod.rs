//! HTTP API server for external control
//!
//! This module provides a REST API for controlling the engine:
//! - POST /capture/start - Activate the voice capture loop (single-use gate)
//! - POST /capture/stop - Stop the loop before its next restart
//! - GET /status - Latest status line + loop state
//! - GET /session - Session state snapshot
//! - POST /command - Feed a typed utterance through interpret → dispatch
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
