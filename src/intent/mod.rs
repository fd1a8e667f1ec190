//! Natural-language-to-command translation.
//!
//! One untrusted boundary: a transcript goes in, a validated `Intent` comes
//! out. Everything the model does wrong collapses into the `error` variant
//! here instead of leaking downstream.

pub mod interpreter;
pub mod prompt;
pub mod schema;

pub use interpreter::{extract_json_object, IntentInterpreter};
pub use schema::{Intent, PanDirection, ZoomAction};
