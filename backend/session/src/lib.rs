//! `morejpeg-session` — the per-chat control point.
//!
//! [`SessionManager`] runs one sequential worker per chat; each worker feeds
//! messages to the shared [`ChatSessionHandler`], which classifies them,
//! updates the chat's cache entry and runs degradation passes.

pub mod classify;
pub mod handler;
pub mod manager;

#[cfg(test)]
mod test_support;

pub use classify::{best_variant, classify, extract_urls, is_trigger, Intent};
pub use handler::{ChatSessionHandler, HandlerOutcome, HandlerSettings};
pub use manager::SessionManager;
