//! Structured logging for morejpeg.
//!
//! Console + rolling NDJSON file output, redaction of secrets embedded in URLs
//! and tokens, and the structured media event log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, MediaEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
