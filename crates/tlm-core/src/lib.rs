//! tlm-core: shared foundation for the TLM simulator.
//!
//! Contains:
//! - ids (compact stable node IDs)
//! - numeric (Real + clamping and step-count helpers)
//! - message (severity-tagged message channel mirrored into `tracing`)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod message;
pub mod numeric;

pub use error::{TlmError, TlmResult};
pub use ids::*;
pub use message::{Message, MessageChannel, Severity};
pub use numeric::*;
