//! Core types shared by every input source and the report pipeline.
//!
//! This module contains the normalized `Record` every transaction is converted into.

pub mod clock;
pub mod record;

// Re-export key types for convenience
pub use record::{NO_RESPONSE_STATUS, Payload, Record};
