//! Storage for captured transactions.

pub mod capture;

// Re-export key types
pub use capture::{CaptureLog, LoggedTransaction};
