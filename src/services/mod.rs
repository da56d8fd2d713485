//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own session gating and data access so route handlers can
//! stay focused on protocol translation and cookie plumbing.

pub mod console;

/// Stable machine-readable code carried next to error messages.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}
