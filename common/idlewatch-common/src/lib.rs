//! Common utilities for idlewatch binaries
//!
//! Provides standardized tracing setup so every entry point logs the same way.

mod init;

pub use init::{init_tracing, level_for_verbosity};
