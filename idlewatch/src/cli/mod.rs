//! CLI module
//!
//! Argument definitions for the `idlewatch` binary.

pub mod args;

pub use args::{Cli, Commands, ProfileCommands};
